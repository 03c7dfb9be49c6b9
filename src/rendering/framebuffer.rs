/// Framebuffer for software rendering
/// Stores color and depth information
///
/// Color is ARGB8888, depth is the [0, 1] window depth written by the
/// rasterizer (smaller is nearer). Both buffers are row-major with a pitch
/// equal to `width`.
use crate::count_call;

pub const DEPTH_CLEAR: f32 = 1.0;

pub struct Framebuffer {
    // Hot data: used for every bounds check and index calculation
    pub width: usize,
    pub height: usize,
    pub color_buffer: Vec<u32>,
    pub depth_buffer: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_count = width * height;
        Self {
            width,
            height,
            color_buffer: vec![0; pixel_count],
            depth_buffer: vec![DEPTH_CLEAR; pixel_count],
        }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Fill color with `clear_color` and reset depth.
    pub fn clear(&mut self, clear_color: u32) {
        count_call!(crate::perf::FUNCTION_COUNTERS.framebuffer_clear_calls);
        self.color_buffer.fill(clear_color);
        self.depth_buffer.fill(DEPTH_CLEAR);
    }

    /// Reset depth only; the sky pass owns the color clear.
    pub fn clear_depth(&mut self) {
        count_call!(crate::perf::FUNCTION_COUNTERS.framebuffer_clear_calls);
        self.depth_buffer.fill(DEPTH_CLEAR);
    }

    /// Set pixel with depth test
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32, depth: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }

        let index = y * self.width + x;

        if depth < self.depth_buffer[index] {
            self.color_buffer[index] = color;
            self.depth_buffer[index] = depth;
            true
        } else {
            false
        }
    }

    /// Set pixel without depth test (for overlays, lines). Off-screen writes are ignored.
    #[inline]
    pub fn set_pixel_no_depth(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let index = y as usize * self.width + x as usize;
            self.color_buffer[index] = color;
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.color_buffer[y * self.width + x])
    }

    #[inline]
    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.depth_buffer[y * self.width + x])
    }

    /// Integer Bresenham line, no depth test. Pixels outside the buffer are skipped.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        super::rasterizer::draw_line(self, x0, y0, x1, y1, color);
    }

    /// Get color buffer as slice
    pub fn color_buffer_slice(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn depth_buffer_slice(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// Resize framebuffer. Growing past the current allocation releases the
    /// old buffers before allocating new ones.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        let pixel_count = width * height;
        if pixel_count > self.color_buffer.capacity() {
            self.color_buffer = Vec::new();
            self.depth_buffer = Vec::new();
            self.color_buffer = vec![0; pixel_count];
            self.depth_buffer = vec![DEPTH_CLEAR; pixel_count];
        } else {
            self.color_buffer.resize(pixel_count, 0);
            self.depth_buffer.resize(pixel_count, DEPTH_CLEAR);
        }
        tracing::debug!(width, height, "framebuffer resized");
    }

    /// Nearest-neighbour upscale into `dst` of `dst_width` x `dst_height`.
    pub fn blit_scaled(&self, dst: &mut [u32], dst_width: usize, dst_height: usize) {
        if self.width == 0 || self.height == 0 || dst_width == 0 {
            return;
        }
        for (dy, row) in dst.chunks_mut(dst_width).take(dst_height).enumerate() {
            let sy = (dy * self.height / dst_height).min(self.height - 1);
            let src_row = &self.color_buffer[sy * self.width..(sy + 1) * self.width];
            for (dx, out) in row.iter_mut().enumerate() {
                let sx = (dx * self.width / dst_width).min(self.width - 1);
                *out = src_row[sx];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffers_are_cleared() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.color_buffer.len(), 12);
        assert!(fb.depth_buffer.iter().all(|&d| d == DEPTH_CLEAR));
    }

    #[test]
    fn test_depth_test_keeps_nearer_pixel() {
        let mut fb = Framebuffer::new(2, 2);
        assert!(fb.set_pixel(1, 1, 0xFF00FF00, 0.5));
        assert!(!fb.set_pixel(1, 1, 0xFFFF0000, 0.7));
        assert!(fb.set_pixel(1, 1, 0xFF0000FF, 0.2));
        assert_eq!(fb.pixel(1, 1), Some(0xFF0000FF));
        assert_eq!(fb.depth(1, 1), Some(0.2));
        assert!(!fb.set_pixel(5, 0, 0, 0.0));
    }

    #[test]
    fn test_line_endpoints_and_clipping() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw_line(1, 1, 6, 4, 0xFFFFFFFF);
        assert_eq!(fb.pixel(1, 1), Some(0xFFFFFFFF));
        assert_eq!(fb.pixel(6, 4), Some(0xFFFFFFFF));
        let lit = fb.color_buffer.iter().filter(|&&c| c != 0).count();
        assert_eq!(lit, 6, "one pixel per major-axis step");

        fb.draw_line(-10, 3, 20, 3, 0xFF123456);
        assert!((0..8).all(|x| fb.pixel(x, 3) == Some(0xFF123456)));
        assert!(fb.depth_buffer.iter().all(|&d| d == DEPTH_CLEAR), "lines never touch depth");
    }

    #[test]
    fn test_resize_reallocates_and_resets() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set_pixel(0, 0, 1, 0.1);
        fb.resize(16, 9);
        assert_eq!(fb.color_buffer.len(), 144);
        assert_eq!(fb.depth_buffer.len(), 144);
        assert_eq!(fb.depth(15, 8), Some(DEPTH_CLEAR));
        fb.resize(4, 4);
        assert_eq!(fb.color_buffer_slice().len(), 16);
    }

    #[test]
    fn test_blit_scaled_duplicates_pixels() {
        let mut fb = Framebuffer::new(2, 1);
        fb.color_buffer.copy_from_slice(&[7, 9]);
        let mut dst = vec![0u32; 8];
        fb.blit_scaled(&mut dst, 4, 2);
        assert_eq!(dst, vec![7, 7, 9, 9, 7, 7, 9, 9]);
    }
}
