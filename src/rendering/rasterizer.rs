/// Triangle rasterizer: edge-function coverage, perspective-correct texturing,
/// depth testing, alpha blending and wireframe lines.
use super::framebuffer::Framebuffer;
use super::pipeline::ScreenVertex;
use super::texture::Texture;
use crate::count_call;
use glam::Vec2;

pub const WIREFRAME_COLOR: u32 = 0xFFFF_FFFF;

/// Abstraction over a render target that supports depth-tested pixel writes.
/// Indices are row-major with a pitch of `width()`.
pub trait PixelTarget {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn color_at(&self, index: usize) -> u32;
    fn depth_at(&self, index: usize) -> f32;
    fn write_color(&mut self, index: usize, color: u32);
    fn write_depth(&mut self, index: usize, depth: f32);
}

impl PixelTarget for Framebuffer {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn color_at(&self, index: usize) -> u32 {
        self.color_buffer[index]
    }

    #[inline]
    fn depth_at(&self, index: usize) -> f32 {
        self.depth_buffer[index]
    }

    #[inline]
    fn write_color(&mut self, index: usize, color: u32) {
        self.color_buffer[index] = color;
    }

    #[inline]
    fn write_depth(&mut self, index: usize, depth: f32) {
        self.depth_buffer[index] = depth;
    }
}

/// How sampled texels reach the target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Alpha forced to 255; depth written.
    Opaque,
    /// Alpha respected: 0 skipped, partial blended over the destination; depth never written.
    Translucent,
}

/// Signed doubled area of (a, b, c); positive for triangles that are
/// counter-clockwise on screen with y pointing up.
#[inline(always)]
pub fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

/// `(src * a + dst * (255 - a)) / 255` per RGB channel; the result is opaque.
#[inline]
pub fn blend_argb(src: u32, dst: u32, alpha: u32) -> u32 {
    let inv = 255 - alpha;
    let mix = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        ((s * alpha + d * inv) / 255) & 0xFF
    };
    0xFF00_0000 | mix(16) << 16 | mix(8) << 8 | mix(0)
}

/// Integer Bresenham line without depth test; off-target pixels are skipped.
pub fn draw_line<T: PixelTarget + ?Sized>(
    target: &mut T,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: u32,
) {
    let (w, h) = (target.width() as i64, target.height() as i64);
    let dx = (x1 as i64 - x0 as i64).abs();
    let dy = -(y1 as i64 - y0 as i64).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0 as i64, y0 as i64);
    let (x1, y1) = (x1 as i64, y1 as i64);

    loop {
        if x >= 0 && y >= 0 && x < w && y < h {
            target.write_color((y * w + x) as usize, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Rasterizer {
    pub wireframe: bool,
    pub wireframe_color: u32,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            wireframe: false,
            wireframe_color: WIREFRAME_COLOR,
        }
    }

    /// Draw one projected triangle. Returns the number of pixels written.
    pub fn draw_triangle<T: PixelTarget + ?Sized>(
        &self,
        target: &mut T,
        texture: &Texture,
        tri: &[ScreenVertex; 3],
        mode: BlendMode,
    ) -> usize {
        if self.wireframe {
            self.draw_wireframe(target, tri);
            return 0;
        }
        self.draw_textured(target, texture, tri, mode)
    }

    pub fn draw_wireframe<T: PixelTarget + ?Sized>(&self, target: &mut T, tri: &[ScreenVertex; 3]) {
        for i in 0..3 {
            let a = tri[i].pos;
            let b = tri[(i + 1) % 3].pos;
            draw_line(target, a.x, a.y, b.x, b.y, self.wireframe_color);
        }
    }

    pub fn draw_textured<T: PixelTarget + ?Sized>(
        &self,
        target: &mut T,
        texture: &Texture,
        tri: &[ScreenVertex; 3],
        mode: BlendMode,
    ) -> usize {
        let (width, height) = (target.width() as i32, target.height() as i32);
        let [v0, v1, v2] = tri;
        let p0 = v0.pos.as_vec2();
        let p1 = v1.pos.as_vec2();
        let p2 = v2.pos.as_vec2();

        let area = edge_function(p0, p1, p2);
        if area <= 0.0 {
            return 0;
        }

        let min_x = v0.pos.x.min(v1.pos.x).min(v2.pos.x);
        let max_x = v0.pos.x.max(v1.pos.x).max(v2.pos.x);
        let min_y = v0.pos.y.min(v1.pos.y).min(v2.pos.y);
        let max_y = v0.pos.y.max(v1.pos.y).max(v2.pos.y);
        if max_x < 0 || max_y < 0 || min_x >= width || min_y >= height {
            return 0;
        }
        let (min_x, max_x) = (min_x.max(0), max_x.min(width - 1));
        let (min_y, max_y) = (min_y.max(0), max_y.min(height - 1));

        count_call!(crate::perf::FUNCTION_COUNTERS.triangles_rasterized);

        let inv_area = 1.0 / area;
        // Attributes pre-divided by w for perspective-correct interpolation
        let uw = [v0.uv * v0.inv_w, v1.uv * v1.inv_w, v2.uv * v2.inv_w];
        let mut written = 0;

        for y in min_y..=max_y {
            let row = y as usize * width as usize;
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge_function(p1, p2, p) * inv_area;
                let w1 = edge_function(p2, p0, p) * inv_area;
                let w2 = edge_function(p0, p1, p) * inv_area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let inv_w = w0 * v0.inv_w + w1 * v1.inv_w + w2 * v2.inv_w;
                if inv_w == 0.0 {
                    continue;
                }

                let index = row + x as usize;
                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                count_call!(crate::perf::FUNCTION_COUNTERS.pixels_tested);
                if depth >= target.depth_at(index) {
                    count_call!(crate::perf::FUNCTION_COUNTERS.depth_failed);
                    continue;
                }
                count_call!(crate::perf::FUNCTION_COUNTERS.depth_passed);

                let uv = (uw[0] * w0 + uw[1] * w1 + uw[2] * w2) / inv_w;
                let texel = texture.sample(uv.x, uv.y);

                match mode {
                    BlendMode::Opaque => {
                        target.write_color(index, texel | 0xFF00_0000);
                        target.write_depth(index, depth);
                    }
                    BlendMode::Translucent => {
                        let alpha = texel >> 24;
                        if alpha == 0 {
                            continue;
                        }
                        let color = if alpha == 255 {
                            texel
                        } else {
                            blend_argb(texel, target.color_at(index), alpha)
                        };
                        target.write_color(index, color);
                    }
                }
                written += 1;
            }
        }

        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    struct TestTarget {
        width: usize,
        height: usize,
        color: Vec<u32>,
        depth: Vec<f32>,
        pub pixels_written: usize,
    }

    impl TestTarget {
        fn new(width: usize, height: usize) -> Self {
            let len = width * height;
            Self {
                width,
                height,
                color: vec![0; len],
                depth: vec![1.0; len],
                pixels_written: 0,
            }
        }

        fn at(&self, x: usize, y: usize) -> u32 {
            self.color[y * self.width + x]
        }
    }

    impl PixelTarget for TestTarget {
        fn width(&self) -> usize {
            self.width
        }

        fn height(&self) -> usize {
            self.height
        }

        fn color_at(&self, index: usize) -> u32 {
            self.color[index]
        }

        fn depth_at(&self, index: usize) -> f32 {
            self.depth[index]
        }

        fn write_color(&mut self, index: usize, color: u32) {
            self.color[index] = color;
            self.pixels_written += 1;
        }

        fn write_depth(&mut self, index: usize, depth: f32) {
            self.depth[index] = depth;
        }
    }

    fn sv(x: i32, y: i32, depth: f32) -> ScreenVertex {
        ScreenVertex {
            pos: IVec2::new(x, y),
            uv: Vec2::ZERO,
            inv_w: 1.0,
            depth,
        }
    }

    /// Screen-space triangle covering the top-left half of a `size` square.
    fn half_square(size: i32, depth: f32) -> [ScreenVertex; 3] {
        [sv(0, size, depth), sv(size, 0, depth), sv(0, 0, depth)]
    }

    #[test]
    fn test_edge_function_sign() {
        let a = Vec2::new(0.0, 10.0);
        let b = Vec2::new(10.0, 0.0);
        let c = Vec2::new(0.0, 0.0);
        assert!(edge_function(a, b, c) > 0.0);
        assert!(edge_function(a, c, b) < 0.0);
    }

    #[test]
    fn test_opaque_triangle_forces_alpha_and_writes_depth() {
        let mut target = TestTarget::new(16, 16);
        let tex = Texture::solid(0x0012_3456);
        let written = Rasterizer::new().draw_textured(
            &mut target,
            &tex,
            &half_square(15, 0.5),
            BlendMode::Opaque,
        );
        assert!(written > 0);
        assert_eq!(written, target.pixels_written);
        assert_eq!(target.at(1, 1), 0xFF12_3456);
        assert_eq!(target.depth[1 * 16 + 1], 0.5);
        assert_eq!(target.at(14, 14), 0, "outside the hypotenuse");
    }

    #[test]
    fn test_wrong_winding_and_degenerate_are_rejected() {
        let mut target = TestTarget::new(16, 16);
        let tex = Texture::solid(0xFFFF_FFFF);
        let [a, b, c] = half_square(15, 0.5);
        let r = Rasterizer::new();
        assert_eq!(r.draw_textured(&mut target, &tex, &[a, c, b], BlendMode::Opaque), 0);
        assert_eq!(r.draw_textured(&mut target, &tex, &[a, a, b], BlendMode::Opaque), 0);
        assert_eq!(target.pixels_written, 0);
    }

    #[test]
    fn test_nearer_triangle_wins_regardless_of_order() {
        let near = Texture::solid(0xFF00_FF00);
        let far = Texture::solid(0xFFFF_0000);
        let r = Rasterizer::new();

        let mut first = TestTarget::new(16, 16);
        r.draw_textured(&mut first, &near, &half_square(15, 0.2), BlendMode::Opaque);
        r.draw_textured(&mut first, &far, &half_square(15, 0.8), BlendMode::Opaque);

        let mut second = TestTarget::new(16, 16);
        r.draw_textured(&mut second, &far, &half_square(15, 0.8), BlendMode::Opaque);
        r.draw_textured(&mut second, &near, &half_square(15, 0.2), BlendMode::Opaque);

        assert_eq!(first.color, second.color);
        assert_eq!(first.at(2, 2), 0xFF00_FF00);
    }

    #[test]
    fn test_translucent_blends_skips_clear_and_keeps_depth() {
        let r = Rasterizer::new();
        let mut target = TestTarget::new(16, 16);
        target.color.fill(0xFF00_0000);

        let half = Texture::solid(0x80FF_FFFF);
        r.draw_textured(&mut target, &half, &half_square(15, 0.5), BlendMode::Translucent);
        assert_eq!(target.at(1, 1), blend_argb(0x80FF_FFFF, 0xFF00_0000, 0x80));
        assert_eq!(target.at(1, 1), 0xFF80_8080);
        assert!(target.depth.iter().all(|&d| d == 1.0));

        let clear = Texture::solid(0x00FF_0000);
        let before = target.pixels_written;
        r.draw_textured(&mut target, &clear, &half_square(15, 0.4), BlendMode::Translucent);
        assert_eq!(target.pixels_written, before);
    }

    #[test]
    fn test_translucent_is_hidden_behind_nearer_opaque() {
        let r = Rasterizer::new();
        let mut target = TestTarget::new(16, 16);
        r.draw_textured(&mut target, &Texture::solid(0xFF11_1111), &half_square(15, 0.2), BlendMode::Opaque);
        r.draw_textured(&mut target, &Texture::solid(0x80FF_FFFF), &half_square(15, 0.6), BlendMode::Translucent);
        assert_eq!(target.at(1, 1), 0xFF11_1111);
    }

    #[test]
    fn test_perspective_correct_uv_leans_towards_near_vertex() {
        // Left half black, right half white; u runs 0 at x=0 to 1 at x=15.
        let texels = (0..16).map(|i| if i < 8 { 0xFF00_0000 } else { 0xFFFF_FFFF }).collect();
        let tex = Texture::new(16, 1, texels).unwrap();
        let mut tri = [
            ScreenVertex { pos: IVec2::new(0, 15), uv: Vec2::new(0.0, 0.0), inv_w: 1.0, depth: 0.5 },
            ScreenVertex { pos: IVec2::new(15, 15), uv: Vec2::new(1.0, 0.0), inv_w: 1.0, depth: 0.5 },
            ScreenVertex { pos: IVec2::new(0, 0), uv: Vec2::new(0.0, 0.0), inv_w: 1.0, depth: 0.5 },
        ];
        let r = Rasterizer::new();

        let mut affine = TestTarget::new(16, 16);
        r.draw_textured(&mut affine, &tex, &tri, BlendMode::Opaque);

        // Right vertex 4x further away: its u should dominate less of the span.
        tri[1].inv_w = 0.25;
        let mut perspective = TestTarget::new(16, 16);
        r.draw_textured(&mut perspective, &tex, &tri, BlendMode::Opaque);

        let whites = |t: &TestTarget| (0..16).filter(|&x| t.at(x, 14) == 0xFFFF_FFFF).count();
        assert!(whites(&perspective) < whites(&affine));
    }

    #[test]
    fn test_wireframe_draws_edges_only() {
        let mut target = TestTarget::new(16, 16);
        let mut r = Rasterizer::new();
        r.wireframe = true;
        let written = r.draw_triangle(&mut target, &Texture::solid(0), &half_square(15, 0.5), BlendMode::Opaque);
        assert_eq!(written, 0);
        assert_eq!(target.at(0, 0), WIREFRAME_COLOR);
        assert_eq!(target.at(15, 0), WIREFRAME_COLOR);
        assert_eq!(target.at(0, 15), WIREFRAME_COLOR);
        assert_eq!(target.at(3, 3), 0, "interior untouched");
        assert!(target.depth.iter().all(|&d| d == 1.0));
    }

    #[test]
    fn test_offscreen_triangle_is_skipped() {
        let mut target = TestTarget::new(8, 8);
        let tri = [sv(20, 40, 0.5), sv(40, 20, 0.5), sv(20, 20, 0.5)];
        assert_eq!(
            Rasterizer::new().draw_textured(&mut target, &Texture::solid(!0), &tri, BlendMode::Opaque),
            0
        );
    }
}
