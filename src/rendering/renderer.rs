/// Frame render state
///
/// Owns the low-resolution framebuffer and the per-frame scratch lists.
/// Faces are partitioned into opaque and translucent sets; opaque faces are
/// drawn first in mesh order, translucent faces afterwards from far to near.
use super::framebuffer::Framebuffer;
use super::pipeline::{BackfaceReference, GeometryPipeline, Outcome};
use super::rasterizer::{BlendMode, Rasterizer};
use super::sky::draw_sky;
use super::texture::{Texture, TextureTable};
use crate::camera::Camera;
use crate::meshing::{Face, Vertex};
use crate::perf::PerfTimer;
use std::cmp::Ordering;

pub const CROSSHAIR_HALF_LENGTH: i32 = 6;
pub const CROSSHAIR_COLOR: u32 = 0xFFFF_FFFF;

/// Per-frame face counters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles rejected by the outcode test.
    pub culled_faces: usize,
    /// Projected triangles handed to the rasterizer.
    pub rendered_faces: usize,
}

/// Render resolution for a window: `window / scale` per axis, at least 1.
#[inline]
pub fn render_size(window_width: u32, window_height: u32, render_scale: u32) -> (usize, usize) {
    let scale = render_scale.max(1);
    (
        (window_width / scale).max(1) as usize,
        (window_height / scale).max(1) as usize,
    )
}

pub struct FrameRenderer {
    framebuffer: Framebuffer,
    render_scale: u32,
    rasterizer: Rasterizer,
    opaque: Vec<usize>,
    translucent: Vec<(f32, usize)>,
    stats: FrameStats,
}

impl FrameRenderer {
    pub fn new(window_width: u32, window_height: u32, render_scale: u32) -> Self {
        let (width, height) = render_size(window_width, window_height, render_scale);
        Self {
            framebuffer: Framebuffer::new(width, height),
            render_scale: render_scale.max(1),
            rasterizer: Rasterizer::new(),
            opaque: Vec::new(),
            translucent: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[inline]
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    #[inline]
    pub fn render_scale(&self) -> u32 {
        self.render_scale
    }

    /// Render resolution (width, height).
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.framebuffer.width, self.framebuffer.height)
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.framebuffer.width as f32 / self.framebuffer.height.max(1) as f32
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[inline]
    pub fn wireframe(&self) -> bool {
        self.rasterizer.wireframe
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.rasterizer.wireframe = enabled;
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.rasterizer.wireframe = !self.rasterizer.wireframe;
        self.rasterizer.wireframe
    }

    /// Recompute the render resolution for a new window size and reallocate
    /// the buffers. Returns the new render size.
    pub fn resize(&mut self, window_width: u32, window_height: u32) -> (usize, usize) {
        let (width, height) = render_size(window_width, window_height, self.render_scale);
        self.framebuffer.resize(width, height);
        (width, height)
    }

    /// Sky pass, depth clear and stats reset.
    pub fn begin_frame(&mut self, textures: &TextureTable, camera: &Camera) {
        draw_sky(&mut self.framebuffer, textures.sky(), camera.yaw, camera.fov);
        self.framebuffer.clear_depth();
        self.stats = FrameStats::default();
    }

    /// Solid background instead of the sky pass.
    pub fn clear_frame(&mut self, color: u32) {
        self.framebuffer.clear(color);
        self.stats = FrameStats::default();
    }

    /// Push `faces` through the geometry pipeline and rasterize the survivors.
    pub fn render_faces(&mut self, faces: &[Face], textures: &TextureTable, camera: &Camera) -> FrameStats {
        let _timer = PerfTimer::new("render_faces");
        let view = camera.view_matrix();
        let pipeline = GeometryPipeline::new(
            view,
            camera.projection_matrix(),
            camera.near,
            self.framebuffer.width,
            self.framebuffer.height,
            BackfaceReference::FirstVertex,
        );

        self.opaque.clear();
        self.translucent.clear();
        for (i, face) in faces.iter().enumerate() {
            if face.is_translucent() {
                let depth = -(view * face.centroid().extend(1.0)).z;
                self.translucent.push((depth, i));
            } else {
                self.opaque.push(i);
            }
        }
        // farthest first
        self.translucent
            .sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        for &i in &self.opaque {
            let face = &faces[i];
            draw_outcome(
                &mut self.framebuffer,
                &self.rasterizer,
                pipeline.process(&face.vertices),
                textures.get(face.texture),
                BlendMode::Opaque,
                &mut self.stats,
            );
        }
        for &(_, i) in &self.translucent {
            let face = &faces[i];
            draw_outcome(
                &mut self.framebuffer,
                &self.rasterizer,
                pipeline.process(&face.vertices),
                textures.get(face.texture),
                BlendMode::Translucent,
                &mut self.stats,
            );
        }

        self.stats
    }

    /// Draw a single triangle through `pipeline`, counting it in the frame stats.
    pub fn draw_triangle(
        &mut self,
        pipeline: &GeometryPipeline,
        tri: &[Vertex; 3],
        texture: &Texture,
        mode: BlendMode,
    ) {
        draw_outcome(
            &mut self.framebuffer,
            &self.rasterizer,
            pipeline.process(tri),
            texture,
            mode,
            &mut self.stats,
        );
    }

    /// Two white lines through the centre of the render target.
    pub fn draw_crosshair(&mut self) {
        let cx = self.framebuffer.width as i32 / 2;
        let cy = self.framebuffer.height as i32 / 2;
        let r = CROSSHAIR_HALF_LENGTH;
        self.framebuffer.draw_line(cx - r, cy, cx + r, cy, CROSSHAIR_COLOR);
        self.framebuffer.draw_line(cx, cy - r, cx, cy + r, CROSSHAIR_COLOR);
    }

    /// Nearest-neighbour upscale of the frame into a window-sized buffer.
    pub fn present_into(&self, dst: &mut [u32], window_width: usize, window_height: usize) {
        self.framebuffer.blit_scaled(dst, window_width, window_height);
    }
}

fn draw_outcome(
    framebuffer: &mut Framebuffer,
    rasterizer: &Rasterizer,
    outcome: Outcome,
    texture: &Texture,
    mode: BlendMode,
    stats: &mut FrameStats,
) {
    match outcome {
        Outcome::FrustumCulled => stats.culled_faces += 1,
        Outcome::Visible(projected) => {
            for tri in projected.triangles() {
                rasterizer.draw_triangle(framebuffer, texture, tri, mode);
                stats.rendered_faces += 1;
            }
        }
        Outcome::Backface | Outcome::Dropped => {}
    }
}
