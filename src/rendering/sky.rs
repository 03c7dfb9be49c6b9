/// Equirectangular sky pass
///
/// Fills every color pixel before geometry is drawn. The sky follows the
/// camera yaw only; pitch does not tilt it.
use super::framebuffer::Framebuffer;
use super::texture::Texture;
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

/// Flat fill used when no sky texture is bound.
pub const SKY_FALLBACK: u32 = 0xFF70_7070;

/// World-space ray through normalized pixel coordinates `(nx, ny)` in [-1, 1].
#[inline]
pub fn sky_direction(nx: f32, ny: f32, aspect: f32, tan_half_fov: f32, yaw: f32) -> Vec3 {
    let cam = Vec3::new(nx * aspect * tan_half_fov, ny * tan_half_fov, -1.0).normalize();
    let (sy, cy) = yaw.sin_cos();
    let forward = Vec3::new(sy, 0.0, -cy);
    let right = Vec3::new(cy, 0.0, sy);
    (right * cam.x + Vec3::Y * cam.y - forward * cam.z).normalize()
}

/// Texture coordinates of a unit direction: `u` wraps around the horizon,
/// `v` runs from the zenith (0) to the nadir (1).
#[inline]
pub fn sky_uv(dir: Vec3) -> Vec2 {
    Vec2::new(
        (dir.x.atan2(-dir.z) + PI) / (2.0 * PI),
        0.5 - dir.y.clamp(-1.0, 1.0).asin() / PI,
    )
}

pub fn draw_sky(fb: &mut Framebuffer, sky: Option<&Texture>, yaw: f32, fov_y: f32) {
    let Some(sky) = sky else {
        fb.color_buffer.fill(SKY_FALLBACK);
        return;
    };
    let (w, h) = (fb.width, fb.height);
    if w == 0 || h == 0 {
        return;
    }

    let aspect = w as f32 / h as f32;
    let tan_half = (fov_y * 0.5).tan();
    for (y, row) in fb.color_buffer.chunks_mut(w).enumerate() {
        let ny = 1.0 - (2.0 * (y as f32 + 0.5)) / h as f32;
        for (x, out) in row.iter_mut().enumerate() {
            let nx = (2.0 * (x as f32 + 0.5)) / w as f32 - 1.0;
            let uv = sky_uv(sky_direction(nx, ny, aspect, tan_half, yaw));
            *out = sky.sample_wrap_u(uv.x, uv.y) | 0xFF00_0000;
        }
    }
}
