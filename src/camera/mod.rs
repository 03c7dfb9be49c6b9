/// Camera system with FPS-style controls
/// Yaw/pitch orientation, mouse and arrow-key look
use crate::math;
use glam::{Mat4, Vec3};

/// Pitch limit, kept well away from the poles so the look-at basis never degenerates.
pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.1;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // Rotation around Y axis (radians), 0 looks down -Z
    pub pitch: f32, // Rotation around X axis (radians), positive looks up
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
    pub mouse_sensitivity: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 500.0,
            aspect_ratio,
            mouse_sensitivity: 0.0025,
        }
    }

    /// Unit view direction derived from yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        math::normalize(Vec3::new(sy * cp, sp, -cy * cp))
    }

    /// Horizontal right vector; falls back to +X when looking straight up or down.
    pub fn right(&self) -> Vec3 {
        horizontal_right(self.forward())
    }

    /// Forward direction projected onto the ground plane.
    pub fn forward_flat(&self) -> Vec3 {
        let f = self.forward();
        math::normalize(Vec3::new(f.x, 0.0, f.z))
    }

    pub fn view_matrix(&self) -> Mat4 {
        math::look_at(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        math::perspective(self.fov, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update camera orientation from mouse delta
    pub fn rotate(&mut self, mouse_delta_x: f32, mouse_delta_y: f32) {
        self.yaw += mouse_delta_x * self.mouse_sensitivity;
        self.pitch -= mouse_delta_y * self.mouse_sensitivity;
        self.clamp_pitch();
    }

    /// Apply arrow-key look at `look_speed` radians per second.
    pub fn turn(&mut self, input: &InputState, look_speed: f32, dt: f32) {
        let step = look_speed * dt;
        if input.look_left {
            self.yaw -= step;
        }
        if input.look_right {
            self.yaw += step;
        }
        if input.look_up {
            self.pitch += step;
        }
        if input.look_down {
            self.pitch -= step;
        }
        self.clamp_pitch();
    }

    #[inline]
    pub fn clamp_pitch(&mut self) {
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Update aspect ratio (call when the render target resizes)
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Right vector of `forward` against world up, with a stable fallback at the poles.
pub fn horizontal_right(forward: Vec3) -> Vec3 {
    let right = forward.cross(Vec3::Y);
    let len_sq = right.length_squared();
    if len_sq < 1e-6 {
        Vec3::X
    } else {
        right / len_sq.sqrt()
    }
}

/// Per-frame input snapshot, filled in by the windowing layer.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Jump when walking, ascend in noclip.
    pub up: bool,
    /// Descend in noclip.
    pub down: bool,
    pub look_left: bool,
    pub look_right: bool,
    pub look_up: bool,
    pub look_down: bool,
    /// Mouse motion accumulated since the last frame, in window pixels.
    pub mouse_dx: f32,
    pub mouse_dy: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unnormalized movement direction on the given basis.
    pub fn move_direction(&self, forward: Vec3, right: Vec3) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if self.forward {
            dir += forward;
        }
        if self.backward {
            dir -= forward;
        }
        if self.right {
            dir += right;
        }
        if self.left {
            dir -= right;
        }
        dir
    }

    /// Consume the accumulated mouse delta.
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        let delta = (self.mouse_dx, self.mouse_dy);
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_yaw_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO, 16.0 / 9.0);
        let f = camera.forward();
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn positive_yaw_turns_towards_positive_x() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.yaw = std::f32::consts::FRAC_PI_2;
        let f = camera.forward();
        assert!((f - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped_by_mouse_and_keys() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.rotate(0.0, -100_000.0);
        assert!((camera.pitch - MAX_PITCH).abs() < 1e-6);

        let input = InputState {
            look_down: true,
            ..Default::default()
        };
        camera.turn(&input, 1.5, 100.0);
        assert!((camera.pitch + MAX_PITCH).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_puts_forward_point_on_negative_z_axis() {
        let mut camera = Camera::new(Vec3::new(3.0, 4.0, 5.0), 1.0);
        camera.yaw = 0.7;
        camera.pitch = -0.3;
        let ahead = camera.position + camera.forward() * 10.0;
        let view = camera.view_matrix() * ahead.extend(1.0);
        assert!(view.x.abs() < 1e-4 && view.y.abs() < 1e-4);
        assert!((view.z + 10.0).abs() < 1e-4);
    }

    #[test]
    fn horizontal_right_falls_back_at_poles() {
        assert_eq!(horizontal_right(Vec3::Y), Vec3::X);
        assert_eq!(horizontal_right(Vec3::NEG_Y), Vec3::X);
    }

    #[test]
    fn move_direction_combines_pressed_keys() {
        let input = InputState {
            forward: true,
            right: true,
            ..Default::default()
        };
        let dir = input.move_direction(Vec3::NEG_Z, Vec3::X);
        assert_eq!(dir, Vec3::new(1.0, 0.0, -1.0));

        let mut input = InputState {
            mouse_dx: 3.0,
            mouse_dy: -2.0,
            ..Default::default()
        };
        assert_eq!(input.take_mouse_delta(), (3.0, -2.0));
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
    }
}
