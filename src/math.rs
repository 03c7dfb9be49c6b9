/// Linear algebra kernel
/// Thin free-function layer over glam value types. Everything downstream
/// (camera, pipeline, physics) goes through these so the conventions
/// (right-handed view space, GL clip space with w' = -z) live in one place.
use glam::{Mat4, Vec3, Vec4};

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(b)
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    a + b
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    a - b
}

#[inline]
pub fn scale(a: Vec3, s: f32) -> Vec3 {
    a * s
}

/// Unit vector in the direction of `a`, or the zero vector when `a` has zero length.
#[inline]
pub fn normalize(a: Vec3) -> Vec3 {
    let len_sq = a.length_squared();
    if len_sq == 0.0 {
        return Vec3::ZERO;
    }
    a * len_sq.sqrt().recip()
}

#[inline]
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// Matrix product `a * b` (b is applied first).
#[inline]
pub fn multiply(a: Mat4, b: Mat4) -> Mat4 {
    a * b
}

#[inline]
pub fn transform(m: Mat4, v: Vec4) -> Vec4 {
    m * v
}

#[inline]
pub fn translate(t: Vec3) -> Mat4 {
    Mat4::from_translation(t)
}

#[inline]
pub fn rotate_x(angle: f32) -> Mat4 {
    Mat4::from_rotation_x(angle)
}

#[inline]
pub fn rotate_y(angle: f32) -> Mat4 {
    Mat4::from_rotation_y(angle)
}

/// Right-handed view matrix.
///
/// The camera z axis is `normalize(eye - target)`, x is `normalize(up x z)`
/// and y is `z x x`. The result is undefined (NaN-free but degenerate) when
/// `up` is parallel to the view direction; callers keep pitch away from the poles.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let zaxis = normalize(eye - target);
    let xaxis = normalize(up.cross(zaxis));
    let yaxis = zaxis.cross(xaxis);

    Mat4::from_cols(
        Vec4::new(xaxis.x, yaxis.x, zaxis.x, 0.0),
        Vec4::new(xaxis.y, yaxis.y, zaxis.y, 0.0),
        Vec4::new(xaxis.z, yaxis.z, zaxis.z, 0.0),
        Vec4::new(-xaxis.dot(eye), -yaxis.dot(eye), -zaxis.dot(eye), 1.0),
    )
}

/// Right-handed perspective projection into GL clip space.
/// Points on the near plane map to ndc.z = -1, the far plane to +1, and `w' = -z`.
#[inline]
pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y_radians, aspect, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn normalize_zero_vector_is_zero() {
        assert_eq!(normalize(Vec3::ZERO), Vec3::ZERO);
        let n = normalize(Vec3::new(3.0, 0.0, 4.0));
        assert!((n.length() - 1.0).abs() < EPS);
        assert!((n.x - 0.6).abs() < EPS && (n.z - 0.8).abs() < EPS);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(cross(Vec3::X, Vec3::Y), Vec3::Z);
        assert_eq!(dot(Vec3::X, Vec3::Y), 0.0);
        assert_eq!(scale(add(Vec3::X, Vec3::Y), 2.0), Vec3::new(2.0, 2.0, 0.0));
        assert_eq!(sub(Vec3::X, Vec3::X), Vec3::ZERO);
    }

    #[test]
    fn look_at_maps_eye_to_origin_and_target_to_negative_z() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let target = Vec3::new(1.0, 2.0, -7.0);
        let view = look_at(eye, target, Vec3::Y);

        let eye_view = transform(view, eye.extend(1.0));
        assert!(eye_view.truncate().length() < EPS);

        let target_view = transform(view, target.extend(1.0));
        assert!(target_view.x.abs() < EPS && target_view.y.abs() < EPS);
        assert!((target_view.z + 10.0).abs() < EPS);
    }

    #[test]
    fn look_at_matches_glam_convention() {
        let eye = Vec3::new(-4.0, 1.5, 2.0);
        let target = Vec3::new(3.0, -1.0, -5.0);
        let ours = look_at(eye, target, Vec3::Y);
        let theirs = Mat4::look_at_rh(eye, target, Vec3::Y);
        assert!(ours.abs_diff_eq(theirs, 1e-4));
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let proj = perspective(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 500.0);

        let near = transform(proj, Vec4::new(0.0, 0.0, -0.1, 1.0));
        assert!((near.w - 0.1).abs() < EPS, "w' must equal -z");
        assert!((near.z / near.w + 1.0).abs() < 1e-4);

        let far = transform(proj, Vec4::new(0.0, 0.0, -500.0, 1.0));
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn rotations_and_translation_compose() {
        let quarter = std::f32::consts::FRAC_PI_2;
        let ry = transform(rotate_y(quarter), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert!((ry.z + 1.0).abs() < EPS, "rotate_y takes +x to -z");

        let rx = transform(rotate_x(quarter), Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert!((rx.z - 1.0).abs() < EPS, "rotate_x takes +y to +z");

        let m = multiply(translate(Vec3::new(0.0, 0.0, -5.0)), identity());
        let p = transform(m, Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(p, Vec4::new(1.0, 1.0, -4.0, 1.0));
    }
}
