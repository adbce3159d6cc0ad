//! Column-major 4x4 matrix operations.
//!
//! Matrices are [`cgmath::Matrix4`] and are indexed `m[column][row]`.
//! Composition follows the usual convention: `multiply(a, b)` yields `a·b`, so
//! when transforming a point the right-most matrix applies first. The
//! `translate`/`scale`/`rotate_*` functions compose onto an existing matrix in
//! place (`m = m·T`), which is how a model matrix is built up step by step.

use cgmath::{Matrix4, Rad, SquareMatrix, Vector4};

use super::{Mat4, Vec3, vec3};

pub fn identity() -> Mat4 {
    Mat4::identity()
}

pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    a * b
}

pub fn translate(m: &mut Mat4, v: Vec3) {
    *m = *m * Matrix4::from_translation(v);
}

pub fn scale(m: &mut Mat4, v: Vec3) {
    *m = *m * Matrix4::from_nonuniform_scale(v.x, v.y, v.z);
}

pub fn rotate_x(m: &mut Mat4, rad: f32) {
    *m = *m * Matrix4::from_angle_x(Rad(rad));
}

pub fn rotate_y(m: &mut Mat4, rad: f32) {
    *m = *m * Matrix4::from_angle_y(Rad(rad));
}

pub fn rotate_z(m: &mut Mat4, rad: f32) {
    *m = *m * Matrix4::from_angle_z(Rad(rad));
}

/// Rotation of `rad` radians about `axis`. A zero-length axis yields the identity.
pub fn from_rotation(rad: f32, axis: Vec3) -> Mat4 {
    let axis = vec3::normalize(axis);
    if axis == vec3::ZERO {
        return identity();
    }
    Matrix4::from_axis_angle(axis, Rad(rad))
}

/// Right-handed orthographic projection onto the 0..1 depth range.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let lr = 1.0 / (left - right);
    let bt = 1.0 / (bottom - top);
    let nf = 1.0 / (near - far);
    Matrix4::from_cols(
        Vector4::new(-2.0 * lr, 0.0, 0.0, 0.0),
        Vector4::new(0.0, -2.0 * bt, 0.0, 0.0),
        Vector4::new(0.0, 0.0, nf, 0.0),
        Vector4::new((left + right) * lr, (top + bottom) * bt, near * nf, 1.0),
    )
}

/// Right-handed perspective projection with a vertical field of view.
///
/// View-space depth `-near` maps to clip depth 0 and `-far` to 1, the depth
/// range wgpu rasterizes with.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);
    Matrix4::from_cols(
        Vector4::new(f / aspect, 0.0, 0.0, 0.0),
        Vector4::new(0.0, f, 0.0, 0.0),
        Vector4::new(0.0, 0.0, far * nf, -1.0),
        Vector4::new(0.0, 0.0, near * far * nf, 0.0),
    )
}

/// View matrix looking from `eye` towards `center`.
///
/// The basis is built with cross products: `z` points from the target back to
/// the eye, `x = up × z` and `y = z × x`. Degenerate input (eye == center, or
/// `up` parallel to the view direction) produces zero rows rather than NaNs.
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    let z = vec3::normalize(eye - center);
    let x = vec3::normalize(vec3::cross(up, z));
    let y = vec3::cross(z, x);

    Matrix4::from_cols(
        Vector4::new(x.x, y.x, z.x, 0.0),
        Vector4::new(x.y, y.y, z.y, 0.0),
        Vector4::new(x.z, y.z, z.z, 0.0),
        Vector4::new(
            -vec3::dot(x, eye),
            -vec3::dot(y, eye),
            -vec3::dot(z, eye),
            1.0,
        ),
    )
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use cgmath::{InnerSpace, Vector3};

    use super::*;

    fn assert_mat_close(a: &Mat4, b: &Mat4, eps: f32) {
        for c in 0..4 {
            for r in 0..4 {
                assert!(
                    (a[c][r] - b[c][r]).abs() < eps,
                    "mismatch at [{c}][{r}]: {} vs {}",
                    a[c][r],
                    b[c][r]
                );
            }
        }
    }

    #[test]
    fn rotate_y_then_inverse_is_identity() {
        for step in -16..=16 {
            let theta = step as f32 * PI / 7.0;
            let mut m = identity();
            rotate_y(&mut m, theta);
            let mut inv = identity();
            rotate_y(&mut inv, -theta);
            assert_mat_close(&multiply(&m, &inv), &identity(), 1e-5);
        }
    }

    #[test]
    fn composition_applies_right_to_left() {
        // translate then scale in place: points are scaled first, then moved.
        let mut m = identity();
        translate(&mut m, Vec3::new(1.0, 0.0, 0.0));
        scale(&mut m, Vec3::new(2.0, 2.0, 2.0));
        let p = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 3.0).abs() < 1e-6);
        assert_eq!(m.w, Vector4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn rotate_z_quarter_turn_maps_x_to_y() {
        let mut m = identity();
        rotate_z(&mut m, FRAC_PI_2);
        let p = m * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_x_quarter_turn_maps_y_to_z() {
        let mut m = identity();
        rotate_x(&mut m, FRAC_PI_2);
        let p = m * Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert!(p.y.abs() < 1e-6);
        assert!((p.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn look_at_basis_is_orthonormal() {
        let eyes = [
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(-4.0, 2.5, 1.0),
            Vec3::new(10.0, -3.0, -7.0),
        ];
        let forwards = [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, -0.3, 0.2),
            Vec3::new(-0.2, 0.9, 0.1),
        ];
        for eye in eyes {
            for forward in forwards {
                let m = look_at(eye, eye + forward, Vec3::new(0.0, 1.0, 0.0));
                let rows: Vec<Vector3<f32>> = (0..3)
                    .map(|r| Vector3::new(m[0][r], m[1][r], m[2][r]))
                    .collect();
                for (i, a) in rows.iter().enumerate() {
                    assert!((a.magnitude() - 1.0).abs() < 1e-5);
                    for b in rows.iter().skip(i + 1) {
                        assert!(a.dot(*b).abs() < 1e-5);
                    }
                }
            }
        }
    }

    #[test]
    fn look_at_moves_eye_to_origin() {
        let eye = Vec3::new(2.0, 1.0, 5.0);
        let m = look_at(eye, Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let p = m * eye.extend(1.0);
        assert!(p.truncate().magnitude() < 1e-5);
    }

    #[test]
    fn look_at_degenerate_input_has_no_nan() {
        let eye = Vec3::new(1.0, 1.0, 1.0);
        let m = look_at(eye, eye, Vec3::new(0.0, 1.0, 0.0));
        for c in 0..4 {
            for r in 0..4 {
                assert!(!m[c][r].is_nan());
            }
        }
    }

    #[test]
    fn perspective_maps_near_plane_to_zero_depth() {
        let proj = perspective(FRAC_PI_2, 1.0, 0.1, 100.0);
        let clip = proj * Vector4::new(0.0, 0.0, -0.1, 1.0);
        assert!((clip.w - 0.1).abs() < 1e-6);
        assert!((clip.z / clip.w).abs() < 1e-5);

        let far = proj * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn axis_rotation_matches_fixed_axis_rotation() {
        let mut expected = identity();
        rotate_y(&mut expected, 0.7);
        assert_mat_close(&from_rotation(0.7, Vec3::new(0.0, 3.0, 0.0)), &expected, 1e-6);

        let m = from_rotation(PI, Vec3::new(1.0, 1.0, 0.0));
        let p = m * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!((p.y - 1.0).abs() < 1e-5);
        assert!(p.x.abs() < 1e-5);
    }

    #[test]
    fn zero_axis_rotation_is_identity() {
        assert_eq!(from_rotation(1.0, Vec3::new(0.0, 0.0, 0.0)), identity());
    }

    #[test]
    fn ortho_maps_box_to_clip_volume() {
        let proj = ortho(-2.0, 2.0, -1.0, 1.0, 0.1, 10.0);
        let corner = proj * Vector4::new(2.0, -1.0, -0.1, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y + 1.0).abs() < 1e-6);
        assert!(corner.z.abs() < 1e-6);
        assert_eq!(corner.w, 1.0);

        let far = proj * Vector4::new(0.0, 0.0, -10.0, 1.0);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn perspective_respects_aspect() {
        let proj = perspective(FRAC_PI_2, 2.0, 0.1, 100.0);
        assert!((proj[0][0] - 0.5).abs() < 1e-6);
        assert!((proj[1][1] - 1.0).abs() < 1e-6);
    }
}
