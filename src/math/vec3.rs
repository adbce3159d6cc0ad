//! 3-vector helpers on top of [`cgmath::Vector3`].
//!
//! Most arithmetic is plain operator syntax on `Vec3`; these functions exist for
//! the cases where the engine needs behaviour cgmath does not give us, such as
//! a normalize that tolerates the zero vector.

use cgmath::InnerSpace;

use super::Vec3;

pub const ZERO: Vec3 = Vec3 {
    x: 0.0,
    y: 0.0,
    z: 0.0,
};
pub const WORLD_UP: Vec3 = Vec3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    a + b
}

pub fn subtract(a: Vec3, b: Vec3) -> Vec3 {
    a - b
}

pub fn scale(a: Vec3, s: f32) -> Vec3 {
    a * s
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(b)
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

/// Unit vector pointing along `a`.
///
/// A zero-length input returns the zero vector instead of NaNs, so degenerate
/// camera or look-at input never poisons a matrix.
pub fn normalize(a: Vec3) -> Vec3 {
    let len2 = a.magnitude2();
    if len2 > 0.0 {
        a * (1.0 / len2.sqrt())
    } else {
        ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_is_zero() {
        let n = normalize(ZERO);
        assert_eq!(n, ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan() && !n.z.is_nan());
    }

    #[test]
    fn normalize_has_unit_length() {
        let n = normalize(Vec3::new(3.0, -4.0, 12.0));
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
        assert!((n.x - 3.0 / 13.0).abs() < 1e-6);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(cross(x, y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(dot(x, y), 0.0);
    }

    #[test]
    fn arithmetic_helpers() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, 0.5, 0.5);
        assert_eq!(add(a, b), Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(subtract(a, b), Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(scale(a, 2.0), Vec3::new(2.0, 4.0, 6.0));
    }
}
