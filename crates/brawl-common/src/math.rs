//! 2D vector algebra and angle helpers.
//!
//! Screen space is used throughout: +X points right and +Y points down, so an
//! "up" vector has a negative Y component.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// 2D vector for positions, velocities and knockback.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector pointing up (screen space).
    pub const UP: Self = Self { x: 0.0, y: -1.0 };

    /// Unit vector pointing down (screen space).
    pub const DOWN: Self = Self { x: 0.0, y: 1.0 };

    /// Unit vector pointing left.
    pub const LEFT: Self = Self { x: -1.0, y: 0.0 };

    /// Unit vector pointing right.
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Creates a new Vec2.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector for an angle in radians, measured from +X towards +Y.
    #[must_use]
    pub fn from_angle(radians: f32) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    /// Returns the length (magnitude) of the vector.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the squared length of the vector.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Returns a normalized (unit length) version of the vector.
    /// Returns zero vector if the vector has zero length.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Checks whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[must_use]
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Angle of the vector in radians, in `(-PI, PI]`.
    #[must_use]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Rotates the vector by `radians`. Magnitude is preserved.
    #[must_use]
    pub fn rotated(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Scale the vector by a scalar.
    #[must_use]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Add two vectors.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtract two vectors.
    #[must_use]
    pub fn minus(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.minus(other).length()
    }

    /// Unit direction from `self` towards `target`, zero if they coincide.
    #[must_use]
    pub fn direction_to(self, target: Self) -> Self {
        target.minus(self).normalized()
    }

    /// Checks approximate equality within `epsilon` on both axes.
    #[must_use]
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.plus(rhs)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.minus(rhs)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

/// Converts degrees to radians.
#[must_use]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * PI / 180.0
}

/// Converts radians to degrees.
#[must_use]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * 180.0 / PI
}

/// Wraps an angle in radians into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(radians: f32) -> f32 {
    let wrapped = (radians + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed shortest rotation in radians that takes `from` onto `to`.
///
/// Zero vectors have no direction; the delta is zero in that case.
#[must_use]
pub fn signed_angle_between(from: Vec2, to: Vec2) -> f32 {
    if from.is_zero() || to.is_zero() {
        return 0.0;
    }
    from.cross(to).atan2(from.dot(to))
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
#[must_use]
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    rad_to_deg(signed_angle_between(a, b).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vec2::new(3.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < EPS);
        assert!(v.approx_eq(Vec2::new(0.6, 0.8), EPS));
    }

    #[test]
    fn test_rotation_preserves_length() {
        let v = Vec2::new(12.0, -5.0);
        let r = v.rotated(deg_to_rad(37.0));
        assert!((r.length() - v.length()).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let r = Vec2::RIGHT.rotated(deg_to_rad(90.0));
        assert!(r.approx_eq(Vec2::DOWN, EPS));
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(0.25) - 0.25).abs() < EPS);
    }

    #[test]
    fn test_signed_angle_between() {
        let delta = signed_angle_between(Vec2::RIGHT, Vec2::DOWN);
        assert!((delta - PI / 2.0).abs() < EPS);
        let back = signed_angle_between(Vec2::DOWN, Vec2::RIGHT);
        assert!((back + PI / 2.0).abs() < EPS);
        assert_eq!(signed_angle_between(Vec2::ZERO, Vec2::RIGHT), 0.0);
    }

    #[test]
    fn test_angle_between_deg() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(-1.0, 0.0);
        assert!((angle_between_deg(a, b) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_direction_to() {
        let d = Vec2::new(1.0, 1.0).direction_to(Vec2::new(4.0, 5.0));
        assert!(d.approx_eq(Vec2::new(0.6, 0.8), EPS));
        assert_eq!(Vec2::new(2.0, 2.0).direction_to(Vec2::new(2.0, 2.0)), Vec2::ZERO);
    }
}
