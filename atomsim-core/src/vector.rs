//! Double precision 2D vector used throughout the engine.
//!
//! `glam::DVec2` already provides everything the physics needs: `+`, `-`,
//! unary `-`, scalar `*` and `/`, [`DVec2::dot`], [`DVec2::length`] and
//! [`DVec2::length_squared`]. Note that `*` between two vectors is the
//! component-wise product in glam; the dot product is always spelled `dot`.

pub use glam::{dvec2 as vector2, DVec2 as Vector2};

/// True when both components are finite (no NaN, no infinity).
#[inline]
pub fn is_finite(v: Vector2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_matches_component_math() {
        let a = vector2(3.0, 4.0);
        let b = vector2(-1.0, 2.0);

        assert_eq!(a + b, vector2(2.0, 6.0));
        assert_eq!(a - b, vector2(4.0, 2.0));
        assert_eq!(-a, vector2(-3.0, -4.0));
        assert_eq!(a * 2.0, vector2(6.0, 8.0));
        assert_eq!(a / 2.0, vector2(1.5, 2.0));
        assert_eq!(a.dot(b), 5.0);
    }

    #[test]
    fn length_and_square_length() {
        let a = vector2(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.length_squared(), 25.0);
        assert_eq!(Vector2::ZERO.length(), 0.0);
    }

    #[test]
    fn finiteness_check() {
        assert!(is_finite(vector2(1.0, -2.0)));
        assert!(!is_finite(vector2(f64::NAN, 0.0)));
        assert!(!is_finite(vector2(0.0, f64::INFINITY)));
    }
}
