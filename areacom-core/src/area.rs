//! The component's one business method.

use std::f64::consts::PI;

/// Area of a circle with the given radius.
///
/// No validation: negative or non-finite radii produce whatever the arithmetic
/// gives. `comment` only exercises string passing across the interop boundary;
/// its rewritten form is traced and dropped.
pub fn compute_area(radius: f64, comment: &str) -> f64 {
    let rewritten = comment.replace("abc", "def");
    tracing::trace!(comment = %rewritten, "compute_area comment");
    PI * (radius * radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn radius_two_is_four_pi() {
        assert_eq!(compute_area(2.0, "abcxyz"), 12.566370614359172);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-3.5)]
    #[case(1e-150)]
    #[case(123456.789)]
    fn result_is_pi_r_squared_regardless_of_comment(#[case] r: f64) {
        let expected = PI * (r * r);
        assert_eq!(compute_area(r, ""), expected);
        assert_eq!(compute_area(r, "abcabc"), expected);
        assert_eq!(compute_area(r, "ünïcödé ✓"), expected);
    }

    #[test]
    fn non_finite_radius_does_not_panic() {
        assert!(compute_area(f64::NAN, "x").is_nan());
        assert_eq!(compute_area(f64::INFINITY, "x"), f64::INFINITY);
    }
}
