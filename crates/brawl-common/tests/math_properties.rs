//! Property-based tests for the vector helpers.

use brawl_common::{angle_between_deg, deg_to_rad, signed_angle_between, wrap_angle, Vec2};
use proptest::prelude::*;

fn direction() -> impl Strategy<Value = Vec2> {
    (-100.0f32..100.0, -100.0f32..100.0)
        .prop_filter("non-zero", |(x, y)| x.abs() > 0.01 || y.abs() > 0.01)
        .prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_wrap_angle_in_range(radians in -1000.0f32..1000.0) {
        let wrapped = wrap_angle(radians);
        prop_assert!(wrapped > -std::f32::consts::PI - 1e-5);
        prop_assert!(wrapped <= std::f32::consts::PI + 1e-5);
    }

    #[test]
    fn prop_rotation_preserves_length(v in direction(), degrees in -360.0f32..360.0) {
        let rotated = v.rotated(deg_to_rad(degrees));
        prop_assert!((rotated.length() - v.length()).abs() <= v.length() * 1e-4);
    }

    #[test]
    fn prop_angle_between_is_symmetric_and_bounded(a in direction(), b in direction()) {
        let ab = angle_between_deg(a, b);
        prop_assert!((0.0..=180.0 + 1e-3).contains(&ab));
        prop_assert!((ab - angle_between_deg(b, a)).abs() < 1e-2);
    }

    #[test]
    fn prop_signed_angle_rotates_onto_target(a in direction(), b in direction()) {
        let turned = a.normalized().rotated(signed_angle_between(a, b));
        prop_assert!(turned.approx_eq(b.normalized(), 1e-3));
    }
}
