use super::*;

#[test]
fn lerp_endpoints_are_exact() {
    for (a, b) in [(1.0, 1.2), (-0.1, 0.1), (1.05, 1.18), (0.02, -0.02)] {
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
    }
}

#[test]
fn lerp_clamps_out_of_range_t() {
    assert_eq!(lerp(2.0, 4.0, -1.0), 2.0);
    assert_eq!(lerp(2.0, 4.0, 7.0), 4.0);
    assert_eq!(lerp(2.0, 4.0, f64::NAN), 2.0);
}

#[test]
fn lerp_u8_rounds_to_nearest() {
    assert_eq!(lerp_u8(0, 255, 0.5), 128);
    assert_eq!(lerp_u8(10, 10, 0.3), 10);
}

#[test]
fn mul_div255_matches_expected_rounding() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn safe_ratio_guards_zero_denominator() {
    assert_eq!(safe_ratio(5.0, 0.0), 0.0);
    assert_eq!(safe_ratio(5.0, 10.0), 0.5);
}
