/// Linear interpolation with exact endpoints.
///
/// `t` is clamped to `[0, 1]`; `t == 0` returns `a` and `t == 1` returns `b` bit-for-bit.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t >= 1.0 {
        return b;
    }
    a + (b - a) * t
}

pub(crate) fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    lerp(f64::from(a), f64::from(b), t).round().clamp(0.0, 255.0) as u8
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Ratio `num / den`, or `0.0` when the denominator is not positive.
pub(crate) fn safe_ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
