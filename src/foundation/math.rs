pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Normalized progress of `t` through `[0, duration]`, clamped to `[0, 1]`.
pub(crate) fn progress(t: f64, duration: f64) -> f64 {
    if duration.is_nan() || duration <= 0.0 || !t.is_finite() {
        return 0.0;
    }
    (t / duration).clamp(0.0, 1.0)
}
