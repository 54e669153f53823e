//! Sine lookup table for tone and wobble generation
//!
//! 256 segments over one cycle plus a guard entry so interpolation at the
//! last segment never wraps. Values are unit amplitude.

/// Number of segments in the sine LUT
pub const LUT_SIZE: usize = 256;

/// Pre-computed sine, `SINE_LUT[i] = sin(2π·i/256)`, `SINE_LUT[256] == SINE_LUT[0]`
pub static SINE_LUT: [f32; LUT_SIZE + 1] = {
    let mut table = [0.0f32; LUT_SIZE + 1];
    let mut i = 0;
    while i < LUT_SIZE {
        let angle = (i as f64) * core::f64::consts::PI * 2.0 / (LUT_SIZE as f64);
        table[i] = const_sin(angle) as f32;
        i += 1;
    }
    table[LUT_SIZE] = table[0];
    table
};

/// Const-compatible sine approximation using Taylor series
const fn const_sin(x: f64) -> f64 {
    // Normalize to [-π, π]
    let mut x = x;
    while x > core::f64::consts::PI {
        x -= 2.0 * core::f64::consts::PI;
    }
    while x < -core::f64::consts::PI {
        x += 2.0 * core::f64::consts::PI;
    }
    // Fold into [-π/2, π/2] where the series converges fast
    if x > core::f64::consts::FRAC_PI_2 {
        x = core::f64::consts::PI - x;
    } else if x < -core::f64::consts::FRAC_PI_2 {
        x = -core::f64::consts::PI - x;
    }

    // sin(x) = x - x³/3! + x⁵/5! - x⁷/7! + x⁹/9! - x¹¹/11!
    let x2 = x * x;
    let x3 = x2 * x;
    let x5 = x3 * x2;
    let x7 = x5 * x2;
    let x9 = x7 * x2;
    let x11 = x9 * x2;

    x - x3 / 6.0 + x5 / 120.0 - x7 / 5040.0 + x9 / 362880.0 - x11 / 39916800.0
}

/// `sin(2π·phase)` for `phase` in [0, 1), linearly interpolated.
///
/// Out-of-range phases are clamped to the table, callers keep phase wrapped.
#[inline]
pub fn sine(phase: f32) -> f32 {
    let pos = phase * LUT_SIZE as f32;
    // `as` saturates, so NaN and negatives land on index 0
    let idx = (pos as usize).min(LUT_SIZE - 1);
    let frac = (pos - idx as f32).clamp(0.0, 1.0);
    let a = SINE_LUT[idx];
    let b = SINE_LUT[idx + 1];
    a + (b - a) * frac
}
