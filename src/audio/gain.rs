//! Volume and clip stage
//!
//! Scales PCM16 by a destination gain into a separate output buffer.
//! The input is never written: it may be a view owned by a media
//! pipeline. Results are rounded half away from zero and hard-clipped,
//! so overdriven samples saturate instead of wrapping.

/// Convert a unit-range sample to PCM16.
///
/// Values outside [-1, 1] are clipped first.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Scale one sample, round and clip.
#[inline]
pub fn scale_sample(sample: i16, gain: f32) -> i16 {
    let scaled = libm::roundf(sample as f32 * gain);
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Apply `gain` to `input`, writing into `out`.
///
/// Processes `min(input.len(), out.len())` samples and returns that count.
/// A non-finite or negative gain is treated as mute.
pub fn apply_gain(input: &[i16], gain: f32, out: &mut [i16]) -> usize {
    let n = input.len().min(out.len());
    let gain = if gain.is_finite() && gain >= 0.0 { gain } else { 0.0 };

    if gain == 1.0 {
        out[..n].copy_from_slice(&input[..n]);
        return n;
    }

    for (dst, &src) in out[..n].iter_mut().zip(&input[..n]) {
        *dst = scale_sample(src, gain);
    }
    n
}
