//! Signal generator: tone, comfort noise and click
//!
//! One mono sample per call, unit range. The tone oscillator runs on a
//! unit-interval phase with a slow sinusoidal frequency wobble that has
//! its own phase. Comfort noise rides on the tone path, the click burst
//! does not: it sounds even while the tone is gated off.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::click::ClickImpulse;
use super::lut::sine;

/// Gains of the three signal components, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixLevels {
    pub tone: f32,
    pub noise: f32,
    pub click: f32,
}

/// Wrap into [0, 1).
#[inline]
pub fn wrap_unit(x: f32) -> f32 {
    let w = x - (x as i64) as f32;
    let w = if w < 0.0 { w + 1.0 } else { w };
    // -tiny + 1.0 rounds to 1.0 in f32
    if w >= 1.0 || !w.is_finite() {
        0.0
    } else {
        w
    }
}

/// Tone oscillator with frequency wobble
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase, [0, 1)
    phase: f32,
    /// Base frequency in Hz
    frequency: f32,
    /// Wobble phase, [0, 1)
    wobble_phase: f32,
    wobble_enabled: bool,
    /// Peak deviation in Hz
    wobble_depth: f32,
    /// Wobble phase increment per sample
    wobble_inc: f32,
    /// 1 / sample_rate
    sample_period: f32,
}

impl Oscillator {
    /// Create oscillator at phase 0
    ///
    /// # Arguments
    /// * `frequency` - Base frequency in Hz
    /// * `sample_rate` - Output sample rate in Hz
    /// * `wobble` - `Some((depth_hz, rate_hz))` to enable drift
    pub fn new(frequency: f32, sample_rate: u32, wobble: Option<(f32, f32)>) -> Self {
        let sample_period = 1.0 / sample_rate.max(1) as f32;
        let (depth, rate) = wobble.unwrap_or((0.0, 0.0));
        Self {
            phase: 0.0,
            frequency,
            wobble_phase: 0.0,
            wobble_enabled: wobble.is_some(),
            wobble_depth: depth,
            wobble_inc: rate * sample_period,
            sample_period,
        }
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    #[inline]
    pub fn wobble_phase(&self) -> f32 {
        self.wobble_phase
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    /// Restart the waveform at phase 0. Wobble keeps running.
    #[inline]
    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    /// Frequency the next sample will be generated at
    #[inline]
    pub fn effective_frequency(&self) -> f32 {
        if self.wobble_enabled {
            self.frequency + sine(self.wobble_phase) * self.wobble_depth
        } else {
            self.frequency
        }
    }

    /// Return `sin(2π·phase)` and advance both phases by one sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let freq = self.effective_frequency();
        if self.wobble_enabled {
            self.wobble_phase = wrap_unit(self.wobble_phase + self.wobble_inc);
        }

        let value = sine(self.phase);
        self.phase = wrap_unit(self.phase + freq * self.sample_period);
        value
    }
}

/// Sample generator
///
/// Owns the oscillator, mix levels, click countdown and the noise source.
pub struct SignalGenerator {
    osc: Oscillator,
    mix: MixLevels,
    click: ClickImpulse,
    rng: SmallRng,
}

impl SignalGenerator {
    pub fn new(osc: Oscillator, mix: MixLevels, click: ClickImpulse, seed: u64) -> Self {
        Self {
            osc,
            mix,
            click,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Generate next sample in [-1, 1]
    ///
    /// # Arguments
    /// * `tone_gate` - envelope output; gates tone and comfort noise only
    #[inline]
    pub fn next_sample(&mut self, tone_gate: bool) -> f32 {
        let mut val = 0.0f32;

        if tone_gate {
            val += self.osc.next() * self.mix.tone;
            val += self.uniform() * self.mix.noise;
        }

        if self.click.step() {
            val += self.uniform() * self.mix.click;
        }

        val.clamp(-1.0, 1.0)
    }

    /// True if a sample generated with `tone_gate` would carry any signal.
    #[inline]
    pub fn would_sound(&self, tone_gate: bool) -> bool {
        self.click.is_armed() || (tone_gate && (self.mix.tone > 0.0 || self.mix.noise > 0.0))
    }

    #[inline]
    fn uniform(&mut self) -> f32 {
        self.rng.random_range(-1.0f32..=1.0)
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.osc
    }

    pub fn oscillator_mut(&mut self) -> &mut Oscillator {
        &mut self.osc
    }

    pub fn mix(&self) -> MixLevels {
        self.mix
    }

    pub fn mix_mut(&mut self) -> &mut MixLevels {
        &mut self.mix
    }

    pub fn click(&self) -> &ClickImpulse {
        &self.click
    }

    pub fn click_mut(&mut self) -> &mut ClickImpulse {
        &mut self.click
    }
}
