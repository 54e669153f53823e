//! Frame synthesizer
//!
//! Drives the signal generator for one frame per scheduler tick. The
//! cadence gate is evaluated per sample at the sample's own wall-clock
//! time, so a cadence edge can fall inside a frame.
//!
//! A frame is always the full length, even when only a click is pending
//! and the tone is off: the tail is padded with silence.

use crate::config::{EngineConfig, LINE_TONE_HZ};

use super::click::ClickImpulse;
use super::envelope::PulseEnvelope;
use super::gain::quantize;
use super::generator::{MixLevels, Oscillator, SignalGenerator};

/// Call progress tones of the phone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneKind {
    /// Steady line tone after lifting the handset
    Dial,
    /// 1 s on, 4 s off while the far end rings
    Ringback,
    /// 0.5 s on, 0.5 s off
    Busy,
}

impl ToneKind {
    /// Frequency, pulsing flag and cadence (on_ms, off_ms)
    pub fn profile(self) -> (f32, bool, u32, u32) {
        match self {
            Self::Dial => (LINE_TONE_HZ, false, 1000, 4000),
            Self::Ringback => (LINE_TONE_HZ, true, 1000, 4000),
            Self::Busy => (LINE_TONE_HZ, true, 500, 500),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "dial" => Some(Self::Dial),
            "ringback" | "ring" => Some(Self::Ringback),
            "busy" => Some(Self::Busy),
            _ => None,
        }
    }
}

/// Frame synthesizer
pub struct FrameSynth {
    gen: SignalGenerator,
    env: PulseEnvelope,
    /// Levels restored by `start`
    default_tone: f32,
    default_noise: f32,
    sample_rate: u32,
}

impl FrameSynth {
    pub fn new(config: &EngineConfig) -> Self {
        let wobble = config
            .wobble_enabled
            .then_some((config.wobble_depth_hz, config.wobble_rate_hz));
        let osc = Oscillator::new(LINE_TONE_HZ, config.sample_rate, wobble);
        let mix = MixLevels {
            tone: config.tone_amplitude,
            noise: config.noise_amplitude,
            click: config.click_amplitude,
        };
        let click = ClickImpulse::new(config.click_samples);

        Self {
            gen: SignalGenerator::new(osc, mix, click, config.noise_seed),
            env: PulseEnvelope::new(config.pulse_on_ms, config.pulse_off_ms),
            default_tone: config.tone_amplitude,
            default_noise: config.noise_amplitude,
            sample_rate: config.sample_rate.max(1),
        }
    }

    /// Start a tone. Restarts the waveform, the cadence and the default
    /// levels, and fires the hook click.
    pub fn start(&mut self, frequency: f32, pulsing: bool, now_us: u64) {
        let osc = self.gen.oscillator_mut();
        osc.set_frequency(frequency);
        osc.reset_phase();

        self.env.start(pulsing, now_us);

        let mix = self.gen.mix_mut();
        mix.tone = self.default_tone;
        mix.noise = self.default_noise;

        self.gen.click_mut().trigger();
    }

    /// Start a preset with its own cadence.
    pub fn start_preset(&mut self, kind: ToneKind, now_us: u64) {
        let (freq, pulsing, on_ms, off_ms) = kind.profile();
        self.env.set_timing(on_ms, off_ms);
        self.start(freq, pulsing, now_us);
    }

    /// Line hiss only: steady gate, tone muted, noise at `level` (0.0-1.0).
    pub fn start_noise_only(&mut self, level: f32) {
        self.env.start_steady();
        let mix = self.gen.mix_mut();
        mix.tone = 0.0;
        mix.noise = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
    }

    /// Silence the tone path. A pending click still plays out.
    #[inline]
    pub fn stop(&mut self) {
        self.env.stop();
    }

    /// Re-arm the click without touching the tone.
    #[inline]
    pub fn trigger_click(&mut self) {
        self.gen.click_mut().trigger();
    }

    /// Change cadence, keeping the pattern anchor.
    #[inline]
    pub fn set_pulse_timing(&mut self, on_ms: u32, off_ms: u32) {
        self.env.set_timing(on_ms, off_ms);
    }

    /// Nothing to generate: tone stopped and no click pending.
    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.env.is_active() && !self.gen.click().is_armed()
    }

    /// Fill `out` with the next frame starting at `now_us`.
    ///
    /// Returns `has_content`: false means every sample is silence and the
    /// caller should skip the sink write.
    pub fn generate_frame(&mut self, now_us: u64, out: &mut [i16]) -> bool {
        let mut has_content = false;

        for (i, slot) in out.iter_mut().enumerate() {
            let t = now_us + i as u64 * 1_000_000 / self.sample_rate as u64;
            let gate = self.env.is_open(t);
            has_content |= self.gen.would_sound(gate);
            *slot = quantize(self.gen.next_sample(gate));
        }

        has_content
    }

    pub fn envelope(&self) -> &PulseEnvelope {
        &self.env
    }

    pub fn generator(&self) -> &SignalGenerator {
        &self.gen
    }
}
