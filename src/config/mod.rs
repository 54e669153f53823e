//! Module: config
//!
//! Purpose: Engine tuning and board wiring.
//!
//! Architecture:
//! - `EngineConfig`: signal levels, cadence, per-destination gain, sink timeout.
//!   `Default` is the reference design (16 kHz, 160-sample frames, 425 Hz line).
//! - `BoardPins`: GPIO map for the firmware binary only.
//! - Values are read once when the engine is built; runtime changes go
//!   through the engine's control surface.

/// Output sample rate of both I2S buses.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Samples per generated frame (10 ms at 16 kHz).
pub const FRAME_SAMPLES: usize = 160;

/// Click burst length in samples.
pub const CLICK_SAMPLES: u16 = 160;

/// European line frequency used by all presets.
pub const LINE_TONE_HZ: f32 = 425.0;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Tone level restored by every `start` (0.0-1.0)
    pub tone_amplitude: f32,
    /// Comfort noise level restored by every `start` (0.0-1.0)
    pub noise_amplitude: f32,
    /// Click burst level (0.0-1.0)
    pub click_amplitude: f32,
    /// Click burst length in samples
    pub click_samples: u16,
    /// Slow frequency drift on the tone
    pub wobble_enabled: bool,
    /// Peak frequency deviation of the drift in Hz
    pub wobble_depth_hz: f32,
    /// Drift rate in Hz
    pub wobble_rate_hz: f32,
    /// Cadence on time in ms
    pub pulse_on_ms: u32,
    /// Cadence off time in ms
    pub pulse_off_ms: u32,
    /// Output gain of the handset bus (destination A)
    pub handset_gain: f32,
    /// Output gain of the base speaker bus (destination B)
    pub base_gain: f32,
    /// Upper bound for a single sink write
    pub write_timeout_ms: u32,
    /// Apply destination gain to generated tones too
    pub scale_generated: bool,
    /// Seed for the noise generator
    pub noise_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE_HZ,
            tone_amplitude: 0.5,
            noise_amplitude: 0.01,
            click_amplitude: 0.8,
            click_samples: CLICK_SAMPLES,
            wobble_enabled: true,
            wobble_depth_hz: 2.0,
            wobble_rate_hz: 0.5,
            pulse_on_ms: 1000,
            pulse_off_ms: 4000,
            handset_gain: 1.0,
            base_gain: 1.0,
            write_timeout_ms: 10,
            scale_generated: true,
            noise_seed: 0x5EED_0425,
        }
    }
}

impl EngineConfig {
    /// Check ranges. Called by `ToneEngine::setup`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        for level in [self.tone_amplitude, self.noise_amplitude, self.click_amplitude] {
            if !is_unit(level) {
                return Err(ConfigError::Amplitude);
            }
        }
        if self.click_samples == 0 {
            return Err(ConfigError::ClickLength);
        }
        if !self.wobble_depth_hz.is_finite() || !self.wobble_rate_hz.is_finite() {
            return Err(ConfigError::Wobble);
        }
        if self.pulse_on_ms == 0 && self.pulse_off_ms == 0 {
            return Err(ConfigError::Cadence);
        }
        if !is_gain(self.handset_gain) || !is_gain(self.base_gain) {
            return Err(ConfigError::Gain);
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Timeout);
        }
        Ok(())
    }

    /// Frame duration in microseconds.
    pub fn frame_period_us(&self) -> u64 {
        FRAME_SAMPLES as u64 * 1_000_000 / self.sample_rate.max(1) as u64
    }
}

/// A level in [0, 1].
#[inline]
pub(crate) fn is_unit(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

/// A finite, non-negative gain (amplification allowed).
#[inline]
pub(crate) fn is_gain(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    SampleRate,
    Amplitude,
    ClickLength,
    Wobble,
    Cadence,
    Gain,
    Timeout,
}

impl ConfigError {
    pub fn code(&self) -> u32 {
        match self {
            Self::SampleRate => 1,
            Self::Amplitude => 2,
            Self::ClickLength => 3,
            Self::Wobble => 4,
            Self::Cadence => 5,
            Self::Gain => 6,
            Self::Timeout => 7,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::SampleRate => "sample rate must be non-zero",
            Self::Amplitude => "amplitudes must be within 0.0-1.0",
            Self::ClickLength => "click length must be non-zero",
            Self::Wobble => "wobble depth and rate must be finite",
            Self::Cadence => "cadence period must be non-zero",
            Self::Gain => "gains must be finite and non-negative",
            Self::Timeout => "write timeout must be non-zero",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "config error {}: {}", self.code(), self.message())
    }
}

/// GPIO map of the phone board.
#[derive(Debug, Clone, Copy)]
pub struct BoardPins {
    pub handset_bclk: u8,
    pub handset_ws: u8,
    pub handset_dout: u8,
    pub base_bclk: u8,
    pub base_ws: u8,
    pub base_dout: u8,
    /// High = route to the base speaker
    pub mode_switch: u8,
    pub i2c_sda: u8,
    pub i2c_scl: u8,
}

impl Default for BoardPins {
    fn default() -> Self {
        Self {
            handset_bclk: 4,
            handset_ws: 5,
            handset_dout: 6,
            base_bclk: 15,
            base_ws: 16,
            base_dout: 17,
            mode_switch: 10,
            i2c_sda: 8,
            i2c_scl: 9,
        }
    }
}
