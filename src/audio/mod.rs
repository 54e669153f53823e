//! Audio subsystem: line tones and dual-output routing
//!
//! Architecture:
//! - Signal generator: LUT sine + unit phase, frequency wobble, comfort
//!   noise, hook click burst
//! - Frame synthesizer: cadence gate per sample, 160-sample frames @ 16 kHz
//! - Gain stage: per-destination level, round and hard clip
//! - Router: handset or base bus from the mode switch, lossy bounded writes
//! - Engine: owns all of the above, one `tick()` per 10 ms

pub mod click;
pub mod control;
pub mod engine;
pub mod envelope;
pub mod gain;
pub mod generator;
pub mod lut;
pub mod mode;
pub mod router;
pub mod synth;

pub use click::ClickImpulse;
pub use control::ToneControl;
pub use engine::{EngineError, EngineStats, ToneEngine};
pub use envelope::PulseEnvelope;
pub use gain::{apply_gain, quantize, scale_sample};
pub use generator::{MixLevels, Oscillator, SignalGenerator};
pub use lut::{sine, SINE_LUT, LUT_SIZE};
pub use mode::{Debounce, Destination, ModeSignal, ModeSwitch};
pub use router::{DeliveryStats, DestinationProfile, OutputRouter};
pub use synth::{FrameSynth, ToneKind};
