//! Control surface
//!
//! Object-safe view of the engine for callers that should not know the
//! sink or mode types (console, hook switch handler, ...). Pass the engine
//! as `&mut dyn ToneControl`.

use super::engine::EngineStats;
use super::mode::Destination;
use super::synth::ToneKind;

pub trait ToneControl {
    /// Start a tone at `frequency` Hz, steady or with the current cadence.
    fn start(&mut self, frequency: f32, pulsing: bool, now_us: u64);

    /// Start a call progress tone.
    fn start_preset(&mut self, kind: ToneKind, now_us: u64);

    /// Line hiss only.
    fn start_noise_only(&mut self, level: f32, now_us: u64);

    fn stop(&mut self, now_us: u64);

    /// Fire a hook click without touching the tone.
    fn trigger_click(&mut self);

    fn set_pulse_timing(&mut self, on_ms: u32, off_ms: u32);

    /// Returns `false` if the gain was rejected.
    fn set_destination_gain(&mut self, dest: Destination, gain: f32) -> bool;

    fn stats(&self) -> EngineStats;
}
