//! # RotaryPhoneAudio
//!
//! Vintage telephone tones on a two-output ESP32 audio board.
//!
//! ## Architecture
//!
//! One owned [`ToneEngine`] per board, ticked every 10 ms from the main loop:
//! - Synthesis: 425 Hz line tone with wobble, comfort noise, hook click
//! - Cadence: steady or pulsed (ringback, busy) per sample
//! - Routing: handset or base speaker by the mode switch, per-output gain
//! - Sinks: bounded-time writes, frames dropped rather than waiting
//!
//! The audio path never blocks past one sink timeout and never allocates.
//! Logs go through a lock-free ring drained after the tick.

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod battery;
pub mod config;
pub mod console;
pub mod fault;
pub mod hal;
pub mod logging;
pub mod scheduler;
pub mod uart_logger;

pub use audio::{Destination, ModeSwitch, ToneControl, ToneEngine, ToneKind};
pub use config::{BoardPins, EngineConfig};
pub use fault::{FaultCode, FaultState};
pub use hal::{AudioSink, SinkError};
pub use logging::LogStream;
pub use scheduler::TickSchedule;
