//! Hardware Abstraction Layer for RotaryPhoneAudio.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Business logic stays in core modules, HAL is just I/O.

pub mod drv2605;
#[cfg(target_os = "espidf")]
pub mod gpio;
#[cfg(target_os = "espidf")]
pub mod i2s;

pub use drv2605::{Drv2605, Drv2605Error, MotorType, DRV2605_ADDR};

/// Sink write failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// Nothing accepted before the timeout
    Timeout,
    /// Driver error (ESP-IDF error code on target)
    Io(i32),
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Io(code) => write!(f, "io error {}", code),
        }
    }
}

/// Anything that can take PCM16-LE bytes with a bounded wait.
///
/// `Ok(n)` with `n < data.len()` is a short write: the rest was not
/// accepted within `timeout_ms`. Implementations must not block longer
/// than `timeout_ms`.
pub trait AudioSink {
    fn write(&mut self, data: &[u8], timeout_ms: u32) -> Result<usize, SinkError>;
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    #[inline]
    fn write(&mut self, data: &[u8], timeout_ms: u32) -> Result<usize, SinkError> {
        (**self).write(data, timeout_ms)
    }
}
