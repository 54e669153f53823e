//! Fault state for the audio engine.
//!
//! Only configuration failures are faults. A dropped or short frame is
//! normal degradation and is counted in the router's delivery stats instead.
//! Once a fault is set the engine stays silent until reboot.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Why the engine disabled itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// A destination has no sink bound at setup.
    /// Data: destination index (0 = handset, 1 = base).
    SinkUnbound = 1,

    /// `EngineConfig::validate` rejected the configuration.
    /// Data: `ConfigError` code.
    InvalidConfig = 2,
}

impl FaultCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::SinkUnbound,
            2 => FaultCode::InvalidConfig,
            _ => FaultCode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::SinkUnbound => "sink unbound",
            FaultCode::InvalidConfig => "invalid config",
        }
    }
}

/// Thread-safe fault state.
///
/// Written once by `ToneEngine::setup`, read every tick and by the console.
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,
    data: AtomicU32,
    /// Total faults since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Record a fault. The first fault wins; later ones only bump the count.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.count.fetch_add(1, Ordering::Relaxed);
        if self.active.load(Ordering::Acquire) {
            return;
        }
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    #[inline]
    pub fn code(&self) -> FaultCode {
        if !self.is_active() {
            return FaultCode::None;
        }
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}
