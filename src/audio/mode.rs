//! Destination selection
//!
//! Two physical outputs, picked by one boolean mode signal. The signal is
//! written by whoever watches the switch and read once per routed frame.

use core::sync::atomic::{AtomicBool, Ordering};

/// Physical audio output
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Handset earpiece (destination A, the default)
    Handset = 0,
    /// Base speaker (destination B)
    Base = 1,
}

impl Destination {
    /// Resolve a mode reading. No signal means the handset.
    #[inline]
    pub fn from_mode(use_base: Option<bool>) -> Self {
        match use_base {
            Some(true) => Self::Base,
            _ => Self::Handset,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Handset => "handset",
            Self::Base => "base",
        }
    }

    /// Parse a console name ("handset"/"a", "base"/"b").
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "handset" | "a" => Some(Self::Handset),
            "base" | "b" => Some(Self::Base),
            _ => None,
        }
    }
}

/// Source of the routing mode: `true` selects the base speaker.
pub trait ModeSignal {
    fn use_base(&self) -> bool;
}

impl<T: ModeSignal + ?Sized> ModeSignal for &T {
    #[inline]
    fn use_base(&self) -> bool {
        (**self).use_base()
    }
}

/// Thread-safe mode switch
///
/// Written by the GPIO poller (or a test), read by the router.
pub struct ModeSwitch {
    base: AtomicBool,
}

impl ModeSwitch {
    /// Create new switch (starts on the handset)
    pub const fn new() -> Self {
        Self {
            base: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn get(&self) -> Destination {
        Destination::from_mode(Some(self.base.load(Ordering::Acquire)))
    }

    #[inline]
    pub fn set(&self, dest: Destination) {
        self.base.store(dest == Destination::Base, Ordering::Release);
    }

    /// Atomically swap to a new destination, return the old one
    #[inline]
    pub fn swap(&self, dest: Destination) -> Destination {
        let old = self.base.swap(dest == Destination::Base, Ordering::AcqRel);
        Destination::from_mode(Some(old))
    }
}

impl ModeSignal for ModeSwitch {
    #[inline]
    fn use_base(&self) -> bool {
        self.base.load(Ordering::Acquire)
    }
}

impl Default for ModeSwitch {
    fn default() -> Self {
        Self::new()
    }
}

/// Integrating debouncer for the mode switch contact
///
/// A new level is accepted after `stable_reads` identical raw samples.
#[derive(Debug, Clone)]
pub struct Debounce {
    stable_reads: u8,
    state: bool,
    candidate: bool,
    count: u8,
}

impl Debounce {
    pub const fn new(initial: bool, stable_reads: u8) -> Self {
        Self {
            stable_reads: if stable_reads == 0 { 1 } else { stable_reads },
            state: initial,
            candidate: initial,
            count: 0,
        }
    }

    /// Debounced level
    #[inline]
    pub fn state(&self) -> bool {
        self.state
    }

    /// Feed one raw sample. Returns `Some(level)` when the debounced
    /// level changes.
    pub fn update(&mut self, raw: bool) -> Option<bool> {
        if raw == self.state {
            self.candidate = raw;
            self.count = 0;
            return None;
        }

        if raw != self.candidate {
            self.candidate = raw;
            self.count = 0;
        }
        self.count += 1;

        if self.count >= self.stable_reads {
            self.state = raw;
            self.count = 0;
            Some(raw)
        } else {
            None
        }
    }
}
