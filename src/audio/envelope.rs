//! Cadence envelope
//!
//! Gates the tone and comfort noise. Steady tones are open whenever the
//! envelope is active; pulsing tones follow an on/off pattern anchored at
//! the last `start`. Timing uses wall-clock microseconds, not tick counts,
//! so scheduler jitter does not stretch the cadence.

/// Envelope state
#[derive(Debug, Clone)]
pub struct PulseEnvelope {
    active: bool,
    pulsing: bool,
    on_us: u64,
    off_us: u64,
    /// Anchor of the cadence pattern
    pattern_start_us: u64,
}

impl PulseEnvelope {
    /// Create inactive envelope with the given cadence
    pub fn new(on_ms: u32, off_ms: u32) -> Self {
        Self {
            active: false,
            pulsing: false,
            on_us: on_ms as u64 * 1000,
            off_us: off_ms as u64 * 1000,
            pattern_start_us: 0,
        }
    }

    /// Activate and re-anchor the cadence at `now_us`.
    pub fn start(&mut self, pulsing: bool, now_us: u64) {
        self.active = true;
        self.pulsing = pulsing;
        self.pattern_start_us = now_us;
    }

    /// Activate as a steady gate without touching the anchor.
    pub fn start_steady(&mut self) {
        self.active = true;
        self.pulsing = false;
    }

    #[inline]
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Change the cadence. The anchor is kept, so the next boundary is
    /// computed from the existing pattern start.
    pub fn set_timing(&mut self, on_ms: u32, off_ms: u32) {
        self.on_us = on_ms as u64 * 1000;
        self.off_us = off_ms as u64 * 1000;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_pulsing(&self) -> bool {
        self.pulsing
    }

    #[inline]
    pub fn pattern_start_us(&self) -> u64 {
        self.pattern_start_us
    }

    /// Cadence as (on_ms, off_ms)
    pub fn timing_ms(&self) -> (u32, u32) {
        ((self.on_us / 1000) as u32, (self.off_us / 1000) as u32)
    }

    /// Cadence phase at `now_us`, ignoring `active`.
    ///
    /// The on window is `[0, on)` of each period: exactly `on` ms after the
    /// anchor is already off, exactly one period after it is on again.
    #[inline]
    pub fn output_enabled(&self, now_us: u64) -> bool {
        if !self.pulsing {
            return true;
        }
        let period = self.on_us + self.off_us;
        if period == 0 {
            return true;
        }
        // A clock behind the anchor counts as the start of the pattern
        let elapsed = now_us.saturating_sub(self.pattern_start_us) % period;
        elapsed < self.on_us
    }

    /// True when the tone path should sound at `now_us`.
    #[inline]
    pub fn is_open(&self, now_us: u64) -> bool {
        self.active && self.output_enabled(now_us)
    }
}
