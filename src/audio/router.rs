//! Output router
//!
//! Picks the handset or base bus from the mode signal, scales by that
//! destination's gain and hands PCM16-LE bytes to its sink.
//!
//! Delivery is best-effort and lossy:
//! - the mode is read once per call, a flip applies to the next call
//! - a short write returns what was accepted, nothing is retried or queued
//! - a sink error drops the whole buffer and returns 0
//!
//! A failure streak is logged once when it starts and once when it ends,
//! so a stalled bus cannot flood the log ring.

use crate::logging::LogStream;
use crate::hal::{AudioSink, SinkError};
use crate::{rt_debug, rt_info, rt_warn};

use super::gain::apply_gain;
use super::mode::{Destination, ModeSignal, ModeSwitch};

const TAG: &str = "router";

/// Samples scaled per sink write. Larger buffers go out in several writes.
pub const SCRATCH_SAMPLES: usize = 256;

/// One physical output
pub struct DestinationProfile<S> {
    destination: Destination,
    gain: f32,
    sink: Option<S>,
}

impl<S> DestinationProfile<S> {
    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_bound(&self) -> bool {
        self.sink.is_some()
    }
}

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Buffers fully accepted
    pub sent: u32,
    /// Buffers cut short by the sink timeout
    pub partial: u32,
    /// Buffers lost to a sink error or an unbound destination
    pub dropped: u32,
    /// Total bytes accepted
    pub bytes: u64,
}

/// Router over two sinks of type `S`
pub struct OutputRouter<'a, S, M = &'a ModeSwitch> {
    profiles: [DestinationProfile<S>; 2],
    mode: Option<M>,
    timeout_ms: u32,
    stats: DeliveryStats,
    failing: bool,
    log: &'a LogStream,
    samples: [i16; SCRATCH_SAMPLES],
    bytes: [u8; SCRATCH_SAMPLES * 2],
}

impl<'a, S: AudioSink, M: ModeSignal> OutputRouter<'a, S, M> {
    /// Create router
    ///
    /// # Arguments
    /// * `handset` - sink for destination A (also used when `mode` is `None`)
    /// * `base` - sink for destination B
    /// * `mode` - routing signal, `None` pins everything to the handset
    pub fn new(handset: Option<S>, base: Option<S>, mode: Option<M>, log: &'a LogStream) -> Self {
        Self {
            profiles: [
                DestinationProfile { destination: Destination::Handset, gain: 1.0, sink: handset },
                DestinationProfile { destination: Destination::Base, gain: 1.0, sink: base },
            ],
            mode,
            timeout_ms: 10,
            stats: DeliveryStats::default(),
            failing: false,
            log,
            samples: [0; SCRATCH_SAMPLES],
            bytes: [0; SCRATCH_SAMPLES * 2],
        }
    }

    /// Upper bound for each sink write
    pub fn set_timeout_ms(&mut self, timeout_ms: u32) {
        self.timeout_ms = timeout_ms.max(1);
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Set a destination gain. Rejects negative and non-finite values.
    pub fn set_gain(&mut self, dest: Destination, gain: f32) -> bool {
        if !crate::config::is_gain(gain) {
            return false;
        }
        self.profiles[dest.index()].gain = gain;
        true
    }

    pub fn gain(&self, dest: Destination) -> f32 {
        self.profiles[dest.index()].gain
    }

    pub fn profile(&self, dest: Destination) -> &DestinationProfile<S> {
        &self.profiles[dest.index()]
    }

    /// First destination without a sink, if any
    pub fn unbound(&self) -> Option<Destination> {
        self.profiles.iter().find(|p| p.sink.is_none()).map(|p| p.destination)
    }

    /// Destination the next call would use
    #[inline]
    pub fn destination(&self) -> Destination {
        Destination::from_mode(self.mode.as_ref().map(|m| m.use_base()))
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    /// Scale by the active destination gain and write.
    ///
    /// Returns bytes accepted by the sink.
    pub fn route_and_send(&mut self, pcm: &[i16], now_us: u64) -> usize {
        self.deliver(pcm, true, now_us)
    }

    /// Write without destination gain (already-levelled frames).
    pub fn send_unscaled(&mut self, pcm: &[i16], now_us: u64) -> usize {
        self.deliver(pcm, false, now_us)
    }

    fn deliver(&mut self, pcm: &[i16], scaled: bool, now_us: u64) -> usize {
        if pcm.is_empty() {
            return 0;
        }

        let dest = self.destination();
        let timeout_ms = self.timeout_ms;
        let profile = &mut self.profiles[dest.index()];
        let gain = if scaled { profile.gain } else { 1.0 };

        let Some(sink) = profile.sink.as_mut() else {
            self.stats.dropped += 1;
            if !self.failing {
                self.failing = true;
                rt_warn!(self.log, now_us, TAG, "{} sink unbound, dropping", dest.as_str());
            }
            return 0;
        };

        let mut accepted = 0usize;
        for chunk in pcm.chunks(SCRATCH_SAMPLES) {
            let n = apply_gain(chunk, gain, &mut self.samples);
            for (pair, s) in self.bytes.chunks_exact_mut(2).zip(&self.samples[..n]) {
                pair.copy_from_slice(&s.to_le_bytes());
            }
            let len = n * 2;

            match sink.write(&self.bytes[..len], timeout_ms) {
                Ok(written) if written >= len => accepted += len,
                Ok(written) => {
                    accepted += written;
                    self.stats.partial += 1;
                    self.stats.bytes += accepted as u64;
                    rt_debug!(
                        self.log, now_us, TAG,
                        "{} short write {}/{}", dest.as_str(), accepted, pcm.len() * 2
                    );
                    return accepted;
                }
                Err(err) => {
                    // Earlier chunks already reached the sink
                    if accepted > 0 {
                        self.stats.partial += 1;
                        self.stats.bytes += accepted as u64;
                    } else {
                        self.stats.dropped += 1;
                    }
                    if !self.failing {
                        self.failing = true;
                        log_sink_error(self.log, now_us, dest, err);
                    }
                    return accepted;
                }
            }
        }

        if self.failing {
            self.failing = false;
            rt_info!(
                self.log, now_us, TAG,
                "{} recovered, {} dropped so far", dest.as_str(), self.stats.dropped
            );
        }
        self.stats.sent += 1;
        self.stats.bytes += accepted as u64;
        accepted
    }
}

fn log_sink_error(log: &LogStream, now_us: u64, dest: Destination, err: SinkError) {
    rt_warn!(log, now_us, TAG, "{} write failed: {}, dropping frames", dest.as_str(), err);
}
