//! Tone engine
//!
//! Owns the frame synthesizer and the output router. This is the handle
//! passed to everything that needs to make the phone sound; there is no
//! global instance.
//!
//! # Contract
//!
//! - `tick()` runs once per scheduler period and never blocks longer than
//!   one sink write timeout
//! - an all-silent frame is not written at all
//! - configuration problems found by `setup()` disable the engine for good;
//!   afterwards ticks and `play` return 0 and control calls are ignored
//! - sink trouble during operation only drops frames

use crate::config::{ConfigError, EngineConfig, FRAME_SAMPLES};
use crate::fault::{FaultCode, FaultSnapshot, FaultState};
use crate::hal::AudioSink;
use crate::logging::LogStream;
use crate::{rt_debug, rt_error, rt_info, rt_warn};

use super::control::ToneControl;
use super::mode::{Destination, ModeSignal, ModeSwitch};
use super::router::{DeliveryStats, OutputRouter, SCRATCH_SAMPLES};
use super::synth::{FrameSynth, ToneKind};

const TAG: &str = "tone";

/// Setup failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// No sink bound for this destination
    SinkUnbound(Destination),
    InvalidConfig(ConfigError),
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SinkUnbound(dest) => write!(f, "{} sink is not bound", dest.as_str()),
            Self::InvalidConfig(err) => write!(f, "{}", err),
        }
    }
}

/// Engine counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub delivery: DeliveryStats,
    /// Frames synthesized
    pub generated: u32,
    /// Frames synthesized but skipped as silent
    pub silent: u32,
    /// Destination the next frame goes to
    pub destination: Destination,
    pub fault: FaultSnapshot,
}

/// Tone engine
pub struct ToneEngine<'a, S, M = &'a ModeSwitch> {
    config: EngineConfig,
    synth: FrameSynth,
    router: OutputRouter<'a, S, M>,
    fault: &'a FaultState,
    log: &'a LogStream,
    frame: [i16; FRAME_SAMPLES],
    pcm: [i16; SCRATCH_SAMPLES],
    ready: bool,
    generated: u32,
    silent: u32,
}

impl<'a, S: AudioSink, M: ModeSignal> ToneEngine<'a, S, M> {
    /// Build the engine. Controls, ticks and `play` are ignored until
    /// `setup()` succeeds.
    pub fn new(
        config: EngineConfig,
        mut router: OutputRouter<'a, S, M>,
        fault: &'a FaultState,
        log: &'a LogStream,
    ) -> Self {
        router.set_timeout_ms(config.write_timeout_ms);
        router.set_gain(Destination::Handset, config.handset_gain);
        router.set_gain(Destination::Base, config.base_gain);

        Self {
            synth: FrameSynth::new(&config),
            config,
            router,
            fault,
            log,
            frame: [0; FRAME_SAMPLES],
            pcm: [0; SCRATCH_SAMPLES],
            ready: false,
            generated: 0,
            silent: 0,
        }
    }

    /// Validate configuration and sinks.
    ///
    /// On failure the fault is recorded, logged once, and the engine stays
    /// disabled.
    pub fn setup(&mut self, now_us: u64) -> Result<(), EngineError> {
        if let Err(err) = self.config.validate() {
            self.fault.set(FaultCode::InvalidConfig, err.code());
            rt_error!(self.log, now_us, TAG, "{}, engine disabled", err);
            return Err(EngineError::InvalidConfig(err));
        }

        if let Some(dest) = self.router.unbound() {
            self.fault.set(FaultCode::SinkUnbound, dest.index() as u32);
            rt_error!(self.log, now_us, TAG, "{} sink is NULL, engine disabled", dest.as_str());
            return Err(EngineError::SinkUnbound(dest));
        }

        self.ready = true;
        rt_info!(
            self.log, now_us, TAG,
            "ready: {} Hz, {} samples/frame, routing to {}",
            self.config.sample_rate, FRAME_SAMPLES, self.router.destination().as_str()
        );
        Ok(())
    }

    /// Setup passed and no fault since.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.ready && !self.fault.is_active()
    }

    /// One scheduler period: synthesize a frame and route it.
    ///
    /// Returns bytes accepted by the sink, 0 when idle, silent or dropped.
    pub fn tick(&mut self, now_us: u64) -> usize {
        if !self.is_enabled() || self.synth.is_idle() {
            return 0;
        }

        let has_content = self.synth.generate_frame(now_us, &mut self.frame);
        self.generated = self.generated.wrapping_add(1);
        if !has_content {
            self.silent = self.silent.wrapping_add(1);
            return 0;
        }

        if self.config.scale_generated {
            self.router.route_and_send(&self.frame, now_us)
        } else {
            self.router.send_unscaled(&self.frame, now_us)
        }
    }

    /// Push external PCM16 (voice, media) through gain and routing.
    ///
    /// Returns bytes accepted.
    pub fn play(&mut self, pcm: &[i16], now_us: u64) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        self.router.route_and_send(pcm, now_us)
    }

    /// Same as `play` for raw PCM16-LE bytes. A trailing odd byte is ignored.
    ///
    /// Stops at the first block the sink does not take completely.
    pub fn play_bytes(&mut self, data: &[u8], now_us: u64) -> usize {
        if !self.is_enabled() {
            return 0;
        }

        let mut accepted = 0;
        for block in data.chunks(SCRATCH_SAMPLES * 2) {
            let mut n = 0;
            for (dst, pair) in self.pcm.iter_mut().zip(block.chunks_exact(2)) {
                *dst = i16::from_le_bytes([pair[0], pair[1]]);
                n += 1;
            }
            if n == 0 {
                break;
            }

            let written = self.router.route_and_send(&self.pcm[..n], now_us);
            accepted += written;
            if written < n * 2 {
                break;
            }
        }
        accepted
    }

    /// Start a tone at `frequency` Hz. Ignored when disabled or not finite.
    pub fn start(&mut self, frequency: f32, pulsing: bool, now_us: u64) {
        if !self.is_enabled() {
            rt_debug!(self.log, now_us, TAG, "start ignored, engine disabled");
            return;
        }
        if !frequency.is_finite() || frequency < 0.0 {
            rt_warn!(self.log, now_us, TAG, "start ignored, bad frequency");
            return;
        }
        self.synth.start(frequency, pulsing, now_us);
        rt_info!(self.log, now_us, TAG, "start {} Hz pulse={}", frequency, pulsing);
    }

    pub fn start_preset(&mut self, kind: ToneKind, now_us: u64) {
        if !self.is_enabled() {
            rt_debug!(self.log, now_us, TAG, "preset ignored, engine disabled");
            return;
        }
        self.synth.start_preset(kind, now_us);
        rt_info!(self.log, now_us, TAG, "preset {:?}", kind);
    }

    pub fn start_noise_only(&mut self, level: f32, now_us: u64) {
        if !self.is_enabled() {
            return;
        }
        self.synth.start_noise_only(level);
        rt_info!(self.log, now_us, TAG, "noise only {}", level);
    }

    /// Stop the tone. A click in progress finishes.
    pub fn stop(&mut self, now_us: u64) {
        if !self.is_enabled() {
            return;
        }
        self.synth.stop();
        rt_debug!(self.log, now_us, TAG, "stop");
    }

    pub fn trigger_click(&mut self) {
        if !self.is_enabled() {
            return;
        }
        self.synth.trigger_click();
    }

    pub fn set_pulse_timing(&mut self, on_ms: u32, off_ms: u32) {
        if !self.is_enabled() {
            return;
        }
        self.synth.set_pulse_timing(on_ms, off_ms);
    }

    /// Returns `false` if disabled or the gain is negative / not finite.
    pub fn set_destination_gain(&mut self, dest: Destination, gain: f32) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.router.set_gain(dest, gain)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            delivery: self.router.stats(),
            generated: self.generated,
            silent: self.silent,
            destination: self.router.destination(),
            fault: self.fault.snapshot(),
        }
    }

    /// Last synthesized frame
    pub fn frame(&self) -> &[i16] {
        &self.frame
    }

    pub fn synth(&self) -> &FrameSynth {
        &self.synth
    }

    pub fn router(&self) -> &OutputRouter<'a, S, M> {
        &self.router
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<S: AudioSink, M: ModeSignal> ToneControl for ToneEngine<'_, S, M> {
    fn start(&mut self, frequency: f32, pulsing: bool, now_us: u64) {
        ToneEngine::start(self, frequency, pulsing, now_us)
    }

    fn start_preset(&mut self, kind: ToneKind, now_us: u64) {
        ToneEngine::start_preset(self, kind, now_us)
    }

    fn start_noise_only(&mut self, level: f32, now_us: u64) {
        ToneEngine::start_noise_only(self, level, now_us)
    }

    fn stop(&mut self, now_us: u64) {
        ToneEngine::stop(self, now_us)
    }

    fn trigger_click(&mut self) {
        ToneEngine::trigger_click(self)
    }

    fn set_pulse_timing(&mut self, on_ms: u32, off_ms: u32) {
        ToneEngine::set_pulse_timing(self, on_ms, off_ms)
    }

    fn set_destination_gain(&mut self, dest: Destination, gain: f32) -> bool {
        ToneEngine::set_destination_gain(self, dest, gain)
    }

    fn stats(&self) -> EngineStats {
        ToneEngine::stats(self)
    }
}
