//! Tone engine tests: synthesis, routing and fault handling end to end

use rotary_phone_audio::audio::{
    Destination, EngineError, ModeSwitch, OutputRouter, ToneControl, ToneEngine, ToneKind,
};
use rotary_phone_audio::config::{ConfigError, EngineConfig, FRAME_SAMPLES};
use rotary_phone_audio::fault::{FaultCode, FaultState};
use rotary_phone_audio::hal::{AudioSink, SinkError};
use rotary_phone_audio::logging::{LogLevel, LogStream};

const FRAME_BYTES: usize = FRAME_SAMPLES * 2;
const MS: u64 = 1_000;

#[derive(Default)]
struct MockSink {
    writes: Vec<Vec<u8>>,
    accept: Option<usize>,
    fail: bool,
}

impl MockSink {
    fn bytes(&self) -> usize {
        self.writes.iter().map(|w| w.len()).sum()
    }
}

impl AudioSink for MockSink {
    fn write(&mut self, data: &[u8], _timeout_ms: u32) -> Result<usize, SinkError> {
        if self.fail {
            return Err(SinkError::Io(-1));
        }
        let n = self.accept.map_or(data.len(), |a| a.min(data.len()));
        self.writes.push(data[..n].to_vec());
        Ok(n)
    }
}

type Engine<'a> = ToneEngine<'a, &'a mut MockSink, &'a ModeSwitch>;

fn engine<'a>(
    config: EngineConfig,
    handset: &'a mut MockSink,
    base: &'a mut MockSink,
    mode: &'a ModeSwitch,
    fault: &'a FaultState,
    log: &'a LogStream,
) -> Engine<'a> {
    let router = OutputRouter::new(Some(handset), Some(base), Some(mode), log);
    let mut engine = ToneEngine::new(config, router, fault, log);
    engine.setup(0).unwrap();
    engine
}

#[test]
fn test_idle_engine_writes_nothing() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    for i in 0..10 {
        assert_eq!(eng.tick(i * 10 * MS), 0);
    }
    assert_eq!(eng.stats().generated, 0);
    drop(eng);
    assert!(a.writes.is_empty());
}

#[test]
fn test_start_425_first_frame() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start(425.0, false, 0);
    assert_eq!(eng.synth().generator().click().remaining(), 160);

    assert_eq!(eng.tick(0), FRAME_BYTES);
    assert_eq!(eng.synth().generator().click().remaining(), 0);
    assert!(eng.frame().iter().any(|&s| s != 0));
    // Tone 0.5 + noise 0.01 + click 0.8 stays within full scale
    assert!(eng.frame().iter().all(|&s| s > i16::MIN));

    // Second frame: tone only, bounded by tone + noise level
    assert_eq!(eng.tick(10 * MS), FRAME_BYTES);
    let limit = ((0.5 + 0.01) * i16::MAX as f32) as i16 + 1;
    assert!(eng.frame().iter().all(|&s| s.abs() <= limit));

    let stats = eng.stats();
    assert_eq!(stats.generated, 2);
    assert_eq!(stats.delivery.sent, 2);
    drop(eng);
    assert_eq!(a.writes.len(), 2);
    assert!(b.writes.is_empty());
}

#[test]
fn test_silent_frame_is_skipped() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start_preset(ToneKind::Ringback, 0);
    assert_eq!(eng.tick(0), FRAME_BYTES);

    // Off window, click finished: nothing to send
    assert_eq!(eng.tick(2_000 * MS), 0);
    assert_eq!(eng.tick(2_010 * MS), 0);
    assert!(eng.frame().iter().all(|&s| s == 0));

    // Next on window
    assert_eq!(eng.tick(5_000 * MS), FRAME_BYTES);

    let stats = eng.stats();
    assert_eq!(stats.silent, 2);
    assert_eq!(stats.generated, 4);
    drop(eng);
    assert_eq!(a.writes.len(), 2);
}

#[test]
fn test_stop_lets_click_finish() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start(425.0, false, 0);
    eng.stop(0);
    assert!(!eng.synth().is_idle());

    // Click-only frame is still a full frame
    assert_eq!(eng.tick(0), FRAME_BYTES);
    assert!(eng.synth().is_idle());
    assert_eq!(eng.tick(10 * MS), 0);
}

#[test]
fn test_trigger_click_while_idle() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.trigger_click();
    assert_eq!(eng.tick(0), FRAME_BYTES);
    assert!(eng.frame().iter().all(|&s| (s as i32).abs() <= (0.8 * i16::MAX as f32) as i32 + 1));
    assert_eq!(eng.tick(10 * MS), 0);
}

#[test]
fn test_mode_flip_changes_destination() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start(425.0, false, 0);
    eng.tick(0);
    mode.set(Destination::Base);
    assert_eq!(eng.stats().destination, Destination::Base);
    eng.tick(10 * MS);
    eng.tick(20 * MS);
    drop(eng);

    assert_eq!(a.writes.len(), 1);
    assert_eq!(b.writes.len(), 2);
}

#[test]
fn test_destination_gain_applies_to_tones() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    assert!(eng.set_destination_gain(Destination::Handset, 0.0));
    assert!(!eng.set_destination_gain(Destination::Handset, -1.0));
    eng.start(425.0, false, 0);
    eng.tick(0);
    drop(eng);

    assert!(a.writes[0].iter().all(|&b| b == 0));
}

#[test]
fn test_unscaled_generation_bypasses_gain() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let config = EngineConfig { scale_generated: false, handset_gain: 0.0, ..EngineConfig::default() };
    let mut eng = engine(config, &mut a, &mut b, &mode, &fault, &log);

    eng.start(425.0, false, 0);
    eng.tick(0);
    drop(eng);

    assert!(a.writes[0].iter().any(|&b| b != 0));
}

#[test]
fn test_play_external_pcm() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.set_destination_gain(Destination::Handset, 0.5);
    assert_eq!(eng.play(&[1000, -1000], 0), 4);
    drop(eng);

    assert_eq!(a.writes[0], vec![0xF4, 0x01, 0x0C, 0xFE]);
}

#[test]
fn test_play_bytes_ignores_odd_tail() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    let data: Vec<u8> = (0..1001u32).map(|i| i as u8).collect();
    assert_eq!(eng.play_bytes(&data, 0), 1000);
    drop(eng);

    assert_eq!(a.bytes(), 1000);
    // 500 samples in blocks of 256
    assert_eq!(a.writes.len(), 2);
    assert_eq!(&a.writes[0][..4], &[0, 1, 2, 3]);
}

#[test]
fn test_play_bytes_stops_on_short_write() {
    let mut a = MockSink { accept: Some(100), ..MockSink::default() };
    let mut b = MockSink::default();
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    assert_eq!(eng.play_bytes(&[0u8; 2000], 0), 100);
    assert_eq!(eng.stats().delivery.partial, 1);
    drop(eng);
    assert_eq!(a.writes.len(), 1);
}

#[test]
fn test_partial_tick_reports_accepted_bytes() {
    let mut a = MockSink { accept: Some(64), ..MockSink::default() };
    let mut b = MockSink::default();
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start(425.0, false, 0);
    assert_eq!(eng.tick(0), 64);
}

#[test]
fn test_sink_error_drops_frame_only() {
    let mut a = MockSink { fail: true, ..MockSink::default() };
    let mut b = MockSink::default();
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start(425.0, false, 0);
    assert_eq!(eng.tick(0), 0);
    assert_eq!(eng.tick(10 * MS), 0);
    assert!(eng.is_enabled());
    assert!(!fault.is_active());
    assert_eq!(eng.stats().delivery.dropped, 2);
}

#[test]
fn test_unbound_sink_disables_engine() {
    let mut a = MockSink::default();
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let router = OutputRouter::new(Some(&mut a), None, Some(&mode), &log);
    let mut eng = ToneEngine::new(EngineConfig::default(), router, &fault, &log);

    assert_eq!(eng.setup(0), Err(EngineError::SinkUnbound(Destination::Base)));
    assert!(!eng.is_enabled());
    assert_eq!(fault.code(), FaultCode::SinkUnbound);
    assert_eq!(fault.data(), 1);

    let entry = log.drain().unwrap();
    assert_eq!(entry.level, LogLevel::Error);
    assert_eq!(entry.tag, "tone");
    assert!(entry.message().contains("base sink"));

    // Everything is a no-op from here on
    eng.start(425.0, false, 0);
    eng.trigger_click();
    assert!(eng.synth().is_idle());
    assert_eq!(eng.tick(0), 0);
    assert_eq!(eng.play(&[1, 2, 3], 0), 0);
    assert!(!eng.set_destination_gain(Destination::Handset, 0.5));
    assert!(eng.stats().fault.active);
    drop(eng);
    assert!(a.writes.is_empty());
}

#[test]
fn test_invalid_config_disables_engine() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let router = OutputRouter::new(Some(&mut a), Some(&mut b), Some(&mode), &log);
    let config = EngineConfig { tone_amplitude: 1.5, ..EngineConfig::default() };
    let mut eng = ToneEngine::new(config, router, &fault, &log);

    assert_eq!(eng.setup(0), Err(EngineError::InvalidConfig(ConfigError::Amplitude)));
    assert_eq!(fault.code(), FaultCode::InvalidConfig);
    assert_eq!(fault.data(), ConfigError::Amplitude.code());
    assert_eq!(eng.tick(0), 0);
}

#[test]
fn test_tick_before_setup_is_noop() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let router = OutputRouter::new(Some(&mut a), Some(&mut b), Some(&mode), &log);
    let mut eng = ToneEngine::new(EngineConfig::default(), router, &fault, &log);

    eng.start(425.0, false, 0);
    eng.start_noise_only(0.5, 0);
    eng.trigger_click();
    eng.set_pulse_timing(200, 300);
    assert!(eng.synth().is_idle());
    assert!(!eng.set_destination_gain(Destination::Handset, 0.5));
    assert_eq!(eng.tick(0), 0);
    assert_eq!(eng.play(&[1], 0), 0);

    // Nothing set before setup carries over
    eng.setup(0).unwrap();
    assert!(eng.synth().is_idle());
    assert_eq!(eng.router().gain(Destination::Handset), 1.0);
}

#[test]
fn test_bad_frequency_ignored() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start(f32::NAN, false, 0);
    eng.start(-10.0, true, 0);
    assert!(eng.synth().is_idle());
}

#[test]
fn test_set_pulse_timing_keeps_anchor() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start(425.0, true, 3_000 * MS);
    eng.set_pulse_timing(500, 500);

    let env = eng.synth().envelope();
    assert_eq!(env.pattern_start_us(), 3_000 * MS);
    assert!(env.is_open(3_000 * MS));
    assert!(!env.is_open(3_600 * MS));
    assert!(env.is_open(4_000 * MS));
}

#[test]
fn test_presets() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start_preset(ToneKind::Busy, 0);
    let env = eng.synth().envelope();
    assert!(env.is_pulsing());
    assert_eq!(env.timing_ms(), (500, 500));
    assert_eq!(eng.synth().generator().oscillator().frequency(), 425.0);

    eng.start_preset(ToneKind::Dial, 0);
    assert!(!eng.synth().envelope().is_pulsing());
}

#[test]
fn test_noise_only() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    eng.start_noise_only(0.05, 0);
    let mix = eng.synth().generator().mix();
    assert_eq!(mix.tone, 0.0);
    assert_eq!(mix.noise, 0.05);
    assert_eq!(eng.tick(0), FRAME_BYTES);
    let limit = (0.05 * i16::MAX as f32) as i16 + 1;
    assert!(eng.frame().iter().all(|&s| s.abs() <= limit));

    // A new start restores the configured levels
    eng.start(425.0, false, 0);
    assert_eq!(eng.synth().generator().mix().tone, 0.5);
}

#[test]
fn test_control_through_trait_object() {
    let (mut a, mut b) = (MockSink::default(), MockSink::default());
    let (mode, fault, log) = (ModeSwitch::new(), FaultState::new(), LogStream::new());
    let mut eng = engine(EngineConfig::default(), &mut a, &mut b, &mode, &fault, &log);

    {
        let ctl: &mut dyn ToneControl = &mut eng;
        ctl.start_preset(ToneKind::Ringback, 0);
        assert!(ctl.set_destination_gain(Destination::Base, 1.5));
        assert_eq!(ctl.stats().destination, Destination::Handset);
    }
    assert_eq!(eng.router().gain(Destination::Base), 1.5);
    assert!(!eng.synth().is_idle());
}
