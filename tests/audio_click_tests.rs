//! Hook click tests

use rotary_phone_audio::audio::ClickImpulse;

#[test]
fn test_strict_countdown() {
    let mut click = ClickImpulse::new(160);
    click.trigger();
    assert_eq!(click.remaining(), 160);

    for expected in (0..160u16).rev() {
        assert!(click.step());
        assert_eq!(click.remaining(), expected);
    }
    assert!(!click.step());
    assert_eq!(click.remaining(), 0);
}

#[test]
fn test_retrigger_rearms_to_full_length() {
    let mut click = ClickImpulse::new(160);
    click.trigger();
    for _ in 0..100 {
        click.step();
    }
    assert_eq!(click.remaining(), 60);

    click.trigger();
    assert_eq!(click.remaining(), 160);
    assert_eq!(click.burst_len(), 160);
}

#[test]
fn test_idle_step_is_noop() {
    let mut click = ClickImpulse::new(160);
    assert!(!click.is_armed());
    for _ in 0..10 {
        assert!(!click.step());
    }
}
