//! End-to-end session behaviour with scripted input sources.

use autoclick_core::testing::{CountingSink, ScriptedSource, SourceProbe};
use autoclick_core::{
    ButtonId, ClickerError, ExitReason, InputEvent, KeyId, RateConfig, RateSetting, Session,
    SessionReport, Settings, ShutdownOutcome, EXIT_KEY,
};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct Harness {
    sink: Arc<CountingSink>,
    keyboard: SourceProbe,
    pointer: SourceProbe,
    session: JoinHandle<Result<SessionReport, ClickerError>>,
}

fn start(settings: Settings) -> Harness {
    let sink = Arc::new(CountingSink::new());
    let (keyboard, kb_probe) = ScriptedSource::new("keyboard");
    let (pointer, ptr_probe) = ScriptedSource::new("pointer");
    let session = Session::new(settings, sink.clone(), Box::new(keyboard), Box::new(pointer));
    let handle = thread::spawn(move || session.run());

    assert!(kb_probe.wait_started(Duration::from_secs(2)));
    Harness {
        sink,
        keyboard: kb_probe,
        pointer: ptr_probe,
        session: handle,
    }
}

fn settings(rate: &str, key: &str, button: Option<&str>) -> Settings {
    Settings {
        rate: RateSetting::Text(rate.into()),
        toggle_key: Some(key.into()),
        toggle_button: button.map(Into::into),
        ..Settings::default()
    }
}

#[test]
fn test_keyboard_toggle_at_10_cps() {
    let h = start(settings("10", "c", None));

    assert!(h.keyboard.send(InputEvent::KeyPress(KeyId::Char('c'))));
    thread::sleep(Duration::from_secs(1));
    assert!(h.keyboard.send(InputEvent::KeyPress(KeyId::Char('c'))));

    thread::sleep(Duration::from_millis(30));
    let clicks = h.sink.count();
    assert!((9..=11).contains(&clicks), "got {clicks} clicks");

    thread::sleep(Duration::from_millis(500));
    assert_eq!(h.sink.count(), clicks);

    assert!(h.keyboard.send(InputEvent::KeyPress(EXIT_KEY)));
    let report = h.session.join().unwrap().unwrap();
    assert_eq!(report.exit_reason, ExitReason::ExitKey);
    assert_eq!(report.shutdown, ShutdownOutcome::Completed);
    assert_eq!(report.total_clicks, clicks);
    assert!(!report.used_rate_fallback);
}

#[test]
fn test_negative_rate_uses_default_interval() {
    let derived = RateConfig::derive(-5.0);
    assert!(derived.used_fallback);
    assert!((derived.config.interval_secs() - 0.002).abs() < 1e-12);

    let h = start(settings("-5", "c", None));
    assert!(h.keyboard.send(InputEvent::KeyPress(EXIT_KEY)));
    let report = h.session.join().unwrap().unwrap();
    assert!(report.used_rate_fallback);
}

#[test]
fn test_right_button_toggles() {
    let h = start(settings("50", "c", Some("right")));
    assert!(h.pointer.wait_started(Duration::from_secs(2)));

    assert!(h.pointer.send(InputEvent::ButtonPress(ButtonId::Left)));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(h.sink.count(), 0);

    assert!(h.pointer.send(InputEvent::ButtonPress(ButtonId::Right)));
    assert!(h.pointer.send(InputEvent::ButtonRelease(ButtonId::Right)));
    thread::sleep(Duration::from_millis(100));
    assert!(h.sink.count() > 0);

    assert!(h.keyboard.send(InputEvent::KeyPress(EXIT_KEY)));
    h.session.join().unwrap().unwrap();
    assert_eq!(h.pointer.stop_count(), 1);
}

#[test]
fn test_escape_stops_everything() {
    let h = start(settings("200", "c", None));
    assert!(h.keyboard.send(InputEvent::KeyPress(KeyId::Char('c'))));
    thread::sleep(Duration::from_millis(50));

    assert!(h.keyboard.send(InputEvent::KeyPress(EXIT_KEY)));
    let report = h.session.join().unwrap().unwrap();
    assert_eq!(report.shutdown, ShutdownOutcome::Completed);

    let clicks = h.sink.count();
    assert_eq!(report.total_clicks, clicks);

    // The listener is gone, so further toggles cannot reach anything.
    assert!(!h.keyboard.is_started());
    assert!(!h.keyboard.send(InputEvent::KeyPress(KeyId::Char('c'))));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(h.sink.count(), clicks);
}

#[test]
fn test_unknown_button_keeps_keyboard_toggle() {
    let sink = Arc::new(CountingSink::new());
    let (keyboard, kb_probe) = ScriptedSource::new("keyboard");
    let (pointer, ptr_probe) = ScriptedSource::new("pointer");
    let settings = Settings {
        toggle_button: Some("banana".into()),
        rate: RateSetting::Number(100.0),
        ..Settings::default()
    };
    let session = Session::new(settings, sink.clone(), Box::new(keyboard), Box::new(pointer));
    let handle = thread::spawn(move || session.run());

    assert!(kb_probe.wait_started(Duration::from_secs(2)));
    // Button toggling is disabled, so the pointer listener is never started.
    assert!(!ptr_probe.is_started());

    assert!(kb_probe.send(InputEvent::KeyPress(KeyId::Char('c'))));
    thread::sleep(Duration::from_millis(100));
    assert!(sink.count() > 0);

    assert!(kb_probe.send(InputEvent::KeyPress(EXIT_KEY)));
    handle.join().unwrap().unwrap();
}

#[test]
fn test_pointer_start_failure_stops_keyboard() {
    let (keyboard, kb_probe) = ScriptedSource::new("keyboard");
    let (pointer, _) = ScriptedSource::failing("pointer");
    let session = Session::new(
        settings("10", "c", Some("right")),
        Arc::new(CountingSink::new()),
        Box::new(keyboard),
        Box::new(pointer),
    );

    let result = session.run();
    assert!(matches!(
        result,
        Err(ClickerError::ListenerStartFailure { ref source_name, .. }) if source_name == "pointer"
    ));
    assert!(!kb_probe.is_started());
    assert_eq!(kb_probe.stop_count(), 1);
}

#[test]
fn test_sources_closing_ends_session() {
    let h = start(settings("10", "c", None));
    assert!(h.keyboard.send(InputEvent::KeyPress(KeyId::Char('c'))));
    thread::sleep(Duration::from_millis(50));

    h.keyboard.disconnect();
    let report = h.session.join().unwrap().unwrap();
    assert_eq!(report.exit_reason, ExitReason::SourcesClosed);
    assert_eq!(report.shutdown, ShutdownOutcome::Completed);
    assert!(report.total_clicks >= 1);
}
