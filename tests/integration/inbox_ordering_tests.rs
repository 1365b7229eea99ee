//! Inbound queue → dispatcher ordering.
//!
//! Messages posted from the transport thread are applied in arrival
//! order at the top of the next iteration, before the control cycle.

use std::thread;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use growzone::actuators::Actuator;
use growzone::app::events::AppEvent;
use growzone::app::inbox::{CommandInbox, INBOX_DEPTH, MAX_PAYLOAD};
use growzone::app::service::AppService;
use growzone::config::SystemConfig;
use growzone::error::InboxError;
use growzone::identity::DeviceIdentity;

use super::mock_hw::{CollectSink, MockOutputs, ScriptedSensors, snapshot};

const COMMAND: &str = "smartcrop/ESP32_test/command";
const SETPOINTS: &str = "smartcrop/ESP32_test/setpoints";

fn make_app() -> AppService<MockOutputs> {
    AppService::new(
        SystemConfig::default(),
        DeviceIdentity::new("ESP32_test", "bay-1"),
        MockOutputs::new(),
    )
}

fn override_body(actuator: &str, action: &str) -> String {
    format!(r#"{{"command":"override","actuator":"{actuator}","action":"{action}"}}"#)
}

#[test]
fn stop_then_later_override_applies_both_in_order() {
    let inbox: CommandInbox<CriticalSectionRawMutex> = CommandInbox::new();
    let mut app = make_app();
    let mut sink = CollectSink::new();

    inbox.post(COMMAND, override_body("valve", "on").as_bytes()).unwrap();
    inbox.post(COMMAND, br#"{"command":"emergency_stop"}"#).unwrap();
    inbox.post(COMMAND, override_body("pump", "on").as_bytes()).unwrap();

    assert_eq!(app.drain_inbox(&inbox, &mut sink), 3);
    assert!(inbox.is_empty());

    // The valve override predates the stop; the pump one is a new command.
    assert!(!app.bank().get(Actuator::Valve));
    assert!(app.bank().get(Actuator::Pump));
    let kinds: Vec<_> = sink
        .events
        .iter()
        .map(|e| match e {
            AppEvent::ManualOverride { actuator, .. } => actuator.name(),
            AppEvent::EmergencyStop => "stop",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["valve", "stop", "pump"]);
}

#[test]
fn stop_is_applied_before_the_next_cycle() {
    let inbox: CommandInbox<CriticalSectionRawMutex> = CommandInbox::new();
    let mut app = make_app();
    let mut sink = CollectSink::new();
    let mut sensors = ScriptedSensors::steady(snapshot(20.0, 50.0, 600));

    inbox.post(SETPOINTS, b"{}").unwrap();
    app.drain_inbox(&inbox, &mut sink);
    app.tick(0, &mut sensors, &mut sink);
    assert!(app.actuators().heater);

    inbox.post(COMMAND, br#"{"command":"emergency_stop"}"#).unwrap();
    app.drain_inbox(&inbox, &mut sink);
    assert!(Actuator::OUTPUTS.iter().all(|a| !app.bank().get(*a)));

    // The stop is not latched: the next cycle resumes control.
    app.tick(1_000, &mut sensors, &mut sink);
    assert!(app.actuators().heater);
}

#[test]
fn malformed_message_does_not_block_the_queue() {
    let inbox: CommandInbox<CriticalSectionRawMutex> = CommandInbox::new();
    let mut app = make_app();
    let mut sink = CollectSink::new();

    inbox.post(COMMAND, b"not json").unwrap();
    inbox.post(COMMAND, override_body("fan", "on").as_bytes()).unwrap();

    assert_eq!(app.drain_inbox(&inbox, &mut sink), 2);
    assert!(app.bank().get(Actuator::Fan));
    assert_eq!(app.dispatcher().malformed_count(), 1);
}

#[test]
fn full_inbox_rejects_without_losing_queued_messages() {
    let inbox: CommandInbox<CriticalSectionRawMutex> = CommandInbox::new();
    for _ in 0..INBOX_DEPTH {
        inbox.post(COMMAND, override_body("fan", "on").as_bytes()).unwrap();
    }
    assert_eq!(
        inbox.post(COMMAND, override_body("fan", "off").as_bytes()),
        Err(InboxError::Full)
    );

    let mut app = make_app();
    let mut sink = CollectSink::new();
    assert_eq!(app.drain_inbox(&inbox, &mut sink), INBOX_DEPTH);
    assert!(app.bank().get(Actuator::Fan));
}

#[test]
fn oversized_payload_is_refused() {
    let inbox: CommandInbox<CriticalSectionRawMutex> = CommandInbox::new();
    let big = vec![b' '; MAX_PAYLOAD + 1];
    assert_eq!(inbox.post(COMMAND, &big), Err(InboxError::PayloadTooLarge));
    assert!(inbox.is_empty());
}

#[test]
fn posts_from_another_thread_keep_their_order() {
    static INBOX: CommandInbox<CriticalSectionRawMutex> = CommandInbox::new();

    let producer = thread::spawn(|| {
        INBOX.post(COMMAND, override_body("heater", "on").as_bytes()).unwrap();
        INBOX.post(COMMAND, override_body("heater", "off").as_bytes()).unwrap();
        INBOX.post(COMMAND, override_body("humidifier", "on").as_bytes()).unwrap();
    });
    producer.join().unwrap();

    let mut app = make_app();
    let mut sink = CollectSink::new();
    assert_eq!(app.drain_inbox(&INBOX, &mut sink), 3);
    assert!(!app.bank().get(Actuator::Heater));
    assert!(app.bank().get(Actuator::Humidifier));
}
