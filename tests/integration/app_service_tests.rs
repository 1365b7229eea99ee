//! Integration tests for the AppService → safety → control → actuators
//! pipeline.
//!
//! These run on the host (x86_64) and verify the full chain from an
//! inbound message and a sensor snapshot down to the actuator calls,
//! without any real hardware.

use growzone::actuators::Actuator;
use growzone::app::events::AppEvent;
use growzone::app::service::{AppService, SENSOR_ALERT_MESSAGE};
use growzone::config::SystemConfig;
use growzone::identity::DeviceIdentity;
use growzone::safety::SafetyFault;
use growzone::sensors::SensorSnapshot;
use growzone::telemetry::{AlertLevel, StatusDoc};

use super::mock_hw::{
    ActuatorCall, CollectSink, MockOutputs, MockPlatform, ScriptedSensors, snapshot,
};

const SETPOINTS: &str = "smartcrop/ESP32_test/setpoints";
const COMMAND: &str = "smartcrop/ESP32_test/command";

fn make_app() -> (AppService<MockOutputs>, CollectSink) {
    let app = AppService::new(
        SystemConfig::default(),
        DeviceIdentity::new("ESP32_test", "bay-1"),
        MockOutputs::new(),
    );
    (app, CollectSink::new())
}

fn send(app: &mut AppService<MockOutputs>, sink: &mut CollectSink, topic: &str, body: &str) {
    app.handle_message(topic, body.as_bytes(), sink)
        .expect("well-formed body");
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn outputs_forced_off_at_construction() {
    let (app, _) = make_app();
    let port = app.bank().port();
    for a in Actuator::OUTPUTS {
        assert!(!port.level(a), "{a}");
    }
    assert!(port.calls.contains(&ActuatorCall::Light(None)));
}

#[test]
fn no_control_before_first_setpoints() {
    let (mut app, mut sink) = make_app();
    let mut sensors = ScriptedSensors::steady(snapshot(10.0, 30.0, 800));
    let before = app.bank().port().calls.len();

    for t in 0..5u64 {
        assert!(!app.tick(t * 1_000, &mut sensors, &mut sink));
    }

    assert_eq!(app.bank().port().calls.len(), before);
    assert_eq!(app.last_control_ms(), None);
    assert_eq!(sensors.reads, 5);
}

// ── Control policy end to end ────────────────────────────────

#[test]
fn cold_and_dry_drives_heater_and_humidifier() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, r#"{"temperature":24.0,"humidity":65.0,"lightIntensity":80}"#);

    let mut sensors = ScriptedSensors::steady(snapshot(20.0, 50.0, 600));
    assert!(app.tick(0, &mut sensors, &mut sink));

    let state = app.actuators();
    assert!(state.heater);
    assert!(!state.fan);
    assert!(state.humidifier);
    assert_eq!(state.applied_light_intensity(), Some(80));
    assert_eq!(app.bank().port().calls.last(), Some(&ActuatorCall::Light(Some(80))));
}

#[test]
fn humidity_overrides_temperature_fan_decision() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, r#"{"temperature":25.0,"humidity":70.0}"#);

    // Temperature in band turns the fan off; humid air turns it back on.
    let mut sensors = ScriptedSensors::steady(snapshot(25.1, 80.0, 600));
    app.tick(0, &mut sensors, &mut sink);

    let calls = &app.bank().port().calls;
    let fan_writes: Vec<bool> = calls
        .iter()
        .filter_map(|c| match c {
            ActuatorCall::Switch(Actuator::Fan, on) => Some(*on),
            _ => None,
        })
        .collect();
    assert_eq!(fan_writes.last(), Some(&true));
    assert!(fan_writes.contains(&false));
    assert!(!app.actuators().humidifier);
}

#[test]
fn over_temperature_forces_heater_off_and_alerts_once() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, r#"{"temperature":60.0}"#);

    // Setpoint asks for heat, but the reading is over the 45 °C limit.
    let mut sensors = ScriptedSensors::steady(snapshot(47.0, 70.0, 600));
    app.tick(0, &mut sensors, &mut sink);
    app.tick(1_000, &mut sensors, &mut sink);

    let state = app.actuators();
    assert!(!state.heater);
    assert!(state.fan);
    assert_eq!(sink.alerts(), vec![SafetyFault::TemperatureOutOfRange.message()]);
}

#[test]
fn co2_high_keeps_fan_on_while_heating() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, r#"{"temperature":25.0,"humidity":70.0}"#);

    let mut sensors = ScriptedSensors::steady(snapshot(18.0, 70.0, 3_500));
    app.tick(0, &mut sensors, &mut sink);

    let state = app.actuators();
    assert!(state.heater, "heating still requested");
    assert!(state.fan, "CO2 above limit forces ventilation");
    assert!(app.safety().co2());
    assert!(!app.safety().temperature());
}

#[test]
fn invalid_snapshot_skips_control_but_not_safety() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, "{}");

    let mut bad = snapshot(50.0, 70.0, 600);
    bad.valid = false;
    let mut sensors = ScriptedSensors::steady(bad);

    assert!(!app.tick(0, &mut sensors, &mut sink));
    assert!(app.safety().temperature());
    assert_eq!(sink.alerts().len(), 1);
}

#[test]
fn control_is_rate_limited_to_interval() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, "{}");
    let mut sensors = ScriptedSensors::steady(snapshot(25.0, 70.0, 600));

    assert!(app.tick(10_000, &mut sensors, &mut sink));
    assert!(!app.tick(10_400, &mut sensors, &mut sink));
    assert!(!app.tick(10_999, &mut sensors, &mut sink));
    assert!(app.tick(11_000, &mut sensors, &mut sink));
    assert_eq!(app.last_control_ms(), Some(11_000));
    assert_eq!(app.tick_count(), 4);
}

#[test]
fn unreadable_temperature_leaves_heater_alone() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, "{}");
    send(&mut app, &mut sink, COMMAND, r#"{"command":"override","actuator":"heater","action":"on"}"#);

    let mut sensors = ScriptedSensors::steady(snapshot(SensorSnapshot::UNREADABLE, 70.0, 600));
    assert!(app.tick(0, &mut sensors, &mut sink));

    assert!(app.actuators().heater);
    assert_eq!(sink.alerts(), vec![SENSOR_ALERT_MESSAGE]);
}

#[test]
fn sensor_alert_repeats_only_after_interval() {
    let (mut app, mut sink) = make_app();
    let mut sensors = ScriptedSensors::steady(snapshot(22.0, 60.0, 600));
    for _ in 0..3 {
        sensors.push(snapshot(90.0, 60.0, 600));
    }
    sensors.push(snapshot(22.0, 60.0, 600));
    sensors.push(snapshot(90.0, 60.0, 600));

    let warnings = |sink: &CollectSink| {
        sink.count(|e| matches!(e, AppEvent::Alert(a) if a.level == AlertLevel::Warning))
    };

    app.tick(0, &mut sensors, &mut sink);
    assert_eq!(warnings(&sink), 1, "raised on entry");
    app.tick(30_000, &mut sensors, &mut sink);
    assert_eq!(warnings(&sink), 1, "throttled inside the repeat interval");
    app.tick(60_000, &mut sensors, &mut sink);
    assert_eq!(warnings(&sink), 2, "repeated once the interval elapsed");

    // A plausible reading clears the throttle; the next bad one alerts at once.
    app.tick(61_000, &mut sensors, &mut sink);
    app.tick(62_000, &mut sensors, &mut sink);
    assert_eq!(warnings(&sink), 3);
    assert_eq!(sensors.reads, 5);
}

// ── Manual commands ──────────────────────────────────────────

#[test]
fn override_drives_output_and_is_announced() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, COMMAND, r#"{"command":"override","actuator":"pump","action":"on"}"#);

    assert!(app.actuators().pump);
    assert!(app.bank().port().level(Actuator::Pump));
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::ManualOverride { actuator: Actuator::Pump, on: true })
    ));
}

#[test]
fn pump_override_survives_control_cycles() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, "{}");
    send(&mut app, &mut sink, COMMAND, r#"{"command":"override","actuator":"pump","action":"on"}"#);

    let mut sensors = ScriptedSensors::steady(snapshot(20.0, 60.0, 600));
    for t in 0..3u64 {
        app.tick(t * 1_000, &mut sensors, &mut sink);
    }
    assert!(app.actuators().pump, "control never touches the pump");
}

#[test]
fn unknown_actuator_is_silently_ignored() {
    let (mut app, mut sink) = make_app();
    let before = app.bank().port().calls.len();
    send(&mut app, &mut sink, COMMAND, r#"{"command":"override","actuator":"sprinkler","action":"on"}"#);

    assert_eq!(app.bank().port().calls.len(), before);
    assert!(sink.events.is_empty());
}

#[test]
fn emergency_stop_turns_everything_off() {
    let (mut app, mut sink) = make_app();
    for a in ["fan", "humidifier", "heater", "light", "pump", "valve"] {
        let body = format!(r#"{{"command":"override","actuator":"{a}","action":"on"}}"#);
        send(&mut app, &mut sink, COMMAND, &body);
    }
    send(&mut app, &mut sink, COMMAND, r#"{"command":"emergency_stop"}"#);

    for a in Actuator::OUTPUTS {
        assert!(!app.bank().get(a), "{a}");
        assert!(!app.bank().port().level(a), "{a}");
    }
    assert!(matches!(sink.events.last(), Some(AppEvent::EmergencyStop)));
}

#[test]
fn malformed_body_changes_nothing() {
    let (mut app, mut sink) = make_app();
    let before = app.actuators();
    let err = app.handle_message(SETPOINTS, br#"{"temperature": 30"#, &mut sink);

    assert!(err.is_err());
    assert!(!app.setpoints().is_valid());
    assert_eq!(app.actuators(), before);
    assert_eq!(app.dispatcher().malformed_count(), 1);
    assert!(matches!(sink.events[..], [AppEvent::MessageRejected(_)]));
}

#[test]
fn config_message_is_acknowledged_not_applied() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, "smartcrop/ESP32_test/config", r#"{"telemetryInterval":10}"#);

    assert_eq!(app.dispatcher().requested_telemetry_interval(), Some(10));
    assert_eq!(app.config().telemetry_interval_secs, 60);
}

// ── Reporting ────────────────────────────────────────────────

#[test]
fn link_up_announces_online_with_rssi() {
    let (app, mut sink) = make_app();
    let platform = MockPlatform {
        uptime_ms: 12_345,
        rssi: Some(-61),
    };
    app.link_up(&platform, &mut sink);

    match &sink.events[..] {
        [AppEvent::Status(s)] => {
            assert_eq!(s.status, StatusDoc::ONLINE);
            assert_eq!(s.uptime_secs, 12);
            assert_eq!(s.rssi_dbm, -61);
            assert_eq!(s.zone_id.as_str(), "bay-1");
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn telemetry_reflects_latest_tick() {
    let (mut app, mut sink) = make_app();
    send(&mut app, &mut sink, SETPOINTS, r#"{"temperature":24.0}"#);
    let mut sensors = ScriptedSensors::steady(snapshot(20.0, 70.0, 650));
    app.tick(0, &mut sensors, &mut sink);

    let mut platform = MockPlatform::default();
    platform.uptime_ms = 60_000;
    app.poll_schedules(60_000, &platform, &mut sink);

    let telemetry = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t),
            _ => None,
        })
        .expect("telemetry emitted");
    assert_eq!(telemetry.timestamp_ms, 60_000);
    assert_eq!(telemetry.environment.co2, 650);
    assert!(telemetry.actuators.heater);
    assert!(telemetry.actuators.light);
}
