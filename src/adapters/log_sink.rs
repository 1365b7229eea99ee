//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! The MQTT adapter implements the same trait for the broker side.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::telemetry::AlertLevel;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let env = &t.environment;
                let act = &t.actuators;
                info!(
                    "TELEM | T={:.1}\u{00b0}C RH={:.1}% CO2={}ppm lux={} soil={}% | \
                     fan={} hum={} heat={} light={} pump={}",
                    env.temperature,
                    env.humidity,
                    env.co2,
                    env.light_level,
                    env.soil_moisture,
                    on_off(act.fan),
                    on_off(act.humidifier),
                    on_off(act.heater),
                    on_off(act.light),
                    on_off(act.pump),
                );
            }
            AppEvent::Status(s) => {
                info!(
                    "STATUS | {} | {}/{} v{} | up={}s heap={}B rssi={}dBm",
                    s.status,
                    s.zone_id,
                    s.device_id,
                    s.firmware_version,
                    s.uptime_secs,
                    s.free_heap_bytes,
                    s.rssi_dbm,
                );
            }
            AppEvent::Alert(a) => match a.level {
                AlertLevel::Critical => error!("ALERT | critical | {}", a.message),
                AlertLevel::Warning => warn!("ALERT | warning | {}", a.message),
            },
            AppEvent::SetpointsUpdated(sp) => {
                info!(
                    "SETPT | T={:.1}\u{00b0}C RH={:.1}% CO2={}ppm light={}h@{}%",
                    sp.temperature_c,
                    sp.humidity_pct,
                    sp.co2_ppm,
                    sp.light_hours,
                    sp.light_intensity,
                );
            }
            AppEvent::ManualOverride { actuator, on } => {
                info!("OVRD | {} -> {}", actuator, on_off(*on));
            }
            AppEvent::EmergencyStop => {
                error!("ESTOP | all outputs off");
            }
            AppEvent::MessageRejected(e) => {
                warn!("REJECT | {}", e);
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "off" }
}
