//! Outbound JSON documents: status, telemetry and alert.
//!
//! Keys are camelCase on the wire (`deviceId`, `uptimeSeconds`,
//! `timestampMs`, ...); fields whose Rust name carries a different unit
//! suffix are renamed with serde attributes.

use serde::Serialize;

use crate::actuators::ActuatorState;
use crate::error::TransportError;
use crate::identity::DeviceIdentity;
use crate::sensors::SensorSnapshot;

/// Reported in every status document.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identifier buffer used across the outbound documents.
pub type IdString = heapless::String<32>;

/// Encode a document for publishing.
pub fn encode<T: Serialize>(doc: &T) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(doc).map_err(|_| TransportError::PayloadTooLarge)
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Node liveness (`online` on connect, `running` on every heartbeat).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDoc {
    pub status: &'static str,
    pub device_id: IdString,
    pub zone_id: IdString,
    pub firmware_version: &'static str,
    /// Seconds since boot.
    #[serde(rename = "uptimeSeconds")]
    pub uptime_secs: u64,
    #[serde(rename = "freeMemory")]
    pub free_heap_bytes: u32,
    /// dBm; `0` while not associated.
    #[serde(rename = "signalStrength")]
    pub rssi_dbm: i8,
}

impl StatusDoc {
    pub const ONLINE: &'static str = "online";
    pub const RUNNING: &'static str = "running";
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub temperature: f32,
    pub humidity: f32,
    pub co2: i32,
    pub light_level: i32,
    pub soil_moisture: i32,
}

impl From<&SensorSnapshot> for Environment {
    /// Readings are reported raw, sentinels included.
    fn from(s: &SensorSnapshot) -> Self {
        Self {
            temperature: s.temperature_c,
            humidity: s.humidity_pct,
            co2: s.co2_ppm,
            light_level: s.light_lux,
            soil_moisture: s.soil_moisture_pct,
        }
    }
}

/// Reported outputs. The valve is not part of the telemetry document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuatorReport {
    pub fan: bool,
    pub humidifier: bool,
    pub heater: bool,
    pub light: bool,
    pub pump: bool,
}

impl From<ActuatorState> for ActuatorReport {
    fn from(s: ActuatorState) -> Self {
        Self {
            fan: s.fan,
            humidifier: s.humidifier,
            heater: s.heater,
            light: s.light,
            pump: s.pump,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryDoc {
    pub device_id: IdString,
    pub zone_id: IdString,
    /// Milliseconds since boot.
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
    pub environment: Environment,
    pub actuators: ActuatorReport,
}

impl TelemetryDoc {
    pub fn new(
        identity: &DeviceIdentity,
        timestamp_ms: u64,
        snapshot: &SensorSnapshot,
        actuators: ActuatorState,
    ) -> Self {
        Self {
            device_id: identity.device_id.clone(),
            zone_id: identity.zone_id.clone(),
            timestamp_ms,
            environment: snapshot.into(),
            actuators: actuators.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDoc {
    pub device_id: IdString,
    pub zone_id: IdString,
    pub level: AlertLevel,
    pub message: &'static str,
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
}

impl AlertDoc {
    pub fn new(
        identity: &DeviceIdentity,
        level: AlertLevel,
        message: &'static str,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            device_id: identity.device_id.clone(),
            zone_id: identity.zone_id.clone(),
            level,
            message,
            timestamp_ms,
        }
    }
}
