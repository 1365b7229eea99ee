//! System configuration parameters
//!
//! All tunable parameters for the GrowZone node. The safety limits and
//! deadbands default to the node's build-time constants; they may be
//! overridden from NVS, but every override goes through [`SystemConfig::validate`].

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::Deadbands;
use crate::safety::SafetyLimits;

/// Topic namespace prefix / zone id buffer.
pub type ShortString = heapless::String<32>;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Safety ---
    /// Absolute limits that override setpoint tracking.
    pub limits: SafetyLimits,

    // --- Control ---
    /// Per-variable tolerance bands around each setpoint.
    pub deadbands: Deadbands,
    /// Minimum interval between control executions (milliseconds).
    pub control_interval_ms: u32,

    // --- Alerts ---
    /// Lowest temperature the sensor can plausibly report (°C).
    pub plausible_temp_min_c: f32,
    /// Highest temperature the sensor can plausibly report (°C).
    pub plausible_temp_max_c: f32,
    /// Minimum spacing between repeated sensor alerts (seconds).
    pub alert_repeat_secs: u32,

    // --- Timing ---
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Status heartbeat interval (seconds)
    pub heartbeat_interval_secs: u32,

    // --- Namespace ---
    /// First topic level, before the device id.
    pub topic_prefix: ShortString,
    /// Zone reported until the node is provisioned into one.
    pub default_zone_id: ShortString,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            limits: SafetyLimits::default(),
            deadbands: Deadbands::default(),
            control_interval_ms: 1000, // 1 Hz

            plausible_temp_min_c: -40.0,
            plausible_temp_max_c: 85.0,
            alert_repeat_secs: 60,

            telemetry_interval_secs: 60,
            heartbeat_interval_secs: 30,

            topic_prefix: short("smartcrop"),
            default_zone_id: short("unassigned"),
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        if !(l.temp_min_c < l.temp_max_c) {
            return Err(ConfigError::ValidationFailed(
                "temp_min_c must be below temp_max_c",
            ));
        }
        if !(l.humidity_min_pct < l.humidity_max_pct) {
            return Err(ConfigError::ValidationFailed(
                "humidity_min_pct must be below humidity_max_pct",
            ));
        }
        if l.co2_max_ppm <= 0 {
            return Err(ConfigError::ValidationFailed("co2_max_ppm must be positive"));
        }

        let d = &self.deadbands;
        if !(d.temperature_c >= 0.0) || !(d.humidity_pct >= 0.0) || d.co2_ppm < 0 {
            return Err(ConfigError::ValidationFailed("deadbands must be non-negative"));
        }

        if !(100..=10_000).contains(&self.control_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_interval_ms must be 100–10000",
            ));
        }
        if !(self.plausible_temp_min_c < self.plausible_temp_max_c) {
            return Err(ConfigError::ValidationFailed(
                "plausible temperature window is inverted",
            ));
        }
        if self.telemetry_interval_secs == 0 || self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "telemetry and heartbeat intervals must be non-zero",
            ));
        }
        if self.topic_prefix.is_empty() || self.topic_prefix.contains(['/', '+', '#']) {
            return Err(ConfigError::ValidationFailed(
                "topic_prefix must be a single non-wildcard topic level",
            ));
        }
        Ok(())
    }
}

fn short(s: &str) -> ShortString {
    let mut out = ShortString::new();
    // Both call sites are literals well under capacity.
    let _ = out.push_str(s);
    out
}
