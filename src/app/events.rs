//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, publish over MQTT.

use crate::actuators::Actuator;
use crate::error::ParseError;
use crate::setpoints::Setpoints;
use crate::telemetry::{AlertDoc, StatusDoc, TelemetryDoc};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Liveness document (`online` on connect, `running` per heartbeat).
    Status(StatusDoc),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryDoc),

    /// Sensor plausibility or safety alert.
    Alert(AlertDoc),

    /// A setpoints message replaced the active set.
    SetpointsUpdated(Setpoints),

    /// An operator switched one output by hand.
    ManualOverride { actuator: Actuator, on: bool },

    /// Every output was driven off by operator command.
    EmergencyStop,

    /// An inbound body failed to parse and was dropped.
    MessageRejected(ParseError),
}
