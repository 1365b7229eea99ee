//! Inbound commands to the application service.
//!
//! Messages arrive from the pub/sub link as `(topic, body)` pairs. They
//! are resolved here, once, into a closed [`AppCommand`] the
//! [`CommandDispatcher`](super::dispatcher::CommandDispatcher) applies.
//! Nothing downstream matches on strings.

use serde_json::Value;

use crate::actuators::Actuator;
use crate::error::ParseError;
use crate::setpoints::Setpoints;

/// Destination of an inbound message, by topic suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Setpoints,
    Command,
    Config,
    /// Any other topic. Dispatch ignores it.
    Unrouted,
}

impl Route {
    /// Topic suffixes the node subscribes to, in subscription order.
    pub const SUBSCRIBED: [Route; 3] = [Route::Command, Route::Setpoints, Route::Config];

    /// Route on the last topic level only; the namespace above it is not
    /// checked.
    pub fn from_topic(topic: &str) -> Self {
        if topic.ends_with("/setpoints") {
            Self::Setpoints
        } else if topic.ends_with("/command") {
            Self::Command
        } else if topic.ends_with("/config") {
            Self::Config
        } else {
            Self::Unrouted
        }
    }

    pub const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Setpoints => Some("setpoints"),
            Self::Command => Some("command"),
            Self::Config => Some("config"),
            Self::Unrouted => None,
        }
    }
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Replace the active setpoints wholesale.
    UpdateSetpoints(Setpoints),

    /// Manual override of one output. `on` is true only for action `"on"`.
    Override { actuator: Actuator, on: bool },

    /// Drive every output off.
    EmergencyStop,

    /// Configuration message. Acknowledged; the interval is not applied.
    Configure { telemetry_interval_secs: Option<i64> },

    /// A well-formed message with nothing to do (unknown `command` value
    /// or unrouted topic).
    Ignored,
}

/// Parse one inbound message.
///
/// The body must be valid JSON whatever the topic; a syntax error is the
/// only failure. Missing or wrongly typed fields fall back to their
/// defaults.
pub fn parse_message(topic: &str, body: &[u8]) -> Result<AppCommand, ParseError> {
    let doc: Value = serde_json::from_slice(body)?;

    let cmd = match Route::from_topic(topic) {
        Route::Setpoints => AppCommand::UpdateSetpoints(Setpoints::from_json(&doc)),
        Route::Command => parse_command(&doc),
        Route::Config => AppCommand::Configure {
            telemetry_interval_secs: doc.get("telemetryInterval").and_then(Value::as_i64),
        },
        Route::Unrouted => AppCommand::Ignored,
    };
    Ok(cmd)
}

fn parse_command(doc: &Value) -> AppCommand {
    let field = |key: &str| doc.get(key).and_then(Value::as_str).unwrap_or("");

    match field("command") {
        "override" => AppCommand::Override {
            actuator: Actuator::from_name(field("actuator")),
            on: field("action") == "on",
        },
        "emergency_stop" => AppCommand::EmergencyStop,
        _ => AppCommand::Ignored,
    }
}
