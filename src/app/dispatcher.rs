//! Applies parsed commands to the setpoint store and actuator bank.

use log::{debug, info, warn};

use crate::actuators::{Actuator, ActuatorBank};
use crate::error::ParseError;
use crate::setpoints::SetpointStore;

use super::commands::{AppCommand, parse_message};
use super::ports::ActuatorPort;

/// Single entry point for inbound messages.
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    /// Last `telemetryInterval` seen on the config topic. Recorded only.
    requested_telemetry_interval: Option<i64>,
    applied: u32,
    malformed: u32,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and apply one message. A malformed body mutates nothing and
    /// is returned as the error after being logged.
    pub fn dispatch<O: ActuatorPort>(
        &mut self,
        topic: &str,
        body: &[u8],
        store: &mut SetpointStore,
        bank: &mut ActuatorBank<O>,
    ) -> Result<AppCommand, ParseError> {
        let cmd = parse_message(topic, body).inspect_err(|e| {
            self.malformed = self.malformed.saturating_add(1);
            warn!("JSON parsing failed on {topic}: {e}");
        })?;
        self.apply(cmd, store, bank);
        Ok(cmd)
    }

    pub fn apply<O: ActuatorPort>(
        &mut self,
        cmd: AppCommand,
        store: &mut SetpointStore,
        bank: &mut ActuatorBank<O>,
    ) {
        match cmd {
            AppCommand::UpdateSetpoints(setpoints) => store.replace(setpoints),
            AppCommand::Override {
                actuator: Actuator::Unrecognized,
                ..
            } => debug!("Override for unknown actuator ignored"),
            AppCommand::Override { actuator, on } => {
                bank.set(actuator, on);
                info!("Manual override: {actuator} -> {}", if on { "on" } else { "off" });
            }
            AppCommand::EmergencyStop => bank.emergency_stop(),
            AppCommand::Configure {
                telemetry_interval_secs,
            } => {
                if telemetry_interval_secs.is_some() {
                    self.requested_telemetry_interval = telemetry_interval_secs;
                }
                info!("Configuration updated");
            }
            AppCommand::Ignored => {
                debug!("Message ignored");
                return;
            }
        }
        self.applied = self.applied.saturating_add(1);
    }

    pub fn requested_telemetry_interval(&self) -> Option<i64> {
        self.requested_telemetry_interval
    }

    /// Messages that resulted in an action (including acknowledged config).
    pub fn applied_count(&self) -> u32 {
        self.applied
    }

    pub fn malformed_count(&self) -> u32 {
        self.malformed
    }
}
