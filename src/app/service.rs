//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the actuator bank, the setpoint store, the safety
//! monitor, the control loop and the command dispatcher. It exposes a
//! clean, hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  CommandInbox ──▶ ┌──────────────────────────────┐
//!                   │          AppService          │ ──▶ EventSink
//!    SensorPort ──▶ │ Dispatcher · Safety · Control│
//!                   └──────────────┬───────────────┘
//!                                  ▼
//!                     ActuatorBank ──▶ ActuatorPort
//! ```
//!
//! Everything runs on the caller's thread. Inbound messages are applied
//! in [`drain_inbox`](AppService::drain_inbox) before
//! [`tick`](AppService::tick) is called, so a cycle never sees a
//! half-applied command.

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{info, warn};

use crate::actuators::{ActuatorBank, ActuatorState};
use crate::config::SystemConfig;
use crate::control::ControlLoop;
use crate::error::ParseError;
use crate::identity::DeviceIdentity;
use crate::safety::{SafetyFault, SafetyMonitor, SafetyOverride};
use crate::sensors::SensorSnapshot;
use crate::setpoints::SetpointStore;
use crate::telemetry::{AlertDoc, AlertLevel, FIRMWARE_VERSION, StatusDoc, TelemetryDoc};

use super::commands::AppCommand;
use super::dispatcher::CommandDispatcher;
use super::events::AppEvent;
use super::inbox::CommandInbox;
use super::ports::{ActuatorPort, EventSink, PlatformPort, SensorPort};

/// Alert text when the temperature reading is physically implausible.
pub const SENSOR_ALERT_MESSAGE: &str = "Temperature sensor error";

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<O: ActuatorPort> {
    config: SystemConfig,
    identity: DeviceIdentity,
    bank: ActuatorBank<O>,
    store: SetpointStore,
    monitor: SafetyMonitor,
    control: ControlLoop,
    dispatcher: CommandDispatcher,
    /// Snapshot consumed by the most recent tick.
    snapshot: SensorSnapshot,
    tick_count: u64,
    last_telemetry_ms: u64,
    last_heartbeat_ms: u64,
    /// When the sensor alert last fired; `None` while the reading is plausible.
    last_sensor_alert_ms: Option<u64>,
}

impl<O: ActuatorPort> AppService<O> {
    /// Construct the service. Takes ownership of the output driver and
    /// forces every output off.
    pub fn new(config: SystemConfig, identity: DeviceIdentity, outputs: O) -> Self {
        let monitor = SafetyMonitor::new(config.limits);
        let control = ControlLoop::new(config.deadbands, config.control_interval_ms);
        Self {
            identity,
            bank: ActuatorBank::new(outputs),
            store: SetpointStore::new(),
            monitor,
            control,
            dispatcher: CommandDispatcher::new(),
            snapshot: SensorSnapshot::default(),
            tick_count: 0,
            last_telemetry_ms: 0,
            last_heartbeat_ms: 0,
            last_sensor_alert_ms: None,
            config,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Parse and apply one inbound message.
    ///
    /// A malformed body is reported through the sink and returned; it
    /// changes nothing.
    pub fn handle_message(
        &mut self,
        topic: &str,
        body: &[u8],
        sink: &mut impl EventSink,
    ) -> Result<AppCommand, ParseError> {
        match self
            .dispatcher
            .dispatch(topic, body, &mut self.store, &mut self.bank)
        {
            Ok(cmd) => {
                Self::announce(cmd, sink);
                Ok(cmd)
            }
            Err(e) => {
                sink.emit(&AppEvent::MessageRejected(e));
                Err(e)
            }
        }
    }

    /// Apply every queued message in arrival order. Returns how many were
    /// taken off the queue (malformed ones included).
    pub fn drain_inbox<M: RawMutex>(
        &mut self,
        inbox: &CommandInbox<M>,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut n = 0;
        while let Some(msg) = inbox.take() {
            // Errors are already reported through the sink.
            let _ = self.handle_message(&msg.topic, &msg.payload, sink);
            n += 1;
        }
        n
    }

    fn announce(cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::UpdateSetpoints(sp) => sink.emit(&AppEvent::SetpointsUpdated(sp)),
            AppCommand::Override { actuator, on } if actuator.is_output() => {
                sink.emit(&AppEvent::ManualOverride { actuator, on });
            }
            AppCommand::EmergencyStop => sink.emit(&AppEvent::EmergencyStop),
            _ => {}
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cycle: read sensors → safety → control → actuators.
    ///
    /// Returns `true` when the control loop actually drove the outputs
    /// (it is a no-op before the first setpoints message, on an invalid
    /// snapshot, or inside the rate-limit interval).
    pub fn tick(
        &mut self,
        now_ms: u64,
        sensors: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        self.tick_count += 1;

        // 1. Read sensors via SensorPort
        let snapshot = sensors.read_all();
        self.snapshot = snapshot;

        // 2. Safety evaluation; alert on newly raised faults only
        let (safety, raised) = self.monitor.evaluate(&snapshot);
        for fault in SafetyFault::ALL {
            if raised.has(fault) {
                self.alert(AlertLevel::Critical, fault.message(), now_ms, sink);
            }
        }

        // 3. Sensor plausibility
        self.check_plausibility(now_ms, sink);

        // 4. Control decision, applied through the bank
        self.control
            .execute(now_ms, &snapshot, &self.store, safety, &mut self.bank)
    }

    fn check_plausibility(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        let t = self.snapshot.temperature_c;
        let plausible =
            t >= self.config.plausible_temp_min_c && t <= self.config.plausible_temp_max_c;
        if plausible {
            self.last_sensor_alert_ms = None;
            return;
        }

        let repeat_ms = u64::from(self.config.alert_repeat_secs) * 1000;
        let due = self
            .last_sensor_alert_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= repeat_ms);
        if due {
            self.last_sensor_alert_ms = Some(now_ms);
            self.alert(AlertLevel::Warning, SENSOR_ALERT_MESSAGE, now_ms, sink);
        }
    }

    fn alert(
        &self,
        level: AlertLevel,
        message: &'static str,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) {
        warn!("Alert ({level:?}): {message}");
        sink.emit(&AppEvent::Alert(AlertDoc::new(
            &self.identity,
            level,
            message,
            now_ms,
        )));
    }

    // ── Reporting ─────────────────────────────────────────────

    /// Emit telemetry and heartbeat status when their intervals elapse.
    pub fn poll_schedules(
        &mut self,
        now_ms: u64,
        platform: &impl PlatformPort,
        sink: &mut impl EventSink,
    ) {
        let telemetry_ms = u64::from(self.config.telemetry_interval_secs) * 1000;
        if now_ms.saturating_sub(self.last_telemetry_ms) >= telemetry_ms {
            self.last_telemetry_ms = now_ms;
            sink.emit(&AppEvent::Telemetry(self.telemetry(now_ms)));
        }

        let heartbeat_ms = u64::from(self.config.heartbeat_interval_secs) * 1000;
        if now_ms.saturating_sub(self.last_heartbeat_ms) >= heartbeat_ms {
            self.last_heartbeat_ms = now_ms;
            sink.emit(&AppEvent::Status(self.status(StatusDoc::RUNNING, platform)));
        }
    }

    /// Announce the node after the link (re)connects.
    pub fn link_up(&self, platform: &impl PlatformPort, sink: &mut impl EventSink) {
        info!("Link up, announcing node");
        sink.emit(&AppEvent::Status(self.status(StatusDoc::ONLINE, platform)));
    }

    /// Telemetry document for the latest snapshot and output state.
    pub fn telemetry(&self, now_ms: u64) -> TelemetryDoc {
        TelemetryDoc::new(&self.identity, now_ms, &self.snapshot, self.bank.state())
    }

    pub fn status(&self, status: &'static str, platform: &impl PlatformPort) -> StatusDoc {
        StatusDoc {
            status,
            device_id: self.identity.device_id.clone(),
            zone_id: self.identity.zone_id.clone(),
            firmware_version: FIRMWARE_VERSION,
            uptime_secs: platform.uptime_ms() / 1000,
            free_heap_bytes: platform.free_heap_bytes(),
            rssi_dbm: platform.rssi_dbm().unwrap_or(0),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Authoritative output state.
    pub fn actuators(&self) -> ActuatorState {
        self.bank.state()
    }

    pub fn bank(&self) -> &ActuatorBank<O> {
        &self.bank
    }

    /// Snapshot consumed by the most recent tick.
    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    pub fn setpoints(&self) -> &SetpointStore {
        &self.store
    }

    /// Override decided on the most recent tick.
    pub fn safety(&self) -> SafetyOverride {
        self.monitor.current()
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time of the last control cycle that actually ran.
    pub fn last_control_ms(&self) -> Option<u64> {
        self.control.last_run_ms()
    }
}
