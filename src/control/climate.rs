//! Rate-limited climate controller.
//!
//! One cycle evaluates, in order: temperature, humidity, CO2, light.
//! Each step may write the shared fan and the last write wins, so the
//! order is load-bearing.
//!
//! ```text
//!  temperature  unreadable → skip
//!               safety     → heater off, fan on
//!               e > +db    → heater on,  fan off
//!               e < −db    → heater off, fan on
//!               otherwise  → fan off            (heater untouched)
//!  humidity     unreadable → skip
//!               e > +db    → humidifier on
//!               e < −db    → humidifier off, fan on
//!               otherwise  → humidifier off     (fan untouched)
//!  co2          above max  → fan on
//!  light        on at setpoint intensity, every cycle
//! ```
//!
//! `e = target − reading`.

use log::{debug, warn};

use crate::actuators::{Actuator, ActuatorBank};
use crate::app::ports::ActuatorPort;
use crate::safety::SafetyOverride;
use crate::sensors::SensorSnapshot;
use crate::setpoints::{SetpointStore, Setpoints};

use super::Deadbands;

/// Bang-bang controller with a minimum spacing between executions.
pub struct ControlLoop {
    deadbands: Deadbands,
    interval_ms: u64,
    /// Time of the last cycle that actually ran. `None` before the first.
    last_run_ms: Option<u64>,
}

impl ControlLoop {
    pub fn new(deadbands: Deadbands, interval_ms: u32) -> Self {
        Self {
            deadbands,
            interval_ms: u64::from(interval_ms),
            last_run_ms: None,
        }
    }

    /// Run one control cycle if allowed. Returns `true` when actuators
    /// were driven.
    ///
    /// Does nothing while the setpoints or the snapshot are invalid, or
    /// when called sooner than the interval after the last run. A skipped
    /// call never moves the timer.
    pub fn execute<O: ActuatorPort>(
        &mut self,
        now_ms: u64,
        snap: &SensorSnapshot,
        store: &SetpointStore,
        safety: SafetyOverride,
        bank: &mut ActuatorBank<O>,
    ) -> bool {
        let Some(setpoints) = store.active() else {
            return false;
        };
        if !snap.valid {
            return false;
        }
        if let Some(last) = self.last_run_ms {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return false;
            }
        }
        self.last_run_ms = Some(now_ms);

        self.control_temperature(snap, &setpoints, safety, bank);
        self.control_humidity(snap, &setpoints, bank);
        Self::control_co2(snap, safety, bank);
        bank.set_light(true, setpoints.light_intensity);
        true
    }

    pub fn last_run_ms(&self) -> Option<u64> {
        self.last_run_ms
    }

    pub fn deadbands(&self) -> &Deadbands {
        &self.deadbands
    }

    fn control_temperature<O: ActuatorPort>(
        &self,
        snap: &SensorSnapshot,
        setpoints: &Setpoints,
        safety: SafetyOverride,
        bank: &mut ActuatorBank<O>,
    ) {
        let Some(current) = snap.temperature() else {
            debug!("temperature unreadable, skipping");
            return;
        };

        if safety.forces_heater_off() {
            bank.set(Actuator::Heater, false);
            bank.set(Actuator::Fan, true);
            return;
        }

        let error = setpoints.temperature_c - current;
        let db = self.deadbands.temperature_c;
        if error > db {
            bank.set(Actuator::Heater, true);
            bank.set(Actuator::Fan, false);
        } else if error < -db {
            bank.set(Actuator::Heater, false);
            bank.set(Actuator::Fan, true);
        } else {
            bank.set(Actuator::Fan, false);
        }
    }

    fn control_humidity<O: ActuatorPort>(
        &self,
        snap: &SensorSnapshot,
        setpoints: &Setpoints,
        bank: &mut ActuatorBank<O>,
    ) {
        let Some(current) = snap.humidity() else {
            return;
        };

        let error = setpoints.humidity_pct - current;
        let db = self.deadbands.humidity_pct;
        if error > db {
            bank.set(Actuator::Humidifier, true);
        } else if error < -db {
            bank.set(Actuator::Humidifier, false);
            bank.set(Actuator::Fan, true);
        } else {
            bank.set(Actuator::Humidifier, false);
        }
    }

    fn control_co2<O: ActuatorPort>(
        snap: &SensorSnapshot,
        safety: SafetyOverride,
        bank: &mut ActuatorBank<O>,
    ) {
        if snap.co2().is_none() {
            return;
        }
        if safety.co2() {
            warn!("CO2 too high ({} ppm), ventilating", snap.co2_ppm);
            bank.set(Actuator::Fan, true);
        }
    }
}
