//! Safety monitor.
//!
//! Evaluates every sensor snapshot against absolute hard limits and
//! produces a [`SafetyOverride`] that the control loop applies in place of
//! its deadband decision.
//!
//! ## Override rules
//!
//! | Condition                         | Directive              |
//! |-----------------------------------|------------------------|
//! | temperature outside `[min, max]`  | heater off, fan on     |
//! | CO2 above `co2_max_ppm`           | fan on                 |
//!
//! Both directives may be active in the same cycle. They only ever force
//! the fan **on** and the heater **off**, so merging is a plain union.
//! Humidity has limits in the config but no override; only the deadband
//! policy acts on it.
//!
//! An unreadable field never raises a fault: the control step for that
//! variable is skipped instead.

use core::fmt;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::sensors::SensorSnapshot;

/// Absolute environmental limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyLimits {
    pub temp_min_c: f32,
    pub temp_max_c: f32,
    pub humidity_min_pct: f32,
    pub humidity_max_pct: f32,
    pub co2_max_ppm: i32,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            temp_min_c: 5.0,
            temp_max_c: 45.0,
            humidity_min_pct: 20.0,
            humidity_max_pct: 95.0,
            co2_max_ppm: 3000,
        }
    }
}

/// Individual limit violations, accumulated in a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Readable temperature outside the safe band.
    TemperatureOutOfRange = 0b0000_0001,
    /// CO2 concentration above the ventilation ceiling.
    Co2High = 0b0000_0010,
}

impl SafetyFault {
    pub const ALL: [SafetyFault; 2] = [SafetyFault::TemperatureOutOfRange, SafetyFault::Co2High];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Operator-facing alert text.
    pub const fn message(self) -> &'static str {
        match self {
            Self::TemperatureOutOfRange => "Temperature out of safe range",
            Self::Co2High => "CO2 level too high",
        }
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemperatureOutOfRange => write!(f, "temperature out of range"),
            Self::Co2High => write!(f, "CO2 above limit"),
        }
    }
}

/// The override decision for one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyOverride {
    faults: u8,
}

impl SafetyOverride {
    /// No active override.
    pub const NONE: Self = Self { faults: 0 };

    fn with(mut self, fault: SafetyFault, active: bool) -> Self {
        if active {
            self.faults |= fault.mask();
        }
        self
    }

    /// Union of two directives.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            faults: self.faults | other.faults,
        }
    }

    pub fn has(self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    pub fn is_empty(self) -> bool {
        self.faults == 0
    }

    /// Raw fault bitmask.
    pub fn bits(self) -> u8 {
        self.faults
    }

    /// Temperature directive is active: heater off, fan on.
    pub fn temperature(self) -> bool {
        self.has(SafetyFault::TemperatureOutOfRange)
    }

    /// CO2 directive is active: fan on.
    pub fn co2(self) -> bool {
        self.has(SafetyFault::Co2High)
    }

    pub fn forces_fan_on(self) -> bool {
        self.temperature() || self.co2()
    }

    pub fn forces_heater_off(self) -> bool {
        self.temperature()
    }
}

/// Pure limit check for one snapshot.
pub fn assess(limits: &SafetyLimits, snap: &SensorSnapshot) -> SafetyOverride {
    let temperature = snap
        .temperature()
        .is_some_and(|t| t < limits.temp_min_c || t > limits.temp_max_c);
    let co2 = snap.co2().is_some_and(|c| c > limits.co2_max_ppm);

    SafetyOverride::NONE
        .with(SafetyFault::TemperatureOutOfRange, temperature)
        .with(SafetyFault::Co2High, co2)
}

/// Wraps [`assess`] and logs fault edges.
pub struct SafetyMonitor {
    limits: SafetyLimits,
    /// Faults active on the previous evaluation.
    latched: SafetyOverride,
}

impl SafetyMonitor {
    pub fn new(limits: SafetyLimits) -> Self {
        Self {
            limits,
            latched: SafetyOverride::NONE,
        }
    }

    /// Evaluate the snapshot. Returns the override for this cycle and the
    /// faults that became active since the previous call.
    pub fn evaluate(&mut self, snap: &SensorSnapshot) -> (SafetyOverride, SafetyOverride) {
        let now = assess(&self.limits, snap);
        let raised = SafetyOverride {
            faults: now.faults & !self.latched.faults,
        };
        let cleared = self.latched.faults & !now.faults;

        for fault in SafetyFault::ALL {
            if raised.has(fault) {
                error!("SAFETY OVERRIDE SET: {fault}");
            } else if cleared & fault.mask() != 0 {
                info!("SAFETY OVERRIDE CLEARED: {fault}");
            }
        }

        self.latched = now;
        (now, raised)
    }

    /// Override computed by the most recent evaluation.
    pub fn current(&self) -> SafetyOverride {
        self.latched
    }

    pub fn limits(&self) -> &SafetyLimits {
        &self.limits
    }
}
