//! Actuator bank: the single owner of output state.
//!
//! Six physical outputs: fan, humidifier, heater, grow light, pump and
//! valve. Every component that wants an output changed goes through
//! [`ActuatorBank`]; nothing else holds authoritative actuator state or
//! touches the [`ActuatorPort`] directly.
//!
//! All setters are idempotent and infallible. An [`Actuator::Unrecognized`]
//! target is a no-op.

use core::fmt;

use log::{debug, error};

use crate::app::ports::ActuatorPort;

/// Default grow-light intensity when none is given (percent).
pub const FULL_INTENSITY: u8 = 100;

/// Output identity, resolved once when a message is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Fan,
    Humidifier,
    Heater,
    Light,
    Pump,
    Valve,
    /// A name that matched no output. Reads as off, writes are ignored.
    Unrecognized,
}

impl Actuator {
    /// Every physical output, in emergency-stop order.
    pub const OUTPUTS: [Actuator; 6] = [
        Actuator::Fan,
        Actuator::Humidifier,
        Actuator::Heater,
        Actuator::Light,
        Actuator::Pump,
        Actuator::Valve,
    ];

    /// Resolve a wire name (`"fan"`, `"humidifier"`, ...). Exact match.
    pub fn from_name(name: &str) -> Self {
        match name {
            "fan" => Self::Fan,
            "humidifier" => Self::Humidifier,
            "heater" => Self::Heater,
            "light" => Self::Light,
            "pump" => Self::Pump,
            "valve" => Self::Valve,
            _ => Self::Unrecognized,
        }
    }

    /// `false` only for [`Actuator::Unrecognized`].
    pub const fn is_output(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Humidifier => "humidifier",
            Self::Heater => "heater",
            Self::Light => "light",
            Self::Pump => "pump",
            Self::Valve => "valve",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stored output state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    pub fan: bool,
    pub humidifier: bool,
    pub heater: bool,
    pub light: bool,
    /// Last requested light intensity (0–100). Only applied while `light`.
    pub light_intensity: u8,
    pub pump: bool,
    pub valve: bool,
}

impl ActuatorState {
    pub fn get(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Fan => self.fan,
            Actuator::Humidifier => self.humidifier,
            Actuator::Heater => self.heater,
            Actuator::Light => self.light,
            Actuator::Pump => self.pump,
            Actuator::Valve => self.valve,
            Actuator::Unrecognized => false,
        }
    }

    fn slot(&mut self, actuator: Actuator) -> Option<&mut bool> {
        match actuator {
            Actuator::Fan => Some(&mut self.fan),
            Actuator::Humidifier => Some(&mut self.humidifier),
            Actuator::Heater => Some(&mut self.heater),
            Actuator::Light => Some(&mut self.light),
            Actuator::Pump => Some(&mut self.pump),
            Actuator::Valve => Some(&mut self.valve),
            Actuator::Unrecognized => None,
        }
    }

    /// Intensity actually driven onto the light, `None` while it is off.
    pub fn applied_light_intensity(&self) -> Option<u8> {
        self.light.then_some(self.light_intensity)
    }
}

/// Owns the output driver and the authoritative state of every output.
pub struct ActuatorBank<O> {
    port: O,
    state: ActuatorState,
}

impl<O: ActuatorPort> ActuatorBank<O> {
    /// Take ownership of the driver and force every output off.
    pub fn new(port: O) -> Self {
        let mut bank = Self {
            port,
            state: ActuatorState::default(),
        };
        for actuator in Actuator::OUTPUTS {
            bank.set(actuator, false);
        }
        log::info!("Actuators initialized");
        bank
    }

    /// Switch an output on or off. The light goes on at full intensity.
    pub fn set(&mut self, actuator: Actuator, on: bool) {
        match actuator {
            Actuator::Light => self.set_light(on, FULL_INTENSITY),
            Actuator::Unrecognized => debug!("set on unrecognized actuator ignored"),
            _ => {
                self.port.write(actuator, on);
                if let Some(slot) = self.state.slot(actuator) {
                    *slot = on;
                }
            }
        }
    }

    /// Switch the grow light. `intensity` (clamped to 0–100) is only
    /// driven while `on`; off is fully off, not dimmed to zero.
    pub fn set_light(&mut self, on: bool, intensity: u8) {
        let intensity = intensity.min(FULL_INTENSITY);
        if on {
            self.port.write_light(Some(intensity));
            self.state.light_intensity = intensity;
        } else {
            self.port.write_light(None);
        }
        self.state.light = on;
    }

    /// Stored state for one output. Unrecognized reads as off.
    pub fn get(&self, actuator: Actuator) -> bool {
        self.state.get(actuator)
    }

    /// Lenient lookup by wire name.
    pub fn get_by_name(&self, name: &str) -> bool {
        self.get(Actuator::from_name(name))
    }

    /// Drive all six outputs off, regardless of any pending intent.
    pub fn emergency_stop(&mut self) {
        error!("EMERGENCY STOP ACTIVATED");
        for actuator in Actuator::OUTPUTS {
            self.set(actuator, false);
        }
    }

    /// Snapshot of all outputs (for telemetry).
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    pub fn port(&self) -> &O {
        &self.port
    }
}
