//! Relay / MOSFET switched output (fan, humidifier, heater, pump, valve).
//!
//! A dumb actuator: it switches the pin and remembers what it asked for.
//! Pin errors are logged and swallowed, because actuator operations never
//! fail upward. The stored state in
//! [`ActuatorBank`](crate::actuators::ActuatorBank) stays authoritative.

use embedded_hal::digital::OutputPin;
use log::warn;

/// Electrical level that energises the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

pub struct RelayOutput<P> {
    pin: P,
    polarity: Polarity,
    on: bool,
}

impl<P: OutputPin> RelayOutput<P> {
    /// Wrap a pin and drive it to the de-energised level.
    pub fn new(pin: P, polarity: Polarity) -> Self {
        let mut relay = Self {
            pin,
            polarity,
            on: false,
        };
        relay.set(false);
        relay
    }

    pub fn set(&mut self, on: bool) {
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            warn!("Relay pin write failed");
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn release(self) -> P {
        self.pin
    }
}
