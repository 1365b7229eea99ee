//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! [`OutputBoard`] owns the five relay outputs and the grow-light PWM
//! channel and implements [`ActuatorPort`]. The [`SensorHub`] is exposed
//! through [`SensorPort`]. This is the only layer that touches pins; on
//! the host the same code runs against mock `embedded-hal` pins.

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, info};

use crate::actuators::Actuator;
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::{GrowLight, RelayOutput};
use crate::sensors::analog::AnalogReader;
use crate::sensors::co2::Co2Reader;
use crate::sensors::{SensorHub, SensorSnapshot};

/// The node's switched outputs, in the order the board wires them.
pub struct OutputBoard<P, L> {
    fan: RelayOutput<P>,
    humidifier: RelayOutput<P>,
    heater: RelayOutput<P>,
    pump: RelayOutput<P>,
    valve: RelayOutput<P>,
    light: GrowLight<L>,
}

/// Relay outputs handed to [`OutputBoard::new`].
pub struct Relays<P> {
    pub fan: RelayOutput<P>,
    pub humidifier: RelayOutput<P>,
    pub heater: RelayOutput<P>,
    pub pump: RelayOutput<P>,
    pub valve: RelayOutput<P>,
}

impl<P: OutputPin, L: SetDutyCycle> OutputBoard<P, L> {
    pub fn new(relays: Relays<P>, light: GrowLight<L>) -> Self {
        info!("Output board ready");
        Self {
            fan: relays.fan,
            humidifier: relays.humidifier,
            heater: relays.heater,
            pump: relays.pump,
            valve: relays.valve,
            light,
        }
    }

    fn relay(&mut self, actuator: Actuator) -> Option<&mut RelayOutput<P>> {
        match actuator {
            Actuator::Fan => Some(&mut self.fan),
            Actuator::Humidifier => Some(&mut self.humidifier),
            Actuator::Heater => Some(&mut self.heater),
            Actuator::Pump => Some(&mut self.pump),
            Actuator::Valve => Some(&mut self.valve),
            Actuator::Light | Actuator::Unrecognized => None,
        }
    }

    /// Level each relay was last driven to (for diagnostics).
    pub fn relay_on(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Fan => self.fan.is_on(),
            Actuator::Humidifier => self.humidifier.is_on(),
            Actuator::Heater => self.heater.is_on(),
            Actuator::Pump => self.pump.is_on(),
            Actuator::Valve => self.valve.is_on(),
            Actuator::Light => self.light.intensity().is_some(),
            Actuator::Unrecognized => false,
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: OutputPin, L: SetDutyCycle> ActuatorPort for OutputBoard<P, L> {
    fn write(&mut self, actuator: Actuator, on: bool) {
        match self.relay(actuator) {
            Some(relay) => relay.set(on),
            None => debug!("no relay for {actuator}"),
        }
    }

    fn write_light(&mut self, intensity: Option<u8>) {
        self.light.apply(intensity);
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I: I2c, A: AnalogReader, C: Co2Reader> SensorPort for SensorHub<I, A, C> {
    fn read_all(&mut self) -> SensorSnapshot {
        self.read_snapshot()
    }
}

// ── ESP-IDF analog probes ─────────────────────────────────────

#[cfg(feature = "espidf")]
pub use esp::EspAnalog;

#[cfg(feature = "espidf")]
mod esp {
    use esp_idf_svc::hal::adc::attenuation::DB_11;
    use esp_idf_svc::hal::adc::oneshot::config::AdcChannelConfig;
    use esp_idf_svc::hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
    use esp_idf_svc::hal::adc::ADC1;
    use esp_idf_svc::hal::gpio::{Gpio34, Gpio35};
    use esp_idf_svc::sys::EspError;
    use log::warn;

    use crate::sensors::analog::{AnalogChannel, AnalogReader};

    type Adc = &'static AdcDriver<'static, ADC1>;

    /// Light and soil probes on ADC1 (one-shot mode).
    pub struct EspAnalog {
        adc: Adc,
        soil: AdcChannelDriver<'static, Gpio34, Adc>,
        light: AdcChannelDriver<'static, Gpio35, Adc>,
    }

    impl EspAnalog {
        /// The ADC unit lives for the whole program.
        pub fn new(adc: Adc, soil: Gpio34, light: Gpio35) -> Result<Self, EspError> {
            let config = AdcChannelConfig {
                attenuation: DB_11,
                ..Default::default()
            };
            Ok(Self {
                adc,
                soil: AdcChannelDriver::new(adc, soil, &config)?,
                light: AdcChannelDriver::new(adc, light, &config)?,
            })
        }
    }

    impl AnalogReader for EspAnalog {
        fn read_raw(&mut self, channel: AnalogChannel) -> Option<u16> {
            let result = match channel {
                AnalogChannel::SoilMoisture => self.adc.read_raw(&mut self.soil),
                AnalogChannel::Light => self.adc.read_raw(&mut self.light),
            };
            result
                .map_err(|e| warn!("ADC read {:?} failed: {e}", channel))
                .ok()
        }
    }
}
