//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces one [`SensorSnapshot`]
//! per control cycle. Each field carries its own "unreadable" sentinel
//! because the sensors fail independently; the snapshot-wide `valid` flag
//! is a separate gate.

pub mod analog;
pub mod co2;
pub mod sht31;

use embedded_hal::i2c::I2c;
use log::warn;

use analog::{AnalogChannel, AnalogReader};
use co2::Co2Reader;
use sht31::Sht31;

// ---------------------------------------------------------------------------
// Sensor snapshot
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every sensor on the node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    /// Air temperature (°C). [`Self::UNREADABLE`] when the sensor failed.
    pub temperature_c: f32,
    /// Relative humidity (%RH). [`Self::UNREADABLE`] when the sensor failed.
    pub humidity_pct: f32,
    /// CO2 concentration (ppm). Negative when unreadable.
    pub co2_ppm: i32,
    /// Ambient light (lux, approximate).
    pub light_lux: i32,
    /// Soil moisture (0–100 %).
    pub soil_moisture_pct: i32,
    /// Whole-snapshot validity, independent of the field sentinels.
    pub valid: bool,
}

impl SensorSnapshot {
    /// Sentinel written into a float field whose sensor could not be read.
    pub const UNREADABLE: f32 = -999.0;
    /// Sentinel written into an integer field whose sensor could not be read.
    pub const UNREADABLE_INT: i32 = -1;

    /// Temperature, or `None` when the reading is below −100 °C or NaN.
    pub fn temperature(&self) -> Option<f32> {
        (self.temperature_c >= -100.0).then_some(self.temperature_c)
    }

    /// Humidity, or `None` when the reading is negative or NaN.
    pub fn humidity(&self) -> Option<f32> {
        (self.humidity_pct >= 0.0).then_some(self.humidity_pct)
    }

    /// CO2, or `None` when the reading is negative.
    pub fn co2(&self) -> Option<i32> {
        (self.co2_ppm >= 0).then_some(self.co2_ppm)
    }
}

impl Default for SensorSnapshot {
    /// Every field unreadable and the snapshot marked invalid.
    fn default() -> Self {
        Self {
            temperature_c: Self::UNREADABLE,
            humidity_pct: Self::UNREADABLE,
            co2_ppm: Self::UNREADABLE_INT,
            light_lux: 0,
            soil_moisture_pct: 0,
            valid: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor hub
// ---------------------------------------------------------------------------

/// Aggregates all sensor drivers and produces a unified snapshot.
pub struct SensorHub<I, A, C> {
    /// `None` when the SHT31 did not answer at boot.
    sht31: Option<Sht31<I>>,
    analog: A,
    co2: C,
}

impl<I: I2c, A: AnalogReader, C: Co2Reader> SensorHub<I, A, C> {
    /// Construct a new hub. Probes the SHT31 once; if it is absent the hub
    /// keeps running and reports temperature/humidity as unreadable.
    pub fn new(i2c: I, analog: A, co2: C) -> Self {
        let sht31 = match Sht31::probe(i2c) {
            Ok(sensor) => {
                log::info!("SHT31 sensor found");
                Some(sensor)
            }
            Err(e) => {
                warn!("SHT31 sensor not found ({e})");
                None
            }
        };
        Self { sht31, analog, co2 }
    }

    /// Read every sensor and return a unified snapshot.
    ///
    /// Individual read failures only poison their own field; a single
    /// flaky sensor must not stall the control loop.
    pub fn read_snapshot(&mut self) -> SensorSnapshot {
        let (temperature_c, humidity_pct) = match self.sht31.as_mut().map(Sht31::measure) {
            Some(Ok(m)) => (m.temperature_c, m.humidity_pct),
            Some(Err(e)) => {
                warn!("Failed to read temperature/humidity: {e}");
                (SensorSnapshot::UNREADABLE, SensorSnapshot::UNREADABLE)
            }
            None => (SensorSnapshot::UNREADABLE, SensorSnapshot::UNREADABLE),
        };

        let light_lux = self
            .analog
            .read_raw(AnalogChannel::Light)
            .map_or(0, analog::raw_to_lux);
        let soil_moisture_pct = self
            .analog
            .read_raw(AnalogChannel::SoilMoisture)
            .map_or(0, analog::raw_to_soil_moisture);

        let co2_ppm = self.co2.read_ppm().unwrap_or(SensorSnapshot::UNREADABLE_INT);

        SensorSnapshot {
            temperature_c,
            humidity_pct,
            co2_ppm,
            light_lux,
            soil_moisture_pct,
            valid: true,
        }
    }

    pub fn has_climate_sensor(&self) -> bool {
        self.sht31.is_some()
    }
}
