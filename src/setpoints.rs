//! Operator setpoints and the store that holds the active set.
//!
//! Every setpoints message replaces the whole set. Fields the message
//! omits (or sends with the wrong JSON type) take the fixed defaults
//! below; there is no field-by-field merge with the previous values.

use log::info;
use serde_json::Value;

/// Target values for each controlled variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoints {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub co2_ppm: i32,
    /// Photoperiod length. Stored and reported, not yet used for gating.
    pub light_hours: i32,
    /// Grow-light intensity, 0–100.
    pub light_intensity: u8,
}

impl Setpoints {
    pub const DEFAULT_TEMPERATURE_C: f32 = 25.0;
    pub const DEFAULT_HUMIDITY_PCT: f32 = 70.0;
    pub const DEFAULT_CO2_PPM: i32 = 800;
    pub const DEFAULT_LIGHT_HOURS: i32 = 12;
    pub const DEFAULT_LIGHT_INTENSITY: u8 = 100;

    /// Extract a full set from a setpoints body.
    ///
    /// A non-object body yields all defaults. `lightIntensity` is clamped
    /// to 0–100.
    pub fn from_json(body: &Value) -> Self {
        let number = |key: &str, default: f32| {
            body.get(key)
                .and_then(Value::as_f64)
                .map_or(default, |v| v as f32)
        };
        let integer = |key: &str, default: i64| {
            body.get(key).and_then(Value::as_i64).unwrap_or(default)
        };

        let intensity = integer("lightIntensity", i64::from(Self::DEFAULT_LIGHT_INTENSITY));

        Self {
            temperature_c: number("temperature", Self::DEFAULT_TEMPERATURE_C),
            humidity_pct: number("humidity", Self::DEFAULT_HUMIDITY_PCT),
            co2_ppm: saturate(integer("co2", i64::from(Self::DEFAULT_CO2_PPM))),
            light_hours: saturate(integer("lightHours", i64::from(Self::DEFAULT_LIGHT_HOURS))),
            light_intensity: intensity.clamp(0, 100) as u8,
        }
    }
}

impl Default for Setpoints {
    fn default() -> Self {
        Self {
            temperature_c: Self::DEFAULT_TEMPERATURE_C,
            humidity_pct: Self::DEFAULT_HUMIDITY_PCT,
            co2_ppm: Self::DEFAULT_CO2_PPM,
            light_hours: Self::DEFAULT_LIGHT_HOURS,
            light_intensity: Self::DEFAULT_LIGHT_INTENSITY,
        }
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Sole holder of the active setpoints.
///
/// Starts with defaults marked invalid; the control loop does nothing
/// until the first [`replace`](Self::replace).
#[derive(Debug, Clone, Default)]
pub struct SetpointStore {
    current: Setpoints,
    valid: bool,
}

impl SetpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every field and mark the store valid.
    pub fn replace(&mut self, setpoints: Setpoints) {
        self.current = setpoints;
        self.valid = true;
        info!(
            "Setpoints updated: T={:.1}\u{00b0}C RH={:.1}% CO2={}ppm",
            setpoints.temperature_c, setpoints.humidity_pct, setpoints.co2_ppm
        );
    }

    pub fn current(&self) -> Setpoints {
        self.current
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The setpoints, only once a valid update has been received.
    pub fn active(&self) -> Option<Setpoints> {
        self.valid.then_some(self.current)
    }
}
