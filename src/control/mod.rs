//! Closed-loop climate control.
//!
//! Bang-bang actuation with a symmetric deadband per variable. See
//! [`climate::ControlLoop`] for the per-cycle policy.

pub mod climate;

pub use climate::ControlLoop;

use serde::{Deserialize, Serialize};

/// Tolerance band around each setpoint inside which no corrective
/// action is taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deadbands {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// Carried for configuration symmetry; CO2 is monitored, not regulated.
    pub co2_ppm: i32,
}

impl Default for Deadbands {
    fn default() -> Self {
        Self {
            temperature_c: 0.5,
            humidity_pct: 2.0,
            co2_ppm: 50,
        }
    }
}
