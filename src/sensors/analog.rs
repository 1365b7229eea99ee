//! Analog light and soil-moisture probes (12-bit ADC, 0 – 4095).

/// Full-scale raw ADC value.
pub const ADC_MAX: i32 = 4095;
/// Lux reported at full scale (approximate photodiode calibration).
pub const LUX_FULL_SCALE: i32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogChannel {
    Light,
    SoilMoisture,
}

/// Raw ADC access for the analog probes.
pub trait AnalogReader {
    /// `None` when the conversion failed.
    fn read_raw(&mut self, channel: AnalogChannel) -> Option<u16>;
}

/// Integer linear re-map, truncating toward zero.
fn remap(x: i32, in_max: i32, out_max: i32) -> i32 {
    x * out_max / in_max
}

pub fn raw_to_lux(raw: u16) -> i32 {
    remap(i32::from(raw), ADC_MAX, LUX_FULL_SCALE)
}

pub fn raw_to_soil_moisture(raw: u16) -> i32 {
    remap(i32::from(raw), ADC_MAX, 100).clamp(0, 100)
}
