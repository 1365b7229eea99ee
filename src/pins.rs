//! GPIO / peripheral pin assignments for the GrowZone node board (ESP32).
//!
//! Single source of truth. `main` claims the matching typed pins from
//! `esp-idf-hal`; keep the two in step when the board changes.

// ---------------------------------------------------------------------------
// I²C bus (SHT31 temperature / humidity)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Standard-mode bus clock.
pub const I2C_BAUD_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// MH-Z19 CO2 sensor (UART2, 9600 8N1)
// ---------------------------------------------------------------------------

pub const CO2_UART_RX_GPIO: i32 = 16;
pub const CO2_UART_TX_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Analog probes (ADC1, 11 dB attenuation)
// ---------------------------------------------------------------------------

pub const SOIL_MOISTURE_ADC_GPIO: i32 = 34;
pub const LIGHT_SENSOR_ADC_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH)
// ---------------------------------------------------------------------------

pub const FAN_GPIO: i32 = 25;
pub const HUMIDIFIER_GPIO: i32 = 26;
pub const HEATER_GPIO: i32 = 27;
pub const PUMP_GPIO: i32 = 33;
pub const VALVE_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Grow light (LEDC PWM)
// ---------------------------------------------------------------------------

pub const GROW_LIGHT_GPIO: i32 = 32;
/// LEDC timer resolution (bits). 8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC frequency for the grow-light driver.
pub const GROW_LIGHT_PWM_FREQ_HZ: u32 = 5_000;

/// Every claimed GPIO, for the boot banner.
pub const ALL: [(&str, i32); 12] = [
    ("sda", I2C_SDA_GPIO),
    ("scl", I2C_SCL_GPIO),
    ("co2_rx", CO2_UART_RX_GPIO),
    ("co2_tx", CO2_UART_TX_GPIO),
    ("soil", SOIL_MOISTURE_ADC_GPIO),
    ("light_sensor", LIGHT_SENSOR_ADC_GPIO),
    ("fan", FAN_GPIO),
    ("humidifier", HUMIDIFIER_GPIO),
    ("heater", HEATER_GPIO),
    ("pump", PUMP_GPIO),
    ("valve", VALVE_GPIO),
    ("grow_light", GROW_LIGHT_GPIO),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pin_is_claimed_twice() {
        let mut all: Vec<i32> = ALL.iter().map(|(_, p)| *p).collect();
        let n = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), n);
    }

    #[test]
    fn adc_pins_are_input_only_bank() {
        // GPIO 34..=39 have no output driver on the ESP32.
        for p in [SOIL_MOISTURE_ADC_GPIO, LIGHT_SENSOR_ADC_GPIO] {
            assert!((34..=39).contains(&p));
        }
        for (_, p) in &ALL[6..] {
            assert!(*p < 34);
        }
    }
}
