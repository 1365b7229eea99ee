//! Sensirion SHT31 temperature / humidity sensor (I²C).
//!
//! Single-shot, high-repeatability measurement with clock stretching
//! (command `0x2C06`), so the read can follow the write immediately.
//! Each 16-bit word is followed by a CRC-8 (poly `0x31`, init `0xFF`).

use core::fmt;

use embedded_hal::i2c::I2c;

/// Default address (ADDR pin low).
pub const DEFAULT_ADDRESS: u8 = 0x44;

const CMD_MEASURE_HIGH_STRETCH: [u8; 2] = [0x2C, 0x06];
const CMD_READ_STATUS: [u8; 2] = [0xF3, 0x2D];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sht31Error {
    /// The bus transaction failed (NACK, arbitration loss, ...).
    Bus,
    /// A data word failed its CRC.
    Crc,
}

impl fmt::Display for Sht31Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::Crc => write!(f, "CRC mismatch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct Sht31<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Sht31<I> {
    /// Read the status register once to confirm the sensor answers.
    pub fn probe(i2c: I) -> Result<Self, Sht31Error> {
        let mut sensor = Self {
            i2c,
            address: DEFAULT_ADDRESS,
        };
        let mut status = [0u8; 3];
        sensor
            .i2c
            .write_read(sensor.address, &CMD_READ_STATUS, &mut status)
            .map_err(|_| Sht31Error::Bus)?;
        check_word(&status[0..3])?;
        Ok(sensor)
    }

    pub fn measure(&mut self) -> Result<Measurement, Sht31Error> {
        let mut buf = [0u8; 6];
        self.i2c
            .write(self.address, &CMD_MEASURE_HIGH_STRETCH)
            .map_err(|_| Sht31Error::Bus)?;
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|_| Sht31Error::Bus)?;

        let raw_t = check_word(&buf[0..3])?;
        let raw_rh = check_word(&buf[3..6])?;
        Ok(Measurement {
            temperature_c: raw_to_celsius(raw_t),
            humidity_pct: raw_to_humidity(raw_rh),
        })
    }

    /// Release the bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

/// Verify a `[msb, lsb, crc]` triple and return the word.
fn check_word(chunk: &[u8]) -> Result<u16, Sht31Error> {
    if crc8(&chunk[0..2]) != chunk[2] {
        return Err(Sht31Error::Crc);
    }
    Ok(u16::from_be_bytes([chunk[0], chunk[1]]))
}

pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

pub fn raw_to_celsius(raw: u16) -> f32 {
    -45.0 + 175.0 * f32::from(raw) / 65535.0
}

pub fn raw_to_humidity(raw: u16) -> f32 {
    100.0 * f32::from(raw) / 65535.0
}
