//! CO2 sources: MH-Z19 NDIR frame codec and a fixed placeholder.
//!
//! MH-Z19 protocol (UART 9600 8N1, 9-byte frames):
//!
//! ```text
//! request:  FF 01 86 00 00 00 00 00 79
//! response: FF 86 HH LL xx xx xx xx CS     ppm = HH·256 + LL
//! CS = 0xFF − (sum of bytes 1..=7) + 1
//! ```

/// Length of every MH-Z19 frame.
pub const FRAME_LEN: usize = 9;

/// "Read gas concentration" request.
pub const READ_REQUEST: [u8; FRAME_LEN] = [0xFF, 0x01, 0x86, 0x00, 0x00, 0x00, 0x00, 0x00, 0x79];

/// Concentration reported when no CO2 sensor is fitted.
pub const PLACEHOLDER_PPM: i32 = 800;

/// A source of CO2 readings.
pub trait Co2Reader {
    /// `None` when the sensor could not be read.
    fn read_ppm(&mut self) -> Option<i32>;
}

/// Reports a constant concentration. Used while the board has no NDIR
/// sensor fitted so CO2 control stays inert.
pub struct FixedCo2(pub i32);

impl Default for FixedCo2 {
    fn default() -> Self {
        Self(PLACEHOLDER_PPM)
    }
}

impl Co2Reader for FixedCo2 {
    fn read_ppm(&mut self) -> Option<i32> {
        Some(self.0)
    }
}

pub fn checksum(frame: &[u8; FRAME_LEN]) -> u8 {
    let sum = frame[1..8].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    0xFFu8.wrapping_sub(sum).wrapping_add(1)
}

/// Decode a read-concentration response. `None` on a bad header or checksum.
pub fn decode_response(frame: &[u8]) -> Option<i32> {
    let frame: &[u8; FRAME_LEN] = frame.try_into().ok()?;
    if frame[0] != 0xFF || frame[1] != 0x86 {
        return None;
    }
    if checksum(frame) != frame[8] {
        return None;
    }
    Some(i32::from(frame[2]) * 256 + i32::from(frame[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(ppm: u16) -> [u8; FRAME_LEN] {
        let [hi, lo] = ppm.to_be_bytes();
        let mut f = [0xFF, 0x86, hi, lo, 0x47, 0x00, 0x00, 0x00, 0x00];
        f[8] = checksum(&f);
        f
    }

    #[test]
    fn request_checksum_is_consistent() {
        assert_eq!(checksum(&READ_REQUEST), READ_REQUEST[8]);
    }

    #[test]
    fn decodes_valid_frame() {
        assert_eq!(decode_response(&response(1234)), Some(1234));
    }

    #[test]
    fn rejects_bad_checksum_and_length() {
        let mut f = response(600);
        f[8] = f[8].wrapping_add(1);
        assert_eq!(decode_response(&f), None);
        assert_eq!(decode_response(&f[..8]), None);
    }

    #[test]
    fn placeholder_source() {
        assert_eq!(FixedCo2::default().read_ppm(), Some(800));
    }
}
