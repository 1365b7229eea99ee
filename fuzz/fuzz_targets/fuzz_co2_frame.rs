//! Fuzz target: MH-Z19 `decode_response`
//!
//! Arbitrary bytes must never panic the decoder, and anything it accepts
//! must be a well-formed 9-byte frame with a valid checksum.
//!
//! cargo fuzz run fuzz_co2_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use growzone::sensors::co2::{FRAME_LEN, checksum, decode_response};

fuzz_target!(|data: &[u8]| {
    if let Some(ppm) = decode_response(data) {
        assert_eq!(data.len(), FRAME_LEN);
        assert!((0..=65_535).contains(&ppm));
        let frame: [u8; FRAME_LEN] = data.try_into().unwrap();
        assert_eq!(checksum(&frame), frame[8]);
    }
});
