//! Output drivers for the relay bank and the dimmable grow light.

pub mod grow_light;
pub mod relay;

pub use grow_light::GrowLight;
pub use relay::{Polarity, RelayOutput};
