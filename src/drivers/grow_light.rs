//! Dimmable grow light on a PWM channel.
//!
//! `on` drives the intensity percentage onto the duty cycle; `off` drives
//! the channel fully off. There is no "on at 0 %" state distinct from off
//! at the hardware level, but the two are kept apart in the API so an off
//! light never carries a stale intensity.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

pub struct GrowLight<P> {
    pwm: P,
    /// Applied intensity, `None` while off.
    intensity: Option<u8>,
}

impl<P: SetDutyCycle> GrowLight<P> {
    pub fn new(pwm: P) -> Self {
        let mut light = Self {
            pwm,
            intensity: None,
        };
        light.apply(None);
        light
    }

    /// `Some(0..=100)` = on at that intensity, `None` = off.
    pub fn apply(&mut self, intensity: Option<u8>) {
        let result = match intensity {
            Some(pct) => self.pwm.set_duty_cycle_percent(pct.min(100)),
            None => self.pwm.set_duty_cycle_fully_off(),
        };
        if result.is_err() {
            warn!("Grow light PWM write failed");
        }
        self.intensity = intensity.map(|p| p.min(100));
    }

    pub fn intensity(&self) -> Option<u8> {
        self.intensity
    }

    pub fn release(self) -> P {
        self.pwm
    }
}
