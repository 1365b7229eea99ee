//! ESP32 platform adapter.
//!
//! Provides monotonic time and health figures for the status document.
//!
//! - **`feature = "espidf"`** wraps `esp_timer_get_time()`,
//!   `esp_get_free_heap_size()` and `esp_wifi_sta_get_ap_info()`.
//! - Otherwise uses `std::time::Instant` and fixed health figures for
//!   host-side testing and simulation.

use crate::app::ports::PlatformPort;

/// Platform adapter for the ESP32.
pub struct EspPlatform {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for EspPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl EspPlatform {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "espidf")]
impl PlatformPort for EspPlatform {
    fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    fn free_heap_bytes(&self) -> u32 {
        unsafe { esp_idf_svc::sys::esp_get_free_heap_size() }
    }

    fn rssi_dbm(&self) -> Option<i8> {
        let mut info: esp_idf_svc::sys::wifi_ap_record_t = unsafe { core::mem::zeroed() };
        let rc = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut info) };
        (rc == esp_idf_svc::sys::ESP_OK).then_some(info.rssi)
    }
}

#[cfg(not(feature = "espidf"))]
impl PlatformPort for EspPlatform {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn free_heap_bytes(&self) -> u32 {
        0
    }

    fn rssi_dbm(&self) -> Option<i8> {
        None
    }
}
