//! WiFi station-mode adapter.
//!
//! Joins the configured access point at boot and keeps the link up
//! afterwards. Link loss never stops local control; the main loop just
//! calls [`WifiLink::poll`] and the adapter retries in the background.
//!
//! ## cfg gating
//!
//! - **`feature = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: only credential validation and the backoff
//!   schedule, for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.

use core::fmt;

#[cfg(feature = "espidf")]
use log::{info, warn};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Validated station credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        if ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if !is_printable_ascii(ssid) {
            return Err(ConnectivityError::InvalidSsid);
        }
        if !password.is_empty() && password.len() < 8 {
            return Err(ConnectivityError::InvalidPassword);
        }
        Ok(Self {
            ssid: ssid.try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Open networks have no password.
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Backoff
// ───────────────────────────────────────────────────────────────

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

/// Exponential reconnect schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    delay_secs: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            delay_secs: INITIAL_BACKOFF_SECS,
        }
    }
}

impl Backoff {
    /// Delay before the next attempt, then double it.
    pub fn next_delay_secs(&mut self) -> u32 {
        let d = self.delay_secs;
        self.delay_secs = (self.delay_secs * 2).min(MAX_BACKOFF_SECS);
        d
    }

    pub fn reset(&mut self) {
        self.delay_secs = INITIAL_BACKOFF_SECS;
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF link
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub use esp::WifiLink;

#[cfg(feature = "espidf")]
mod esp {
    use super::*;

    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys::EspError;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

    pub struct WifiLink {
        wifi: BlockingWifi<EspWifi<'static>>,
        backoff: Backoff,
        next_attempt_ms: u64,
        was_connected: bool,
    }

    impl WifiLink {
        /// Bring up the station interface and make one blocking attempt
        /// to join. Failure to join is not an error; [`poll`](Self::poll)
        /// keeps retrying.
        pub fn start(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: EspDefaultNvsPartition,
            creds: &WifiCredentials,
        ) -> Result<Self, EspError> {
            let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
            let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

            let auth_method = if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            };
            wifi.set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: creds.ssid.clone(),
                password: creds.password.clone(),
                auth_method,
                ..Default::default()
            }))?;
            wifi.start()?;
            info!("WiFi: connecting to '{}'", creds.ssid());

            let mut link = Self {
                wifi,
                backoff: Backoff::default(),
                next_attempt_ms: 0,
                was_connected: false,
            };
            match link.wifi.connect().and_then(|_| link.wifi.wait_netif_up()) {
                Ok(()) => {
                    link.was_connected = true;
                    info!("WiFi: connected");
                }
                Err(e) => warn!("WiFi: initial connect failed: {e}"),
            }
            Ok(link)
        }

        pub fn is_connected(&self) -> bool {
            self.wifi.is_connected().unwrap_or(false)
        }

        /// Retry on the backoff schedule while the link is down.
        pub fn poll(&mut self, now_ms: u64) {
            let up = self.is_connected();
            if up {
                if !self.was_connected {
                    info!("WiFi: reconnected");
                }
                self.was_connected = true;
                self.backoff.reset();
                return;
            }
            if self.was_connected {
                warn!("WiFi: connection lost, entering reconnect");
                self.was_connected = false;
                self.next_attempt_ms = now_ms;
            }
            if now_ms < self.next_attempt_ms {
                return;
            }
            let delay = self.backoff.next_delay_secs();
            self.next_attempt_ms = now_ms + u64::from(delay) * 1_000;
            info!("WiFi: reconnect attempt (next in {}s)", delay);
            // Non-blocking; completion shows up in a later poll.
            if let Err(e) = self.wifi.wifi_mut().connect() {
                warn!("WiFi: {}: {e}", ConnectivityError::ConnectionFailed);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
