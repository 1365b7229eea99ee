//! Device identity: the id the node publishes under and the zone it
//! reports for.
//!
//! Both live in the `node` storage namespace. A node without a stored id
//! derives one from its factory MAC on first boot and persists it, so the
//! id survives firmware updates even if the derivation changes. The zone
//! is written by provisioning; until then the configured default is used.

use core::fmt::Write;

use log::{info, warn};

use crate::adapters::device_id::MacAddress;
use crate::app::ports::{StorageError, StoragePort};
use crate::telemetry::IdString;

pub const NAMESPACE: &str = "node";
pub const KEY_DEVICE_ID: &str = "deviceId";
pub const KEY_ZONE_ID: &str = "zoneId";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: IdString,
    pub zone_id: IdString,
}

impl DeviceIdentity {
    /// Build from string slices, truncating anything over capacity.
    pub fn new(device_id: &str, zone_id: &str) -> Self {
        Self {
            device_id: truncated(device_id),
            zone_id: truncated(zone_id),
        }
    }

    /// Load the identity, generating and persisting the device id if absent.
    ///
    /// Storage failures are logged and never fatal: the node runs with the
    /// derived id and the default zone. Only a missing id is generated and
    /// written; a stored id that cannot be used is left in place.
    pub fn provision(storage: &mut impl StoragePort, mac: &MacAddress, default_zone: &str) -> Self {
        let device_id = match read_string(storage, KEY_DEVICE_ID) {
            Ok(Some(id)) => id,
            Ok(None) => {
                let id = derive_device_id(mac);
                if let Err(e) = storage.write(NAMESPACE, KEY_DEVICE_ID, id.as_bytes()) {
                    warn!("Could not persist device id: {e}");
                }
                id
            }
            Err(e) => {
                warn!("Stored device id unusable ({e}), running with the derived id");
                derive_device_id(mac)
            }
        };
        let zone_id = match read_string(storage, KEY_ZONE_ID) {
            Ok(Some(zone)) => zone,
            Ok(None) => truncated(default_zone),
            Err(e) => {
                warn!("Stored zone id unusable ({e}), using {default_zone}");
                truncated(default_zone)
            }
        };

        info!("Device ID: {device_id}");
        info!("Zone ID: {zone_id}");
        Self { device_id, zone_id }
    }
}

/// `ESP32_` followed by the low 32 bits of the MAC in lowercase hex,
/// without leading zeros.
///
/// The eFuse MAC is read as a little-endian 48-bit integer, so the low
/// 32 bits are the first four bytes.
pub fn derive_device_id(mac: &MacAddress) -> IdString {
    let low = u32::from_le_bytes([mac[0], mac[1], mac[2], mac[3]]);
    let mut id = IdString::new();
    // "ESP32_" + at most 8 hex digits always fits.
    let _ = write!(id, "ESP32_{low:x}");
    id
}

/// `Ok(None)` when the key is absent or empty. A value longer than an
/// [`IdString`] or not UTF-8 is an error, never a silent truncation.
fn read_string(storage: &impl StoragePort, key: &str) -> Result<Option<IdString>, StorageError> {
    let mut buf = [0u8; 32];
    let len = match storage.read(NAMESPACE, key, &mut buf) {
        Ok(len) => len,
        Err(StorageError::NotFound) => return Ok(None),
        Err(e) => return Err(e),
    };
    let s = core::str::from_utf8(&buf[..len]).map_err(|_| StorageError::IoError)?;
    Ok((!s.is_empty()).then(|| truncated(s)))
}

fn truncated(s: &str) -> IdString {
    let mut out = IdString::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
