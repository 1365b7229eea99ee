//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] for the GrowZone node.
//!
//! - Config validation: every save is range-checked before persistence,
//!   and a stored config that no longer validates is refused on load.
//! - Namespace isolation: each subsystem uses its own namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per key.
//!
//! On the host the adapter is backed by an in-memory map so identity
//! provisioning and config persistence can be tested without flash.

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::SystemConfig;

#[cfg(not(feature = "espidf"))]
use std::{cell::RefCell, collections::HashMap};

#[cfg(feature = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

const CONFIG_NAMESPACE: &str = "growzone";
const CONFIG_KEY: &str = "syscfg";

/// Upper bound on the encoded config blob.
const MAX_CONFIG_BLOB: usize = 512;

pub struct NvsAdapter {
    #[cfg(feature = "espidf")]
    partition: EspDefaultNvsPartition,
    #[cfg(not(feature = "espidf"))]
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Take the default NVS partition, initialising (and if needed
    /// erasing) the flash.
    #[cfg(feature = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        let partition = EspDefaultNvsPartition::take().map_err(|e| {
            warn!("NVS partition unavailable: {e}");
            StorageError::IoError
        })?;
        info!("NvsAdapter: ESP-IDF NVS initialised");
        Ok(Self { partition })
    }

    #[cfg(not(feature = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("NvsAdapter: simulation backend");
        Ok(Self {
            store: RefCell::new(HashMap::new()),
        })
    }

    /// Partition handle, shared with the WiFi driver for its calibration
    /// data.
    #[cfg(feature = "espidf")]
    pub fn partition(&self) -> EspDefaultNvsPartition {
        self.partition.clone()
    }

    #[cfg(feature = "espidf")]
    fn open(&self, namespace: &str, write: bool) -> Result<EspNvs<NvsDefault>, StorageError> {
        EspNvs::new(self.partition.clone(), namespace, write).map_err(|e| {
            warn!("NVS open '{namespace}' failed: {e}");
            StorageError::IoError
        })
    }

    #[cfg(not(feature = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let mut buf = [0u8; MAX_CONFIG_BLOB];
        let len = self
            .read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf)
            .map_err(|e| match e {
                StorageError::NotFound => ConfigError::NotFound,
                StorageError::BufferTooSmall => ConfigError::Corrupted,
                _ => ConfigError::IoError,
            })?;
        let cfg: SystemConfig =
            postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", len);
        Ok(cfg)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_CONFIG_BLOB {
            return Err(ConfigError::IoError);
        }
        self.write(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)
            .map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) if data.len() > buf.len() => Err(StorageError::BufferTooSmall),
                Some(data) => {
                    buf[..data.len()].copy_from_slice(data);
                    Ok(data.len())
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(feature = "espidf")]
        {
            let nvs = self.open(namespace, false)?;
            match nvs.blob_len(key) {
                Ok(Some(len)) if len > buf.len() => return Err(StorageError::BufferTooSmall),
                Ok(Some(_)) => {}
                Ok(None) => return Err(StorageError::NotFound),
                Err(_) => return Err(StorageError::IoError),
            }
            match nvs.get_blob(key, buf) {
                Ok(Some(data)) => Ok(data.len()),
                Ok(None) => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(feature = "espidf")]
        {
            let mut nvs = self.open(namespace, true)?;
            nvs.set_blob(key, data).map_err(|e| {
                warn!("NVS write {namespace}/{key} failed: {e}");
                StorageError::IoError
            })
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(feature = "espidf")]
        {
            let mut nvs = self.open(namespace, true)?;
            nvs.remove(key).map(|_| ()).map_err(|_| StorageError::IoError)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow().contains_key(&composite)
        }

        #[cfg(feature = "espidf")]
        {
            self.open(namespace, false)
                .and_then(|nvs| nvs.contains(key).map_err(|_| StorageError::IoError))
                .unwrap_or(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_boot_has_no_config() {
        let nvs = NvsAdapter::new().unwrap();
        assert_eq!(nvs.load().unwrap_err(), ConfigError::NotFound);
    }

    #[test]
    fn config_round_trip() {
        let mut nvs = NvsAdapter::new().unwrap();
        let mut cfg = SystemConfig::default();
        cfg.limits.temp_max_c = 38.0;
        cfg.telemetry_interval_secs = 120;
        nvs.save(&cfg).unwrap();

        let loaded = nvs.load().unwrap();
        assert!((loaded.limits.temp_max_c - 38.0).abs() < f32::EPSILON);
        assert_eq!(loaded.telemetry_interval_secs, 120);
    }

    #[test]
    fn invalid_config_is_not_persisted() {
        let mut nvs = NvsAdapter::new().unwrap();
        let mut cfg = SystemConfig::default();
        cfg.limits.temp_min_c = 60.0;
        assert!(matches!(nvs.save(&cfg), Err(ConfigError::ValidationFailed(_))));
        assert!(!nvs.exists(CONFIG_NAMESPACE, CONFIG_KEY));
    }

    #[test]
    fn garbage_blob_is_corrupted() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write(CONFIG_NAMESPACE, CONFIG_KEY, &[0xFF; 3]).unwrap();
        assert_eq!(nvs.load().unwrap_err(), ConfigError::Corrupted);
    }

    #[test]
    fn storage_round_trip() {
        let mut nvs = NvsAdapter::new().unwrap();
        let data = b"hello NVS";
        nvs.write("test_ns", "greeting", data).unwrap();
        assert!(nvs.exists("test_ns", "greeting"));

        let mut buf = [0u8; 64];
        let len = nvs.read("test_ns", "greeting", &mut buf).unwrap();
        assert_eq!(&buf[..len], data);

        nvs.delete("test_ns", "greeting").unwrap();
        assert!(!nvs.exists("test_ns", "greeting"));
    }

    #[test]
    fn short_buffer_is_reported() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write("ns", "k", &[1, 2, 3, 4]).unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(nvs.read("ns", "k", &mut buf), Err(StorageError::BufferTooSmall));
    }

    #[test]
    fn namespace_isolation() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.write("ns_a", "key", b"alpha").unwrap();
        nvs.write("ns_b", "key", b"bravo").unwrap();

        let mut buf = [0u8; 64];
        let len = nvs.read("ns_a", "key", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"alpha");

        let len = nvs.read("ns_b", "key", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"bravo");
    }
}
