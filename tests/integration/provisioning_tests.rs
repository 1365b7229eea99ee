//! Boot-time provisioning: device identity and persisted configuration.
//!
//! Exercises the same sequence `main` runs against NVS, using both the
//! mock store and the host backend of the real NVS adapter.

use growzone::adapters::device_id::read_mac;
use growzone::adapters::nvs::NvsAdapter;
use growzone::app::ports::{ConfigError, ConfigPort, StoragePort};
use growzone::config::SystemConfig;
use growzone::identity::{DeviceIdentity, KEY_DEVICE_ID, KEY_ZONE_ID, NAMESPACE, derive_device_id};
use growzone::topics::{Outbound, Topics};

use super::mock_hw::MockNvs;

const MAC: [u8; 6] = [0x24, 0x6F, 0x28, 0xA1, 0xB2, 0xC3];

#[test]
fn first_boot_generates_and_persists_device_id() {
    let mut nvs = MockNvs::new();
    let id = DeviceIdentity::provision(&mut nvs, &MAC, "unassigned");

    assert_eq!(id.device_id.as_str(), "ESP32_a1286f24");
    assert_eq!(id.zone_id.as_str(), "unassigned");
    assert!(nvs.exists(NAMESPACE, KEY_DEVICE_ID));
    assert!(!nvs.exists(NAMESPACE, KEY_ZONE_ID));
}

#[test]
fn second_boot_reuses_stored_identity() {
    let mut nvs = MockNvs::new();
    let first = DeviceIdentity::provision(&mut nvs, &MAC, "unassigned");
    nvs.write(NAMESPACE, KEY_ZONE_ID, b"tent-2").unwrap();

    let other_mac = [0u8; 6];
    let second = DeviceIdentity::provision(&mut nvs, &other_mac, "unassigned");
    assert_eq!(second.device_id, first.device_id);
    assert_eq!(second.zone_id.as_str(), "tent-2");
}

#[test]
fn storage_failure_still_yields_an_identity() {
    let mut nvs = MockNvs::new();
    nvs.read_only = true;
    let id = DeviceIdentity::provision(&mut nvs, &MAC, "fallback");
    assert_eq!(id.device_id, derive_device_id(&MAC));
    assert_eq!(id.zone_id.as_str(), "fallback");
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let nvs = MockNvs::new();
    let config = nvs.load().unwrap_or_default();
    assert_eq!(nvs.load().unwrap_err(), ConfigError::NotFound);
    assert_eq!(config.telemetry_interval_secs, 60);
    assert_eq!(config.heartbeat_interval_secs, 30);
    assert_eq!(config.topic_prefix.as_str(), "smartcrop");
}

#[test]
fn invalid_config_is_refused() {
    let mut nvs = MockNvs::new();
    let mut config = SystemConfig::default();
    config.heartbeat_interval_secs = 0;
    assert!(matches!(nvs.save(&config), Err(ConfigError::ValidationFailed(_))));
    assert!(nvs.config.is_none());
}

#[test]
fn nvs_adapter_boot_sequence() {
    let mut nvs = NvsAdapter::new().unwrap();

    let mut config = nvs.load().unwrap_or_default();
    config.alert_repeat_secs = 120;
    nvs.save(&config).unwrap();
    assert_eq!(nvs.load().unwrap().alert_repeat_secs, 120);

    let identity = DeviceIdentity::provision(&mut nvs, &read_mac(), &config.default_zone_id);
    let topics = Topics::new(&config.topic_prefix, &identity.device_id).unwrap();
    assert_eq!(
        topics.outbound(Outbound::Status).as_str(),
        "smartcrop/ESP32_efbeadde/status"
    );
}
