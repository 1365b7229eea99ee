//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                 |
//! |-------------|--------------------|-----------------------------|
//! | `device_id` | (MAC source)       | ESP32 eFuse factory MAC     |
//! | `hardware`  | ActuatorPort       | Relay GPIOs, LEDC PWM       |
//! |             | SensorPort         | SHT31, ADC1, CO2 source     |
//! | `log_sink`  | EventSink          | Serial log output           |
//! | `mqtt`      | EventSink          | MQTT broker                 |
//! |             | Publisher          | `EspMqttClient`             |
//! | `nvs`       | ConfigPort         | NVS / in-memory store       |
//! |             | StoragePort        |                             |
//! | `platform`  | PlatformPort       | ESP32 timer, heap, WiFi AP  |
//! | `wifi`      | (link supervisor)  | ESP-IDF WiFi STA            |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod platform;
pub mod wifi;
