//! Mock hardware adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.

use std::collections::{HashMap, VecDeque};

use growzone::actuators::Actuator;
use growzone::app::events::AppEvent;
use growzone::app::ports::{
    ActuatorPort, ConfigError, ConfigPort, EventSink, PlatformPort, SensorPort, StorageError,
    StoragePort,
};
use growzone::config::SystemConfig;
use growzone::sensors::SensorSnapshot;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Switch(Actuator, bool),
    Light(Option<u8>),
}

// ── MockOutputs ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutputs {
    pub calls: Vec<ActuatorCall>,
}

impl MockOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level last written for `actuator`, `false` if never written.
    pub fn level(&self, actuator: Actuator) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match (c, actuator) {
                (ActuatorCall::Light(i), Actuator::Light) => Some(i.is_some()),
                (ActuatorCall::Switch(a, on), _) if *a == actuator => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl ActuatorPort for MockOutputs {
    fn write(&mut self, actuator: Actuator, on: bool) {
        self.calls.push(ActuatorCall::Switch(actuator, on));
    }

    fn write_light(&mut self, intensity: Option<u8>) {
        self.calls.push(ActuatorCall::Light(intensity));
    }
}

// ── ScriptedSensors ───────────────────────────────────────────

/// Replays queued snapshots, then repeats the last one.
pub struct ScriptedSensors {
    queue: VecDeque<SensorSnapshot>,
    last: SensorSnapshot,
    pub reads: u32,
}

impl ScriptedSensors {
    pub fn steady(snap: SensorSnapshot) -> Self {
        Self {
            queue: VecDeque::new(),
            last: snap,
            reads: 0,
        }
    }

    pub fn push(&mut self, snap: SensorSnapshot) {
        self.queue.push_back(snap);
    }
}

impl SensorPort for ScriptedSensors {
    fn read_all(&mut self) -> SensorSnapshot {
        self.reads += 1;
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// A valid snapshot with every field readable.
#[allow(dead_code)]
pub fn snapshot(temperature_c: f32, humidity_pct: f32, co2_ppm: i32) -> SensorSnapshot {
    SensorSnapshot {
        temperature_c,
        humidity_pct,
        co2_ppm,
        light_lux: 5_000,
        soil_moisture_pct: 40,
        valid: true,
    }
}

// ── MockPlatform ──────────────────────────────────────────────

pub struct MockPlatform {
    pub uptime_ms: u64,
    pub rssi: Option<i8>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            uptime_ms: 0,
            rssi: Some(-55),
        }
    }
}

impl PlatformPort for MockPlatform {
    fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    fn free_heap_bytes(&self) -> u32 {
        120_000
    }

    fn rssi_dbm(&self) -> Option<i8> {
        self.rssi
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
    pub config: Option<SystemConfig>,
    pub read_only: bool,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let k = format!("{}::{}", namespace, key);
        match self.store.get(&k) {
            Some(v) if v.len() > buf.len() => Err(StorageError::BufferTooSmall),
            Some(v) => {
                buf[..v.len()].copy_from_slice(v);
                Ok(v.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::IoError);
        }
        let k = format!("{}::{}", namespace, key);
        self.store.insert(k, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        self.config.clone().ok_or(ConfigError::NotFound)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = Some(config.clone());
        Ok(())
    }
}

// ── CollectSink ───────────────────────────────────────────────

#[derive(Default)]
pub struct CollectSink {
    pub events: Vec<AppEvent>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn alerts(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Alert(a) => Some(a.message),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
