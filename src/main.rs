//! GrowZone Firmware: Main Entry Point
//!
//! Hexagonal architecture, single control thread plus an MQTT receive
//! thread that only queues messages.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  OutputBoard     SensorHub      NvsAdapter     EspPlatform     │
//! │  (ActuatorPort)  (SensorPort)   (Config+NVS)   (PlatformPort)  │
//! │  WifiLink        EspPublisher ─▶ MqttEventSink (EventSink)     │
//! │                  mqtt-rx thread ─▶ CommandInbox                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Dispatcher · Safety · Control · ActuatorBank          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::adc::oneshot::AdcDriver;
use esp_idf_svc::hal::gpio::{AnyOutputPin, Output, OutputPin, PinDriver};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::ledc::config::TimerConfig;
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use log::{info, warn};

use growzone::adapters::device_id;
use growzone::adapters::hardware::{EspAnalog, OutputBoard, Relays};
use growzone::adapters::mqtt::{EspPublisher, MqttEventSink, MqttSettings, spawn_receiver};
use growzone::adapters::nvs::NvsAdapter;
use growzone::adapters::platform::EspPlatform;
use growzone::adapters::wifi::{WifiCredentials, WifiLink};
use growzone::app::inbox::CommandInbox;
use growzone::app::ports::{ConfigPort, PlatformPort};
use growzone::app::service::AppService;
use growzone::config::SystemConfig;
use growzone::drivers::{GrowLight, Polarity, RelayOutput};
use growzone::error::Error;
use growzone::identity::DeviceIdentity;
use growzone::pins;
use growzone::sensors::SensorHub;
use growzone::sensors::co2::FixedCo2;
use growzone::topics::Topics;

/// Inbound messages, filled by the MQTT receive thread.
static INBOX: CommandInbox<CriticalSectionRawMutex> = CommandInbox::new();

const LOOP_PERIOD: Duration = Duration::from_millis(1_000);

const WIFI_SSID: &str = match option_env!("GROWZONE_WIFI_SSID") {
    Some(v) => v,
    None => "",
};
const WIFI_PASSWORD: &str = match option_env!("GROWZONE_WIFI_PASSWORD") {
    Some(v) => v,
    None => "",
};
const MQTT_URL: &str = match option_env!("GROWZONE_MQTT_URL") {
    Some(v) => v,
    None => "mqtt://broker.local:1883",
};
const MQTT_USERNAME: Option<&str> = option_env!("GROWZONE_MQTT_USERNAME");
const MQTT_PASSWORD: Option<&str> = option_env!("GROWZONE_MQTT_PASSWORD");

fn relay(pin: impl OutputPin + 'static) -> Result<RelayOutput<PinDriver<'static, AnyOutputPin, Output>>> {
    let driver = PinDriver::output(pin.downgrade_output())?;
    Ok(RelayOutput::new(driver, Polarity::ActiveHigh))
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GrowZone v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    for (name, gpio) in pins::ALL {
        info!("pin {:<12} GPIO{}", name, gpio);
    }

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().map_err(Error::from)?;
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Identity ───────────────────────────────────────────
    let mac = device_id::read_mac();
    let identity = DeviceIdentity::provision(&mut nvs, &mac, &config.default_zone_id);
    info!("Device {} in zone {}", identity.device_id, identity.zone_id);
    let topics = Topics::new(&config.topic_prefix, &identity.device_id).map_err(Error::from)?;

    // ── 4. Outputs (all off) and sensors ──────────────────────
    let p = peripherals.pins;
    let relays = Relays {
        fan: relay(p.gpio25)?,
        humidifier: relay(p.gpio26)?,
        heater: relay(p.gpio27)?,
        pump: relay(p.gpio33)?,
        valve: relay(p.gpio14)?,
    };
    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(pins::GROW_LIGHT_PWM_FREQ_HZ))
            .resolution(Resolution::Bits8),
    )?;
    let light = LedcDriver::new(peripherals.ledc.channel0, timer, p.gpio32)?;
    let board = OutputBoard::new(relays, GrowLight::new(light));

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        p.gpio21,
        p.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ)),
    )?;
    let adc: &'static AdcDriver<'static, _> = Box::leak(Box::new(AdcDriver::new(peripherals.adc1)?));
    let analog = EspAnalog::new(adc, p.gpio34, p.gpio35)?;
    let mut sensors = SensorHub::new(i2c, analog, FixedCo2::default());

    let mut service = AppService::new(config, identity, board);
    let platform = EspPlatform::new();

    // ── 5. Network link ───────────────────────────────────────
    let mut wifi = match WifiCredentials::new(WIFI_SSID, WIFI_PASSWORD) {
        Ok(creds) => Some(WifiLink::start(peripherals.modem, sysloop, nvs.partition(), &creds)?),
        Err(e) => {
            warn!("WiFi disabled: {}", e);
            None
        }
    };

    let (publisher, conn) = EspPublisher::connect(&MqttSettings {
        url: MQTT_URL,
        client_id: &service.identity().device_id,
        username: MQTT_USERNAME,
        password: MQTT_PASSWORD,
    })?;
    spawn_receiver(&publisher, conn, &INBOX)?;
    let mut sink = MqttEventSink::new(topics.clone(), publisher);

    // ── 6. Main loop ──────────────────────────────────────────
    info!("Entering control loop");
    loop {
        let now_ms = platform.uptime_ms();

        if let Some(link) = wifi.as_mut() {
            link.poll(now_ms);
        }
        if sink.publisher_mut().on_session(&topics) {
            service.link_up(&platform, &mut sink);
        }

        service.drain_inbox(&INBOX, &mut sink);
        service.tick(now_ms, &mut sensors, &mut sink);
        service.poll_schedules(now_ms, &platform, &mut sink);

        std::thread::sleep(LOOP_PERIOD);
    }
}
