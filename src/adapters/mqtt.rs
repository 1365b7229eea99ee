//! MQTT adapter.
//!
//! [`MqttEventSink`] implements [`EventSink`] on top of any [`Publisher`]:
//! status, telemetry and alert documents go to their device-scoped
//! topics, and every event is also written to the serial log. Publish
//! failures are logged and dropped; nothing is queued for replay.
//!
//! With `feature = "espidf"`, [`EspPublisher`] wraps `EspMqttClient` and
//! [`spawn_receiver`] runs the connection loop on its own thread, posting
//! complete inbound messages to the
//! [`CommandInbox`](crate::app::inbox::CommandInbox).

use log::{debug, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, Publisher};
use crate::telemetry;
use crate::topics::{Outbound, Topics};

use super::log_sink::LogEventSink;

/// Event sink that publishes outbound documents.
pub struct MqttEventSink<P> {
    topics: Topics,
    publisher: P,
    log: LogEventSink,
    published: u32,
    failed: u32,
}

impl<P: Publisher> MqttEventSink<P> {
    pub fn new(topics: Topics, publisher: P) -> Self {
        Self {
            topics,
            publisher,
            log: LogEventSink::new(),
            published: 0,
            failed: 0,
        }
    }

    fn send<T: serde::Serialize>(&mut self, kind: Outbound, doc: &T) {
        let topic = self.topics.outbound(kind);
        let result = telemetry::encode(doc)
            .and_then(|body| self.publisher.publish(&topic, &body, kind.retained()));
        match result {
            Ok(()) => {
                self.published = self.published.wrapping_add(1);
                debug!("MQTT: published {}", topic);
            }
            Err(e) => {
                self.failed = self.failed.wrapping_add(1);
                warn!("MQTT: publish to {} failed: {}", topic, e);
            }
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Documents handed to the broker.
    pub fn published_count(&self) -> u32 {
        self.published
    }

    /// Documents dropped because the publish failed.
    pub fn failed_count(&self) -> u32 {
        self.failed
    }
}

impl<P: Publisher> EventSink for MqttEventSink<P> {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        match event {
            AppEvent::Status(doc) => self.send(Outbound::Status, doc),
            AppEvent::Telemetry(doc) => self.send(Outbound::Telemetry, doc),
            AppEvent::Alert(doc) => self.send(Outbound::Alert, doc),
            AppEvent::SetpointsUpdated(_)
            | AppEvent::ManualOverride { .. }
            | AppEvent::EmergencyStop
            | AppEvent::MessageRejected(_) => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub use esp::{EspPublisher, MqttSettings, spawn_receiver};

#[cfg(feature = "espidf")]
mod esp {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
    };
    use esp_idf_svc::sys::EspError;
    use log::{info, warn};

    use crate::app::inbox::CommandInbox;
    use crate::app::ports::Publisher;
    use crate::error::TransportError;
    use crate::topics::Topics;

    const RX_STACK_SIZE: usize = 8 * 1024;

    /// Broker connection settings.
    pub struct MqttSettings<'a> {
        pub url: &'a str,
        pub client_id: &'a str,
        pub username: Option<&'a str>,
        pub password: Option<&'a str>,
    }

    pub struct EspPublisher {
        client: EspMqttClient<'static>,
        connected: Arc<AtomicBool>,
        fresh_session: Arc<AtomicBool>,
    }

    impl EspPublisher {
        /// Create the client. The connection loop must be handed to
        /// [`spawn_receiver`] before anything is published.
        pub fn connect(settings: &MqttSettings<'_>) -> Result<(Self, EspMqttConnection), EspError> {
            let conf = MqttClientConfiguration {
                client_id: Some(settings.client_id),
                username: settings.username,
                password: settings.password,
                ..Default::default()
            };
            let (client, conn) = EspMqttClient::new(settings.url, &conf)?;
            info!("MQTT: client created for {}", settings.url);
            Ok((
                Self {
                    client,
                    connected: Arc::new(AtomicBool::new(false)),
                    fresh_session: Arc::new(AtomicBool::new(false)),
                },
                conn,
            ))
        }

        pub fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Relaxed)
        }

        /// After every (re)connect, subscribe to the device's inbound
        /// topics. Returns `true` once per new session so the caller can
        /// announce itself.
        pub fn on_session(&mut self, topics: &Topics) -> bool {
            if !self.fresh_session.swap(false, Ordering::AcqRel) {
                return false;
            }
            for topic in topics.subscriptions() {
                match self.client.subscribe(&topic, QoS::AtMostOnce) {
                    Ok(_) => info!("MQTT: subscribed to {}", topic),
                    Err(e) => warn!("MQTT: {} ({}): {e}", TransportError::SubscribeFailed, topic),
                }
            }
            true
        }
    }

    impl Publisher for EspPublisher {
        fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError> {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }
            self.client
                .publish(topic, QoS::AtMostOnce, retain, payload)
                .map(|_| ())
                .map_err(|_| TransportError::PublishFailed)
        }
    }

    /// Run the connection loop on its own thread. Complete inbound
    /// messages are posted to `inbox`; a full inbox drops the message.
    pub fn spawn_receiver(
        publisher: &EspPublisher,
        mut conn: EspMqttConnection,
        inbox: &'static CommandInbox<CriticalSectionRawMutex>,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        let connected = publisher.connected.clone();
        let fresh_session = publisher.fresh_session.clone();
        thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(RX_STACK_SIZE)
            .spawn(move || {
                while let Ok(event) = conn.next() {
                    match event.payload() {
                        EventPayload::Connected(_) => {
                            info!("MQTT: connected");
                            connected.store(true, Ordering::Relaxed);
                            fresh_session.store(true, Ordering::Release);
                        }
                        EventPayload::Disconnected => {
                            warn!("MQTT: disconnected");
                            connected.store(false, Ordering::Relaxed);
                        }
                        EventPayload::Received {
                            topic: Some(topic),
                            data,
                            details: Details::Complete,
                            ..
                        } => {
                            if let Err(e) = inbox.post(topic, data) {
                                warn!("MQTT: dropped message on {}: {}", topic, e);
                            }
                        }
                        EventPayload::Received { .. } => {
                            warn!("MQTT: fragmented message ignored");
                        }
                        _ => {}
                    }
                }
                connected.store(false, Ordering::Relaxed);
                warn!("MQTT: connection loop ended");
            })
    }
}
