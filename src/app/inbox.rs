//! Inbound command queue.
//!
//! Bridges the transport's receive callback (its own task) to the control
//! thread with a bounded `embassy-sync` channel. The control thread is the
//! only consumer and drains the queue at the top of every iteration, so
//! every queued message is applied before the next control cycle reads the
//! setpoints or the actuator bank.
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │  MQTT task   │─────────────────▶│ Control loop │
//! │  (callback)  │   depth 8, FIFO  │ drain → tick │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};
use log::warn;

use crate::error::InboxError;

/// Maximum queued messages.
pub const INBOX_DEPTH: usize = 8;
/// Largest accepted body (matches the link's receive buffer).
pub const MAX_PAYLOAD: usize = 1024;
/// Longest accepted topic name.
pub const MAX_TOPIC: usize = 96;

/// One message as received from the link, copied out of the transport's
/// buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC>,
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

impl InboundMessage {
    pub fn new(topic: &str, payload: &[u8]) -> Result<Self, InboxError> {
        let topic = String::try_from(topic).map_err(|_| InboxError::TopicTooLong)?;
        let payload = Vec::from_slice(payload).map_err(|_| InboxError::PayloadTooLarge)?;
        Ok(Self { topic, payload })
    }
}

/// Multi-producer, single-consumer queue of inbound messages.
pub struct CommandInbox<M: RawMutex> {
    channel: Channel<M, InboundMessage, INBOX_DEPTH>,
}

impl<M: RawMutex> CommandInbox<M> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Queue a message. Never blocks; a full queue drops the message.
    pub fn post(&self, topic: &str, payload: &[u8]) -> Result<(), InboxError> {
        let msg = InboundMessage::new(topic, payload).inspect_err(|e| {
            warn!("Dropping message on {topic}: {e}");
        })?;
        self.channel.try_send(msg).map_err(|_| {
            warn!("Dropping message on {topic}: command queue full");
            InboxError::Full
        })
    }

    /// Next message in arrival order, if any.
    pub fn take(&self) -> Option<InboundMessage> {
        self.channel.try_receive().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }
}

impl<M: RawMutex> Default for CommandInbox<M> {
    fn default() -> Self {
        Self::new()
    }
}
