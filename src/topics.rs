//! Device-scoped topic namespace: `<prefix>/<deviceId>/<suffix>`.
//!
//! Inbound routing only looks at the suffix (see
//! [`Route::from_topic`](crate::app::commands::Route::from_topic)); this
//! module builds the full names for subscribing and publishing.

use crate::app::commands::Route;
use crate::app::ports::ConfigError;

/// Full topic name buffer.
pub type TopicString = heapless::String<96>;

/// Longest suffix appended to the base (`telemetry`, `setpoints`).
const MAX_SUFFIX: usize = 9;

/// Longest `<prefix>/<deviceId>` that still leaves room for `/<suffix>`.
pub const MAX_BASE: usize = 96 - 1 - MAX_SUFFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outbound {
    /// Retained liveness document.
    Status,
    Telemetry,
    Alert,
}

impl Outbound {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Telemetry => "telemetry",
            Self::Alert => "alert",
        }
    }

    /// Whether the broker should keep the last message for new subscribers.
    pub const fn retained(self) -> bool {
        matches!(self, Self::Status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    base: TopicString,
}

impl Topics {
    /// Fails when `<prefix>/<deviceId>` is longer than [`MAX_BASE`].
    pub fn new(prefix: &str, device_id: &str) -> Result<Self, ConfigError> {
        if prefix.len() + 1 + device_id.len() > MAX_BASE {
            return Err(ConfigError::ValidationFailed("topic namespace too long"));
        }
        let mut base = TopicString::new();
        base.push_str(prefix)
            .and_then(|()| base.push('/'))
            .and_then(|()| base.push_str(device_id))
            .map_err(|()| ConfigError::ValidationFailed("topic namespace too long"))?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn join(&self, suffix: &str) -> TopicString {
        debug_assert!(suffix.len() <= MAX_SUFFIX, "suffix {suffix} exceeds MAX_SUFFIX");
        let mut t = self.base.clone();
        let joined = t.push('/').and_then(|()| t.push_str(suffix));
        debug_assert!(joined.is_ok(), "topic {t} truncated");
        t
    }

    pub fn outbound(&self, kind: Outbound) -> TopicString {
        self.join(kind.suffix())
    }

    /// Topic to subscribe to for `route`. `None` for [`Route::Unrouted`].
    pub fn inbound(&self, route: Route) -> Option<TopicString> {
        route.suffix().map(|s| self.join(s))
    }

    /// Every inbound topic, in subscription order.
    pub fn subscriptions(&self) -> impl Iterator<Item = TopicString> + '_ {
        Route::SUBSCRIBED.into_iter().filter_map(|r| self.inbound(r))
    }
}
