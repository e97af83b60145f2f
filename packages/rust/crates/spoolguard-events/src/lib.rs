#![allow(clippy::doc_markdown)]

//! spoolguard-events - In-process event bus for the print monitor
//!
//! The file-drop watcher, the detection pipeline and the service lifecycle
//! talk through one broadcast bus instead of calling each other. Consumers
//! that only care about a few topics take a [`TopicSubscription`].
//!
//! # Architecture
//!
//! ```text
//! watcher ──┐                        ┌──> bus pump   (marker/*, inbox/*)
//! monitor ──┼──> EventBus (broadcast) ┼──> tests / observers (job/*)
//! service ──┘                        └──> ...
//! ```
//!
//! Each service run owns its bus; nothing here is process-global.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

pub mod topics;

/// Default number of events buffered per subscriber before it lags.
pub const DEFAULT_CAPACITY: usize = 1024;

/// One message on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoolEvent {
    /// UUID v4.
    pub id: String,
    /// Component that published it, see [`sources`].
    pub source: String,
    /// Routing key, see [`topics`].
    pub topic: String,
    /// Topic-specific JSON body.
    pub payload: Value,
    /// Publication time.
    pub timestamp: DateTime<Utc>,
}

impl SpoolEvent {
    /// Event stamped with a fresh id and the current time.
    pub fn new(source: impl Into<String>, topic: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            topic: topic.into(),
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Event about one job: `{"job_id": ..}` plus the fields of `extra`.
    ///
    /// Non-object `extra` values are ignored.
    pub fn job_event(source: &str, topic: &str, job_id: &str, extra: Value) -> Self {
        let mut fields = match extra {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        fields.insert("job_id".to_string(), Value::String(job_id.to_string()));
        Self::new(source, topic, Value::Object(fields))
    }

    /// Event about one file: `{"path": ..}`.
    pub fn file_event(source: &str, topic: &str, path: &str) -> Self {
        Self::new(source, topic, json!({ "path": path }))
    }

    /// `job_id` payload field.
    pub fn job_id(&self) -> Option<&str> {
        self.text_field("job_id")
    }

    /// `path` payload field.
    pub fn path(&self) -> Option<&str> {
        self.text_field("path")
    }

    /// Whether the topic sits under `prefix` (`"job"` matches `job/detected`).
    #[must_use]
    pub fn is_under(&self, prefix: &str) -> bool {
        self.topic
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    fn text_field(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }
}

impl std::fmt::Display for SpoolEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}@{} {}", self.timestamp.to_rfc3339(), self.topic, self.source, self.payload)
    }
}

/// Broadcast bus. Cloning yields another handle to the same channel.
///
/// Publishing never blocks and never fails: with no subscribers the event is
/// dropped, and a subscriber that falls more than `capacity` events behind
/// sees `RecvError::Lagged` instead of stalling publishers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SpoolEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    /// Bus buffering up to `capacity` events per subscriber (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Per-subscriber buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publish; returns how many subscribers will see the event.
    pub fn publish(&self, event: SpoolEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => 0,
        }
    }

    /// Build and publish in one call.
    pub fn emit(&self, source: &str, topic: &str, payload: Value) -> usize {
        self.publish(SpoolEvent::new(source, topic, payload))
    }

    /// Every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SpoolEvent> {
        self.tx.subscribe()
    }

    /// Only events whose topic is one of `topics`.
    #[must_use]
    pub fn subscribe_topics(&self, topics: &[&str]) -> TopicSubscription {
        TopicSubscription {
            rx: self.tx.subscribe(),
            topics: topics.iter().map(|topic| (*topic).to_string()).collect(),
        }
    }

    /// Live receivers, filtered ones included.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiver filtered to a fixed set of topics.
#[derive(Debug)]
pub struct TopicSubscription {
    rx: broadcast::Receiver<SpoolEvent>,
    topics: Vec<String>,
}

impl TopicSubscription {
    /// Next matching event.
    ///
    /// # Errors
    ///
    /// `Lagged` when events were dropped (filtered or not), `Closed` when
    /// every bus handle is gone.
    pub async fn recv(&mut self) -> Result<SpoolEvent, RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if self.wants(&event.topic) {
                return Ok(event);
            }
        }
    }

    /// Whether `topic` passes the filter.
    #[must_use]
    pub fn wants(&self, topic: &str) -> bool {
        self.topics.iter().any(|wanted| wanted == topic)
    }
}

/// Publisher names used in [`SpoolEvent::source`].
pub mod sources {
    /// File-drop watcher.
    pub const WATCHER: &str = "watcher";
    /// Detection pipeline.
    pub const MONITOR: &str = "monitor";
    /// Push job feed.
    pub const FEED: &str = "feed";
    /// Queue poll loop.
    pub const POLL: &str = "poll";
    /// Service lifecycle.
    pub const SERVICE: &str = "service";
}
