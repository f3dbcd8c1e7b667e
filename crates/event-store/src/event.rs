use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an aggregate instance.
///
/// Every event stream is keyed by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Creates a new random aggregate ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AggregateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Store-assigned identifier of a persisted event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version number of an aggregate, used for optimistic concurrency control.
///
/// The first persisted event of a stream is version 1 and each following
/// event adds one. `Version::none()` (-1) marks an aggregate that has no
/// history yet and doubles as the "expect a new stream" append token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    const NONE: i64 = -1;

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The sentinel version of an aggregate that was never persisted.
    pub fn none() -> Self {
        Self(Self::NONE)
    }

    /// The version of the first event in a stream.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn is_none(&self) -> bool {
        self.0 == Self::NONE
    }

    /// Returns the version following this one.
    ///
    /// The sentinel is followed by `first()`.
    pub fn next(&self) -> Self {
        if self.is_none() {
            Self::first()
        } else {
            Self(self.0 + 1)
        }
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// An event raised by an aggregate that has not been assigned a version yet.
///
/// The event log store turns these into [`EventEnvelope`]s when it appends
/// them, numbering them after the expected version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    /// Discriminator used to decode the payload (e.g. "PostCreated").
    pub event_type: String,

    /// The event's typed fields, serialized.
    pub payload: serde_json::Value,
}

impl UncommittedEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// A persisted event record, the document shape of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Store-assigned record identifier.
    pub event_id: EventId,

    /// Wall-clock time of the append.
    pub timestamp: DateTime<Utc>,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// Discriminator for the aggregate kind (e.g. "Post").
    pub aggregate_type: String,

    /// Position of the event in its aggregate's stream, starting at 1.
    pub version: Version,

    /// Discriminator for the event kind, used for polymorphic decode.
    pub event_type: String,

    /// The event's typed fields as JSON.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Wraps an uncommitted event into a record at the given version.
    pub fn new(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        version: Version,
        event: UncommittedEvent,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            timestamp: Utc::now(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            version,
            event_type: event.event_type,
            payload: event.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_id_parses_from_its_display_form() {
        let id = AggregateId::new();
        let parsed: AggregateId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<AggregateId>().is_err());
    }

    #[test]
    fn event_id_new_creates_unique_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn sentinel_is_followed_by_first() {
        assert!(Version::none().is_none());
        assert_eq!(Version::none().as_i64(), -1);
        assert_eq!(Version::none().next(), Version::first());
        assert_eq!(Version::first().next(), Version::new(2));
        assert_eq!(Version::default(), Version::none());
    }

    #[test]
    fn version_ordering() {
        assert!(Version::none() < Version::first());
        assert!(Version::new(2) < Version::new(3));
    }

    #[test]
    fn envelope_takes_type_and_payload_from_uncommitted_event() {
        let aggregate_id = AggregateId::new();
        let event = UncommittedEvent::new("PostLiked", serde_json::json!({}));

        let envelope = EventEnvelope::new(aggregate_id, "Post", Version::new(2), event);

        assert_eq!(envelope.aggregate_id, aggregate_id);
        assert_eq!(envelope.aggregate_type, "Post");
        assert_eq!(envelope.version, Version::new(2));
        assert_eq!(envelope.event_type, "PostLiked");
        assert_eq!(envelope.payload, serde_json::json!({}));
    }
}
