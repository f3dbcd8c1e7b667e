//! Core aggregate and domain event traits.

use event_store::{AggregateId, UncommittedEvent, Version};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Trait for domain events.
///
/// Domain events are facts that have happened; they are immutable and named
/// in past tense. Implementors are closed enums serialized adjacently tagged
/// (`#[serde(tag = "type", content = "data")]`) whose tags match
/// [`event_type`](DomainEvent::event_type). Every variant carries a data
/// struct so the `data` field is always present.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;

    /// Splits the event into its type tag and its `data` payload.
    fn to_uncommitted(&self) -> Result<UncommittedEvent, serde_json::Error> {
        let mut tagged = serde_json::to_value(self)?;
        let payload = tagged
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null);
        Ok(UncommittedEvent::new(self.event_type(), payload))
    }

    /// Decodes a stored payload using its event type tag.
    ///
    /// Fails for a tag that is not one of this enum's variants.
    fn from_record(event_type: &str, payload: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::json!({
            "type": event_type,
            "data": payload,
        }))
    }
}

/// Events raised on an aggregate that have not been durably appended yet.
///
/// Append-only while the aggregate is in use; emptied in one step by
/// [`take`](PendingEvents::take) once the store has accepted them.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvents<E> {
    events: Vec<E>,
}

impl<E> Default for PendingEvents<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> PendingEvents<E> {
    fn push(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn as_slice(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Replaces the buffer with an empty one, returning its contents.
    fn take(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }
}

/// Trait for aggregates in an event-sourced system.
///
/// State is only ever changed through [`apply`](Aggregate::apply), either
/// while replaying history or when an intent method raises a new event.
/// `apply` matches exhaustively on the event enum, so every event type has
/// exactly one state transition and a missing one is a compile error.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The closed set of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Business rule violations reported by intent methods.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the aggregate type name stored with every event.
    fn aggregate_type() -> &'static str;

    /// Returns None until the creation event has been applied.
    fn id(&self) -> Option<AggregateId>;

    /// Version of the last persisted event, `Version::none()` for a fresh
    /// aggregate.
    fn version(&self) -> Version;

    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate's state.
    ///
    /// Must be deterministic and must not fail: events are facts.
    fn apply(&mut self, event: &Self::Event);

    fn pending_events(&self) -> &PendingEvents<Self::Event>;

    fn pending_events_mut(&mut self) -> &mut PendingEvents<Self::Event>;

    /// Applies a newly raised event and records it as pending.
    ///
    /// For intent methods only, after they have validated the request.
    fn raise(&mut self, event: Self::Event) {
        self.apply(&event);
        self.pending_events_mut().push(event);
    }

    /// Rebuilds state from history without recording anything as pending.
    fn replay(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(&event);
        }
    }

    /// Returns the events raised since the last commit.
    fn uncommitted_events(&self) -> &[Self::Event] {
        self.pending_events().as_slice()
    }

    /// Clears the pending events after the store accepted them.
    fn mark_committed(&mut self) -> Vec<Self::Event> {
        self.pending_events_mut().take()
    }
}
