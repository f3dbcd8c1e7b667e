use async_trait::async_trait;

use crate::repository::{EventRepository, EventTransaction};
use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, UncommittedEvent, Version,
};

/// Per-aggregate event streams with optimistic concurrency control.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to an aggregate's stream.
    ///
    /// Fails with `ConcurrencyConflict` unless the stream's last version is
    /// `expected_version` (`Version::none()` expects an empty stream). The
    /// events are numbered `expected_version + 1, + 2, ...` and written
    /// atomically: either all of them are committed or none is.
    ///
    /// Returns the version of the last appended event.
    async fn append(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        events: Vec<UncommittedEvent>,
        expected_version: Version,
    ) -> Result<Version>;

    /// Returns the aggregate's stream ordered by ascending version.
    ///
    /// Fails with `AggregateNotFound` if the aggregate has no events.
    async fn read(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Returns the last persisted version, or None for an unknown aggregate.
    async fn last_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        match self.read(aggregate_id).await {
            Ok(events) => Ok(events.last().map(|e| e.version)),
            Err(EventStoreError::AggregateNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Checks if an aggregate exists (has any events).
    async fn aggregate_exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.last_version(aggregate_id).await?.is_some())
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates a batch before it is numbered and written.
pub fn validate_events_for_append(aggregate_type: &str, events: &[UncommittedEvent]) -> Result<()> {
    if events.is_empty() {
        return Err(EventStoreError::InvalidAppend(
            "Cannot append empty event list".to_string(),
        ));
    }

    if aggregate_type.is_empty() {
        return Err(EventStoreError::InvalidAppend(
            "Aggregate type must not be empty".to_string(),
        ));
    }

    if let Some(position) = events.iter().position(|e| e.event_type.is_empty()) {
        return Err(EventStoreError::InvalidAppend(format!(
            "Event at position {position} has no event type"
        )));
    }

    Ok(())
}

/// The event log store: versioning and concurrency checks over an
/// [`EventRepository`].
#[derive(Debug, Clone)]
pub struct EventLogStore<R> {
    repository: R,
}

impl<R: EventRepository> EventLogStore<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    async fn write_batch(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        events: Vec<UncommittedEvent>,
        expected_version: Version,
    ) -> Result<Version> {
        let mut tx = self.repository.begin().await?;
        let mut version = expected_version;

        for event in events {
            version = version.next();
            let record = EventEnvelope::new(aggregate_id, aggregate_type, version, event);
            if let Err(e) = tx.insert(record).await {
                abort_quietly(tx).await;
                return Err(e);
            }
        }

        tx.commit().await?;
        Ok(version)
    }
}

async fn abort_quietly(tx: Box<dyn EventTransaction>) {
    if let Err(e) = tx.abort().await {
        tracing::warn!(error = %e, "failed to abort event transaction");
    }
}

#[async_trait]
impl<R: EventRepository> EventStore for EventLogStore<R> {
    #[tracing::instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        events: Vec<UncommittedEvent>,
        expected_version: Version,
    ) -> Result<Version> {
        validate_events_for_append(aggregate_type, &events)?;
        let event_count = events.len() as u64;

        let stream = self.repository.find_by_aggregate_id(aggregate_id).await?;
        let current_version = stream
            .iter()
            .map(|e| e.version)
            .max()
            .unwrap_or(Version::none());

        // Versions are contiguous, so comparing the last one is enough.
        if current_version != expected_version {
            metrics::counter!("event_store_concurrency_conflicts").increment(1);
            tracing::warn!(%expected_version, %current_version, "stale expected version");
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual: current_version,
            });
        }

        let last_version = self
            .write_batch(aggregate_id, aggregate_type, events, expected_version)
            .await
            .map_err(|e| match e {
                // Another append committed between our read and our commit.
                EventStoreError::VersionAlreadyExists { version, .. } => {
                    metrics::counter!("event_store_concurrency_conflicts").increment(1);
                    tracing::warn!(%expected_version, %version, "lost append race");
                    EventStoreError::ConcurrencyConflict {
                        aggregate_id,
                        expected: expected_version,
                        actual: version,
                    }
                }
                other => other,
            })?;

        metrics::counter!("event_store_events_appended").increment(event_count);
        tracing::debug!(%last_version, "events appended");

        Ok(last_version)
    }

    #[tracing::instrument(skip(self))]
    async fn read(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        let mut events = self.repository.find_by_aggregate_id(aggregate_id).await?;
        if events.is_empty() {
            return Err(EventStoreError::AggregateNotFound(aggregate_id));
        }
        events.sort_by_key(|e| e.version);
        Ok(events)
    }
}
