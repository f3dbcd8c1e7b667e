//! Seam to the physical, append-only document store behind the event log.

use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, Result};

/// Physical storage of event records.
///
/// Implementations only insert and find records; versioning and the
/// concurrency check live in [`EventLogStore`](crate::EventLogStore).
/// They must however reject a second record with the same aggregate id and
/// version with [`EventStoreError::VersionAlreadyExists`](crate::EventStoreError),
/// at insert or at commit time.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Returns every record of one aggregate, ordered by ascending version.
    async fn find_by_aggregate_id(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>>;

    /// Opens a unit of work whose inserts become visible together on commit.
    async fn begin(&self) -> Result<Box<dyn EventTransaction>>;
}

/// An all-or-nothing batch of inserts.
///
/// Dropping a transaction without committing discards its inserts.
#[async_trait]
pub trait EventTransaction: Send {
    async fn insert(&mut self, record: EventEnvelope) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn abort(self: Box<Self>) -> Result<()>;
}
