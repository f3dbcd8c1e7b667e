use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventLogStore, EventStoreError, Result,
    repository::{EventRepository, EventTransaction},
};

/// In-memory event repository for tests and local runs.
///
/// Records live in a shared vector; cloning the repository shares it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    records: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

impl EventLogStore<InMemoryEventRepository> {
    /// Creates an event log store over a fresh in-memory repository.
    pub fn in_memory() -> Self {
        Self::new(InMemoryEventRepository::new())
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_by_aggregate_id(&self, aggregate_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        let records = self.records.read().await;
        let mut events: Vec<_> = records
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn begin(&self) -> Result<Box<dyn EventTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            records: self.records.clone(),
            pending: Vec::new(),
        }))
    }
}

/// Buffers inserts until commit, then publishes them under one write lock.
struct InMemoryTransaction {
    records: Arc<RwLock<Vec<EventEnvelope>>>,
    pending: Vec<EventEnvelope>,
}

impl InMemoryTransaction {
    fn duplicate_in(existing: &[EventEnvelope], record: &EventEnvelope) -> bool {
        existing
            .iter()
            .any(|e| e.aggregate_id == record.aggregate_id && e.version == record.version)
    }
}

#[async_trait]
impl EventTransaction for InMemoryTransaction {
    async fn insert(&mut self, record: EventEnvelope) -> Result<()> {
        if Self::duplicate_in(&self.pending, &record) {
            return Err(EventStoreError::VersionAlreadyExists {
                aggregate_id: record.aggregate_id,
                version: record.version,
            });
        }
        self.pending.push(record);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction { records, pending } = *self;
        let mut records = records.write().await;

        // Unique (aggregate_id, version), checked under the same lock as the write.
        if let Some(clash) = pending
            .iter()
            .find(|record| Self::duplicate_in(&records, record))
        {
            return Err(EventStoreError::VersionAlreadyExists {
                aggregate_id: clash.aggregate_id,
                version: clash.version,
            });
        }

        records.extend(pending);
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UncommittedEvent, Version};

    fn record(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
        EventEnvelope::new(
            aggregate_id,
            "TestAggregate",
            Version::new(version),
            UncommittedEvent::new("TestEvent", serde_json::json!({"test": true})),
        )
    }

    #[tokio::test]
    async fn inserts_are_invisible_until_commit() {
        let repository = InMemoryEventRepository::new();
        let aggregate_id = AggregateId::new();

        let mut tx = repository.begin().await.unwrap();
        tx.insert(record(aggregate_id, 1)).await.unwrap();
        tx.insert(record(aggregate_id, 2)).await.unwrap();
        assert_eq!(repository.record_count().await, 0);

        tx.commit().await.unwrap();
        assert_eq!(repository.record_count().await, 2);
    }

    #[tokio::test]
    async fn abort_discards_inserts() {
        let repository = InMemoryEventRepository::new();
        let aggregate_id = AggregateId::new();

        let mut tx = repository.begin().await.unwrap();
        tx.insert(record(aggregate_id, 1)).await.unwrap();
        tx.abort().await.unwrap();

        assert!(
            repository
                .find_by_aggregate_id(aggregate_id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn commit_rejects_existing_version() {
        let repository = InMemoryEventRepository::new();
        let aggregate_id = AggregateId::new();

        let mut first = repository.begin().await.unwrap();
        let mut second = repository.begin().await.unwrap();
        first.insert(record(aggregate_id, 1)).await.unwrap();
        second.insert(record(aggregate_id, 1)).await.unwrap();
        second.insert(record(aggregate_id, 2)).await.unwrap();

        first.commit().await.unwrap();
        let result = second.commit().await;

        assert!(matches!(
            result,
            Err(EventStoreError::VersionAlreadyExists { version, .. }) if version == Version::first()
        ));
        assert_eq!(repository.record_count().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_within_transaction() {
        let repository = InMemoryEventRepository::new();
        let aggregate_id = AggregateId::new();

        let mut tx = repository.begin().await.unwrap();
        tx.insert(record(aggregate_id, 1)).await.unwrap();
        let result = tx.insert(record(aggregate_id, 1)).await;

        assert!(matches!(
            result,
            Err(EventStoreError::VersionAlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn find_returns_records_ordered_by_version() {
        let repository = InMemoryEventRepository::new();
        let aggregate_id = AggregateId::new();
        let other = AggregateId::new();

        let mut tx = repository.begin().await.unwrap();
        tx.insert(record(aggregate_id, 2)).await.unwrap();
        tx.insert(record(other, 1)).await.unwrap();
        tx.insert(record(aggregate_id, 1)).await.unwrap();
        tx.commit().await.unwrap();

        let found = repository.find_by_aggregate_id(aggregate_id).await.unwrap();
        let versions: Vec<i64> = found.iter().map(|e| e.version.as_i64()).collect();
        assert_eq!(versions, vec![1, 2]);
    }
}
