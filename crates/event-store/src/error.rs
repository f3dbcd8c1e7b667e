use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The expected version did not match the stream's last version.
    /// Nothing was written.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The aggregate has no persisted events.
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(AggregateId),

    /// A record with this aggregate id and version is already stored.
    ///
    /// Raised by repositories; the event log store reports it to its callers
    /// as a `ConcurrencyConflict`.
    #[error("Version {version} already exists for aggregate {aggregate_id}")]
    VersionAlreadyExists {
        aggregate_id: AggregateId,
        version: Version,
    },

    /// The events handed to `append` cannot form a valid batch.
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    /// The underlying transaction was aborted.
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventStoreError {
    /// True for failures of the underlying store rather than of the
    /// concurrency check or the request itself.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            EventStoreError::TransactionAborted(_)
                | EventStoreError::Database(_)
                | EventStoreError::Migration(_)
                | EventStoreError::Serialization(_)
        )
    }
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
