//! Domain error types.

use event_store::{EventStoreError, Version};
use thiserror::Error;

use crate::command::DispatchError;
use crate::post::PostError;

/// Errors that can occur while handling a command.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The command broke a business rule. Nothing was raised or written.
    #[error("Validation error: {0}")]
    Validation(#[from] PostError),

    /// An error occurred in the event store, including concurrency conflicts.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// No handler, or more than one, for a command kind.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A stored event could not be mapped onto the aggregate's event set.
    ///
    /// The stream and the code disagree; this is not recoverable by retrying.
    #[error("Unknown event {event_type} at version {version} in {aggregate_type} stream: {source}")]
    UnknownEvent {
        aggregate_type: &'static str,
        event_type: String,
        version: Version,
        source: serde_json::Error,
    },

    /// Pending events exist on an aggregate that was never created.
    #[error("{aggregate_type} has pending events but no id")]
    Uninitialized { aggregate_type: &'static str },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// True when the command was rejected by a business rule.
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }

    /// True when the append lost against another writer; reload and retry.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. })
        )
    }

    /// True when the command targeted an aggregate without history.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::EventStore(EventStoreError::AggregateNotFound(_))
        )
    }

    /// True for programming or configuration faults rather than rejected input.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            DomainError::Dispatch(_)
                | DomainError::UnknownEvent { .. }
                | DomainError::Uninitialized { .. }
        )
    }
}
