//! Runner error types.

use domain::DispatchError;
use event_store::EventStoreError;
use thiserror::Error;

/// Failures that stop the runner. Rejected commands are not errors here;
/// they are reported as outcomes and processing continues.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event store error: {0}")]
    Store(#[from] EventStoreError),

    #[error("Dispatcher setup failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
