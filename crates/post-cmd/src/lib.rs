//! Command-side runner for the post service.
//!
//! Reads one JSON-encoded [`PostCommand`] per line, dispatches it and writes
//! one JSON [`Outcome`] per line.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::RunError;

use domain::{Command, CommandDispatcher, DomainError, DomainEvent, PostCommand};
use event_store::{AggregateId, Version};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Why a command was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The line was not a valid command.
    Malformed,
    Validation,
    /// Another writer appended first; reload and retry.
    Conflict,
    NotFound,
    Persistence,
    /// Configuration or data fault; retrying will not help.
    Fault,
}

impl From<&DomainError> for RejectReason {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::Validation(_) => RejectReason::Validation,
            e if e.is_concurrency_conflict() => RejectReason::Conflict,
            e if e.is_not_found() => RejectReason::NotFound,
            e if e.is_fault() => RejectReason::Fault,
            _ => RejectReason::Persistence,
        }
    }
}

/// Result of one input line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Accepted {
        post_id: AggregateId,
        version: Version,
        events: Vec<&'static str>,
    },
    Rejected {
        reason: RejectReason,
        error: String,
    },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }
}

/// Counts of processed lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Parses and dispatches a single line.
pub async fn process_line(dispatcher: &CommandDispatcher<PostCommand>, line: &str) -> Outcome {
    let command: PostCommand = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(error = %e, "malformed command");
            return Outcome::Rejected {
                reason: RejectReason::Malformed,
                error: e.to_string(),
            };
        }
    };

    let post_id = command.aggregate_id();
    match dispatcher.dispatch(command).await {
        Ok(result) => Outcome::Accepted {
            post_id,
            version: result.new_version,
            events: result.events.iter().map(DomainEvent::event_type).collect(),
        },
        Err(e) => Outcome::Rejected {
            reason: RejectReason::from(&e),
            error: e.to_string(),
        },
    }
}

/// Processes every non-blank line of `input`, writing one outcome per line
/// to `output`.
pub async fn process<R, W>(
    dispatcher: &CommandDispatcher<PostCommand>,
    input: R,
    mut output: W,
) -> Result<Summary, RunError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut summary = Summary::default();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = process_line(dispatcher, line).await;
        if outcome.is_accepted() {
            summary.accepted += 1;
        } else {
            summary.rejected += 1;
        }

        let mut encoded = serde_json::to_vec(&outcome)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
    }

    output.flush().await?;
    Ok(summary)
}
