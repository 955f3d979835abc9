//! Status mutations on a parsed document
//!
//! `tick` is strict about existence and idempotent about state. Batches
//! isolate per-item failures: a missing ID is recorded and the remaining
//! IDs are still ticked.

use serde::Serialize;
use thiserror::Error;

use super::document::TaskDocument;
use super::id::TaskId;
use super::range::TickTarget;
use super::task::TaskStatus;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),
}

/// Result of a single successful status change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOutcome {
    /// The marker was flipped
    Changed,
    /// The task already had the requested status
    Unchanged,
}

/// Per-ID outcome within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub id: TaskId,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ItemOutcome {
    Changed,
    Unchanged,
    Failed { error: String },
}

/// Outcome of a batch tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<ItemResult>,
}

impl BatchOutcome {
    /// Number of markers flipped
    pub fn changed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Changed))
    }

    /// Number of IDs that were already completed
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Unchanged))
    }

    /// Number of IDs that could not be ticked
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed { .. }))
    }

    /// True if some but not all IDs failed
    pub fn is_partial(&self) -> bool {
        let failed = self.failed();
        failed > 0 && failed < self.results.len()
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Sets one task's status
pub fn set_status(
    doc: &mut TaskDocument,
    id: &TaskId,
    status: TaskStatus,
) -> Result<TickOutcome, MutationError> {
    match doc.set_status(id, status) {
        Some(true) => Ok(TickOutcome::Changed),
        Some(false) => Ok(TickOutcome::Unchanged),
        None => Err(MutationError::NotFound(id.clone())),
    }
}

/// Marks one task completed
pub fn tick(doc: &mut TaskDocument, id: &TaskId) -> Result<TickOutcome, MutationError> {
    set_status(doc, id, TaskStatus::Completed)
}

/// Marks one task pending again
pub fn untick(doc: &mut TaskDocument, id: &TaskId) -> Result<TickOutcome, MutationError> {
    set_status(doc, id, TaskStatus::Pending)
}

/// Marks every ID of the target completed, recording each outcome
pub fn tick_all(doc: &mut TaskDocument, target: &TickTarget) -> BatchOutcome {
    let results = target
        .ids()
        .into_iter()
        .map(|id| {
            let outcome = match tick(doc, &id) {
                Ok(TickOutcome::Changed) => ItemOutcome::Changed,
                Ok(TickOutcome::Unchanged) => ItemOutcome::Unchanged,
                Err(e) => ItemOutcome::Failed {
                    error: e.to_string(),
                },
            };
            ItemResult { id, outcome }
        })
        .collect();

    BatchOutcome { results }
}
