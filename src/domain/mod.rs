//! Domain models for tick
//!
//! Contains the document grammar and graph algorithms without any I/O
//! concerns. Every operation starts from [`TaskDocument::parse`].

mod id;
mod task;
mod metadata;
mod document;
mod graph;
mod range;
pub mod mutation;

pub use id::{IdError, TaskId};
pub use task::{Priority, Task, TaskStatus, DEFAULT_EFFORT};
pub use document::{Line, ParseWarning, TaskDocument, TaskLine, WarningKind};
pub use graph::{DependencyGraph, Edge, GraphSummary, NodeState};
pub use range::{RangeError, TickTarget, MAX_RANGE_LEN};
pub use mutation::{BatchOutcome, ItemOutcome, ItemResult, MutationError, TickOutcome};
