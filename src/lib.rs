//! tick - dependency-aware task checklists kept in a markdown document
//!
//! A task document is an ordinary markdown file whose checklist lines carry
//! an ID and an optional `(key: value, ...)` metadata block:
//!
//! ```text
//! - [ ] T002 Implement authentication flow (phase: build, depends: T001, effort: 3)
//! ```
//!
//! Every operation re-reads the document, builds a dependency graph over
//! its tasks and answers from that. Status changes rewrite only the
//! affected checkbox markers; every other byte of the document is kept.

pub mod domain;
pub mod query;
pub mod render;
pub mod storage;
pub mod engine;
pub mod cli;

pub use domain::{DependencyGraph, Task, TaskDocument, TaskId, TaskStatus};
pub use engine::{Engine, EngineError, Outcome};
