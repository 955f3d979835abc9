//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Query | Read the document | `list`, `filter`, `next`, `search`, `stats`, `show` |
//! | Graph | Structure and visualization | `graph`, `check` |
//! | Mutation | Flip checkbox markers | `tick`, `untick`, `tick-range` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON, including diagnostics
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr:
//! ```bash
//! tick --verbose next
//! ```
//!
//! `RUST_LOG` overrides the level chosen by `--verbose`.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod query;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
