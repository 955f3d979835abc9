//! # Storage Layer
//!
//! File access for tick. The task document is the only system of record;
//! nothing parsed from it is cached between operations.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | Markdown checklist | `tasks.md` (configurable) |
//! | Project config | TOML | `.tick.toml` in the project or a parent |
//! | Global config | TOML | `<config dir>/tick/config.toml` |
//!
//! ## Write Safety
//!
//! - [`DocumentStore`] writes a temp file under an `fs2` exclusive lock,
//!   then renames it over the document
//! - Concurrent writers are not arbitrated: the last rename wins
//!
//! ## Key Types
//!
//! - [`DocumentStore`] - Read and atomically replace the task document
//! - [`Config`] - Merged global and project configuration

mod config;
mod document;

pub use config::{
    Config, ConfigError, RenderConfig, SearchConfig, StatsConfig, DEFAULT_DOCUMENT,
    PROJECT_CONFIG_FILE,
};
pub use document::{DocumentStore, StorageError};
