//! Read-only queries over a dependency graph

pub mod filter;
pub mod search;
pub mod stats;

pub use filter::{filter, Criteria, Filter, Preset, CLEANUP_VOCABULARY};
pub use search::{levenshtein, normalized_distance, search, MatchKind, RankedTask, SearchOptions};
pub use stats::{render_chart, stats, GroupBy, GroupCount, Grouping, StatsOptions, StatsReport};
