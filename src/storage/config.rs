//! Configuration handling for tick
//!
//! Settings come from built-in defaults, then the global
//! `<config dir>/tick/config.toml`, then the nearest `.tick.toml` in the
//! current directory or a parent. Later sources override earlier ones key
//! by key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::query::search::DEFAULT_LIMIT;
use crate::query::stats::DEFAULT_CHART_WIDTH;
use crate::query::SearchOptions;
use crate::render::{RenderOptions, DEFAULT_LABEL_WIDTH};

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = ".tick.toml";

/// Document path used when none is configured
pub const DEFAULT_DOCUMENT: &str = "tasks.md";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse configuration {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// `[search]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results returned when no limit is given
    pub limit: usize,

    /// Fuzzy results scoring above this are dropped
    pub max_distance: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            max_distance: None,
        }
    }
}

/// `[render]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum description length in graph labels
    pub label_width: usize,

    pub highlight_critical_path: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            label_width: DEFAULT_LABEL_WIDTH,
            highlight_critical_path: true,
        }
    }
}

/// `[stats]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Bar width in characters
    pub chart_width: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task document path; relative paths resolve against `base_dir`
    pub document: PathBuf,

    pub search: SearchConfig,

    pub render: RenderConfig,

    pub stats: StatsConfig,

    /// Directory holding the project config, or the starting directory
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: PathBuf::from(DEFAULT_DOCUMENT),
            search: SearchConfig::default(),
            render: RenderConfig::default(),
            stats: StatsConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Loads configuration for the current directory
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(&cwd, Self::global_config_path().as_deref())
    }

    /// Loads configuration starting the project search at `start`
    ///
    /// `global` is the global config file to read, if any. Missing files
    /// are skipped; unreadable or invalid ones are errors.
    pub fn load_from(start: &Path, global: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = toml::Table::new();

        if let Some(path) = global.filter(|p| p.is_file()) {
            debug!(path = %path.display(), "loading global config");
            merge(&mut merged, read_table(path)?);
        }

        let project = Self::find_project_config(start);
        if let Some(path) = &project {
            debug!(path = %path.display(), "loading project config");
            merge(&mut merged, read_table(path)?);
        }

        let origin = project
            .as_deref()
            .or(global)
            .unwrap_or(start)
            .to_path_buf();
        let mut config: Config = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: origin,
                message: e.message().to_string(),
            })?;

        config.base_dir = project
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(start)
            .to_path_buf();
        Ok(config)
    }

    /// Returns the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tick").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Finds `.tick.toml` in `start` or the nearest parent
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// The configured document path, resolved against `base_dir`
    pub fn document_path(&self) -> PathBuf {
        if self.document.is_absolute() {
            self.document.clone()
        } else {
            self.base_dir.join(&self.document)
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.search.limit,
            max_distance: self.search.max_distance,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            label_width: self.render.label_width,
            highlight_critical_path: self.render.highlight_critical_path,
        }
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Overlays `overlay` onto `base`, recursing into tables
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let toml::Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge(existing, incoming);
            continue;
        }
        base.insert(key, toml::Value::Table(incoming));
    }
}
