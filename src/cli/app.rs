//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{query, task};
use crate::domain::{Priority, TaskId, TaskStatus};
use crate::engine::Engine;
use crate::query::{GroupBy, Preset};
use crate::render::VisualFormat;
use crate::storage::{Config, DocumentStore};

#[derive(Parser)]
#[command(name = "tick")]
#[command(author, version, about = "Dependency-aware markdown task checklists")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Task document (defaults to the configured document, then tasks.md)
    #[arg(long, short = 'F', global = true, env = "TICK_FILE")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all tasks in document order
    List,

    /// Filter tasks by preset or by criteria
    ///
    /// Examples:
    ///   tick filter cleanup
    ///   tick filter --phase setup --status pending
    Filter {
        /// Preset: next, ready, blocked, frontend, backend, cleanup, pending, completed, all
        preset: Option<Preset>,

        #[arg(long)]
        phase: Option<String>,

        #[arg(long = "type")]
        task_type: Option<String>,

        #[arg(long)]
        status: Option<TaskStatus>,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        priority: Option<Priority>,
    },

    /// Show tasks ready to work on, most urgent first
    Next,

    /// Search descriptions and tags, tolerating typos
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show completion statistics
    Stats {
        /// Group counts by fields (phase, type, priority, status)
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<GroupBy>,

        /// Include text bar charts
        #[arg(long)]
        charts: bool,
    },

    /// Render the dependency graph (mermaid, dot or ascii)
    Graph {
        #[arg(value_name = "FORMAT", default_value = "mermaid")]
        kind: VisualFormat,
    },

    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Report warnings, cycles and dangling dependencies
    Check {
        /// Fail if anything is reported
        #[arg(long)]
        strict: bool,
    },

    /// Mark a task as completed
    Tick {
        /// Task ID
        id: TaskId,
    },

    /// Mark a task as pending again
    Untick {
        /// Task ID
        id: TaskId,
    },

    /// Mark a list or range of tasks as completed
    ///
    /// Examples:
    ///   tick tick-range T001-T005
    ///   tick tick-range T001,T003 T007
    TickRange {
        /// IDs and ranges, separated by commas or spaces
        #[arg(required = true, num_args = 1..)]
        targets: Vec<String>,
    },
}

/// Installs the stderr log subscriber; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn open_engine(file: Option<PathBuf>) -> Result<Engine> {
    let config = Config::load().context("Failed to load configuration")?;

    let engine = match file {
        Some(path) => Engine::new(DocumentStore::new(path), config),
        None => Engine::from_config(config),
    };
    debug!(document = %engine.store().path().display(), "using task document");
    Ok(engine)
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = Output::new(cli.format);
    let engine = open_engine(cli.file)?;

    match cli.command {
        Commands::List => query::list(&engine, &output)?,
        Commands::Filter {
            preset,
            phase,
            task_type,
            status,
            tag,
            priority,
        } => {
            let criteria = crate::query::Criteria {
                phase,
                task_type,
                status,
                tag,
                priority,
            };
            query::filter(&engine, &output, preset, criteria)?
        }
        Commands::Next => query::next(&engine, &output)?,
        Commands::Search { query: text, limit } => query::search(&engine, &output, &text, limit)?,
        Commands::Stats { group_by, charts } => query::stats(&engine, &output, &group_by, charts)?,
        Commands::Graph { kind } => query::graph(&engine, &output, kind)?,
        Commands::Show { id } => query::show(&engine, &output, &id)?,
        Commands::Check { strict } => query::check(&engine, &output, strict)?,

        Commands::Tick { id } => task::tick(&engine, &output, &id)?,
        Commands::Untick { id } => task::untick(&engine, &output, &id)?,
        Commands::TickRange { targets } => task::tick_range(&engine, &output, &targets.join(","))?,
    }

    Ok(())
}
