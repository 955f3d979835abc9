//! Output formatting for CLI commands

use serde::Serialize;

use crate::engine::Diagnostics;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints parse warnings, cycles and dangling dependencies to stderr
    ///
    /// JSON output already carries them, so this is text only.
    pub fn diagnostics(&self, diagnostics: &Diagnostics) {
        if self.is_json() {
            return;
        }
        for warning in &diagnostics.warnings {
            eprintln!("warning: {}", warning);
        }
        for cycle in &diagnostics.cycles {
            let ids: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
            if let Some(first) = ids.first() {
                eprintln!("warning: dependency cycle: {} -> {}", ids.join(" -> "), first);
            }
        }
        for (task, dep) in &diagnostics.unresolved {
            eprintln!("warning: {} depends on unknown task {}", task, dep);
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
