//! Mutation commands (tick, untick, tick-range)

use anyhow::{bail, Result};

use super::output::Output;
use crate::domain::{ItemOutcome, TaskId, TickOutcome};
use crate::engine::Engine;

/// Mark a task completed
pub fn tick(engine: &Engine, output: &Output, id: &TaskId) -> Result<()> {
    let outcome = engine.tick(id)?;
    output.diagnostics(&outcome.diagnostics);

    if output.is_json() {
        output.data(&outcome);
    } else {
        match outcome.value {
            TickOutcome::Changed => output.success(&format!("Ticked {}", id)),
            TickOutcome::Unchanged => output.success(&format!("{} is already completed", id)),
        }
    }
    Ok(())
}

/// Mark a task pending again
pub fn untick(engine: &Engine, output: &Output, id: &TaskId) -> Result<()> {
    let outcome = engine.untick(id)?;
    output.diagnostics(&outcome.diagnostics);

    if output.is_json() {
        output.data(&outcome);
    } else {
        match outcome.value {
            TickOutcome::Changed => output.success(&format!("Reopened {}", id)),
            TickOutcome::Unchanged => output.success(&format!("{} is already pending", id)),
        }
    }
    Ok(())
}

/// Tick a list or range of tasks
///
/// Missing IDs are reported per item. The command only fails when no ID in
/// the target exists.
pub fn tick_range(engine: &Engine, output: &Output, spec: &str) -> Result<()> {
    let outcome = engine.tick_range(spec)?;
    output.diagnostics(&outcome.diagnostics);
    let batch = &outcome.value;

    if output.is_json() {
        output.data(&outcome);
    } else {
        for item in &batch.results {
            match &item.outcome {
                ItemOutcome::Changed => println!("  {:<10} ticked", item.id.as_str()),
                ItemOutcome::Unchanged => println!("  {:<10} already completed", item.id.as_str()),
                ItemOutcome::Failed { error } => println!("  {:<10} failed: {}", item.id.as_str(), error),
            }
        }
        println!(
            "Ticked {}, {} already completed, {} failed",
            batch.changed(),
            batch.unchanged(),
            batch.failed()
        );
    }

    if !batch.results.is_empty() && batch.failed() == batch.results.len() {
        bail!("None of the tasks in '{}' exist", spec);
    }
    Ok(())
}
