//! Query commands (list, filter, next, search, stats, graph, show, check)
//!
//! All of these read the document fresh and never write it.

use anyhow::{bail, Result};

use super::output::Output;
use crate::domain::{NodeState, Task, TaskId};
use crate::engine::{Engine, Outcome};
use crate::query::{Criteria, Filter, GroupBy, Preset};
use crate::render::VisualFormat;

fn print_tasks(output: &Output, outcome: &Outcome<Vec<Task>>, title: &str, empty: &str) {
    output.diagnostics(&outcome.diagnostics);

    if output.is_json() {
        output.data(outcome);
        return;
    }

    let tasks = &outcome.value;
    if tasks.is_empty() {
        println!("{}", empty);
        return;
    }

    println!("{} ({}):", title, tasks.len());
    println!("{:<10} {:<10} {:<8} DESCRIPTION", "ID", "STATUS", "PRIORITY");
    println!("{}", "-".repeat(70));
    for task in tasks {
        println!(
            "{:<10} {:<10} {:<8} {}",
            task.id.as_str(),
            task.status.as_str(),
            task.priority.as_str(),
            task.description
        );
    }
}

/// Show every task
pub fn list(engine: &Engine, output: &Output) -> Result<()> {
    let outcome = engine.list()?;
    print_tasks(output, &outcome, "Tasks", "No tasks found.");
    Ok(())
}

/// Show tasks matching a preset or criteria
pub fn filter(
    engine: &Engine,
    output: &Output,
    preset: Option<Preset>,
    criteria: Criteria,
) -> Result<()> {
    let filter = match (preset, criteria.is_empty()) {
        (Some(_), false) => bail!("Use either a preset or filter options, not both"),
        (Some(preset), true) => Filter::Preset(preset),
        (None, _) => Filter::Criteria(criteria),
    };

    let outcome = engine.filter(&filter)?;
    print_tasks(output, &outcome, "Matching tasks", "No tasks match.");
    Ok(())
}

/// Show ready tasks, most urgent first
pub fn next(engine: &Engine, output: &Output) -> Result<()> {
    let outcome = engine.next()?;
    print_tasks(output, &outcome, "Ready tasks", "No tasks ready to work on.");
    Ok(())
}

/// Ranked search
pub fn search(engine: &Engine, output: &Output, text: &str, limit: Option<usize>) -> Result<()> {
    let outcome = engine.search(text, limit)?;
    output.diagnostics(&outcome.diagnostics);

    if output.is_json() {
        output.data(&outcome);
        return Ok(());
    }

    let results = &outcome.value;
    if results.is_empty() {
        println!("No results found for '{}'", text);
        return Ok(());
    }

    println!("Search results for '{}':", text);
    println!("{:<10} {:<10} {:>8} DESCRIPTION", "ID", "MATCH", "DISTANCE");
    println!("{}", "-".repeat(70));
    for result in results {
        let kind = match result.kind {
            crate::query::MatchKind::Substring => "substring",
            crate::query::MatchKind::Fuzzy => "fuzzy",
        };
        println!(
            "{:<10} {:<10} {:>8.3} {}",
            result.task.id.as_str(),
            kind,
            result.distance,
            result.task.description
        );
    }
    println!();
    println!("Found {} result(s)", results.len());
    Ok(())
}

/// Completion statistics
pub fn stats(engine: &Engine, output: &Output, group_by: &[GroupBy], charts: bool) -> Result<()> {
    let outcome = engine.stats(group_by, charts)?;
    output.diagnostics(&outcome.diagnostics);

    if output.is_json() {
        output.data(&outcome);
        return Ok(());
    }

    let report = &outcome.value;
    println!("Task Statistics");
    println!("===============");
    println!();
    println!(
        "Tasks:     {} total, {} completed, {} pending ({:.1}% complete)",
        report.total, report.completed, report.pending, report.completion_percent
    );
    println!("Ready:     {}", report.ready);
    println!("Blocked:   {}", report.blocked);
    println!(
        "Effort:    {} remaining of {}",
        report.remaining_effort, report.total_effort
    );
    if !report.critical_path.is_empty() {
        let ids: Vec<&str> = report.critical_path.iter().map(TaskId::as_str).collect();
        println!("Critical:  {}", ids.join(" -> "));
    }
    if report.cycles > 0 {
        println!("Cycles:    {}", report.cycles);
    }

    for grouping in &report.groups {
        println!();
        println!("By {}:", grouping.field);
        for count in &grouping.counts {
            println!(
                "  {:<16} {} total, {} completed",
                count.key, count.total, count.completed
            );
        }
    }

    if let Some(chart) = &report.chart {
        println!();
        print!("{}", chart);
    }
    Ok(())
}

/// Render the dependency graph
pub fn graph(engine: &Engine, output: &Output, format: VisualFormat) -> Result<()> {
    let outcome = engine.visualize(format)?;
    output.diagnostics(&outcome.diagnostics);

    if output.is_json() {
        output.data(&serde_json::json!({
            "format": format,
            "value": outcome.value,
            "diagnostics": outcome.diagnostics,
        }));
    } else {
        print!("{}", outcome.value);
    }
    Ok(())
}

/// Show one task with its graph context
pub fn show(engine: &Engine, output: &Output, id: &TaskId) -> Result<()> {
    let outcome = engine.show(id)?;
    output.diagnostics(&outcome.diagnostics);

    if output.is_json() {
        output.data(&outcome);
        return Ok(());
    }

    let detail = &outcome.value;
    let task = &detail.task;
    let join = |ids: &[TaskId]| {
        if ids.is_empty() {
            "-".to_string()
        } else {
            ids.iter().map(TaskId::as_str).collect::<Vec<_>>().join(", ")
        }
    };

    println!("{} {}", task.id, task.description);
    println!();
    println!("Status:      {}", task.status);
    let state = match detail.state {
        NodeState::Completed => "completed",
        NodeState::Ready => "ready",
        NodeState::Blocked => "blocked",
    };
    println!(
        "State:       {}{}",
        state,
        if detail.in_cycle { " (in a dependency cycle)" } else { "" }
    );
    println!("Priority:    {}", task.priority);
    println!("Effort:      {}", task.effort);
    if let Some(phase) = &task.phase {
        println!("Phase:       {}", phase);
    }
    if let Some(task_type) = &task.task_type {
        println!("Type:        {}", task_type);
    }
    if !task.tags.is_empty() {
        println!("Tags:        {}", task.tags.join(", "));
    }
    println!("Depends on:  {}", join(&task.depends_on));
    println!("Blocked by:  {}", join(&detail.blockers));
    println!("Dependents:  {}", join(&detail.dependents));
    if let Some(depth) = detail.depth {
        println!("Depth:       {}", depth);
    }
    println!("Line:        {}", task.line);
    Ok(())
}

/// Validate the document's structure
pub fn check(engine: &Engine, output: &Output, strict: bool) -> Result<()> {
    let outcome = engine.check()?;
    let diagnostics = &outcome.diagnostics;

    if output.is_json() {
        output.data(&outcome);
    } else {
        output.diagnostics(diagnostics);
        let summary = &outcome.value;
        println!(
            "{} ready, {} blocked, {} warning(s), {} cycle(s), {} dangling dependenc{}",
            summary.ready.len(),
            summary.blocked.len(),
            diagnostics.warnings.len(),
            diagnostics.cycles.len(),
            diagnostics.unresolved.len(),
            if diagnostics.unresolved.len() == 1 { "y" } else { "ies" },
        );
    }

    if strict && !diagnostics.is_empty() {
        bail!("Check failed: the task document has problems");
    }
    Ok(())
}
