//! Completion statistics and text bar charts

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::{DependencyGraph, Priority, Task, TaskId};

/// Default bar width in characters
pub const DEFAULT_CHART_WIDTH: usize = 20;

/// Group key for tasks without a value for the field
pub const UNSPECIFIED: &str = "unspecified";

/// A field tasks can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Phase,
    Type,
    Priority,
    Status,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Phase => "phase",
            GroupBy::Type => "type",
            GroupBy::Priority => "priority",
            GroupBy::Status => "status",
        }
    }

    fn key(&self, task: &Task) -> String {
        match self {
            GroupBy::Phase => task.phase.clone().unwrap_or_else(|| UNSPECIFIED.to_string()),
            GroupBy::Type => task
                .task_type
                .clone()
                .unwrap_or_else(|| UNSPECIFIED.to_string()),
            GroupBy::Priority => task.priority.to_string(),
            GroupBy::Status => task.status.to_string(),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phase" => Ok(GroupBy::Phase),
            "type" | "kind" => Ok(GroupBy::Type),
            "priority" => Ok(GroupBy::Priority),
            "status" => Ok(GroupBy::Status),
            other => Err(format!(
                "unknown group '{other}' (expected phase, type, priority or status)"
            )),
        }
    }
}

/// Counts for one group value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub total: usize,
    pub completed: usize,
}

/// All group values for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouping {
    pub field: GroupBy,
    pub counts: Vec<GroupCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsOptions {
    pub group_by: Vec<GroupBy>,
    pub include_charts: bool,
    pub chart_width: usize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            group_by: Vec::new(),
            include_charts: false,
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

/// Aggregate counts over a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub ready: usize,
    pub blocked: usize,
    /// 0.0 for an empty document
    pub completion_percent: f64,
    pub total_effort: u64,
    pub remaining_effort: u64,
    pub groups: Vec<Grouping>,
    pub critical_path: Vec<TaskId>,
    pub cycles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
}

/// Computes statistics, optionally grouped and charted
pub fn stats(graph: &DependencyGraph, options: &StatsOptions) -> StatsReport {
    let tasks = graph.tasks();
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.status.is_complete()).count();

    let groups: Vec<Grouping> = options
        .group_by
        .iter()
        .map(|&field| group(tasks, field))
        .collect();

    let mut report = StatsReport {
        total,
        completed,
        pending: total - completed,
        ready: graph.ready_tasks().count(),
        blocked: graph.blocked_tasks().count(),
        completion_percent: percent(completed, total),
        total_effort: tasks.iter().map(|t| u64::from(t.effort)).sum(),
        remaining_effort: tasks
            .iter()
            .filter(|t| t.status.is_pending())
            .map(|t| u64::from(t.effort))
            .sum(),
        groups,
        critical_path: graph.critical_path(),
        cycles: graph.cycles().len(),
        chart: None,
    };

    if options.include_charts {
        report.chart = Some(render_chart(&report, options.chart_width));
    }
    report
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Groups in first-appearance order, except priority which is high to low
fn group(tasks: &[Task], field: GroupBy) -> Grouping {
    let mut counts: Vec<GroupCount> = Vec::new();

    if field == GroupBy::Priority {
        counts = Priority::ALL
            .iter()
            .map(|p| GroupCount {
                key: p.to_string(),
                total: 0,
                completed: 0,
            })
            .collect();
    }

    for task in tasks {
        let key = field.key(task);
        let idx = match counts.iter().position(|c| c.key == key) {
            Some(idx) => idx,
            None => {
                counts.push(GroupCount {
                    key,
                    total: 0,
                    completed: 0,
                });
                counts.len() - 1
            }
        };
        counts[idx].total += 1;
        if task.status.is_complete() {
            counts[idx].completed += 1;
        }
    }

    counts.retain(|c| c.total > 0);
    Grouping { field, counts }
}

fn bar(count: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (count as f64 / total as f64 * width as f64).round() as usize
    }
    .min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Renders the report as bar charts
///
/// The first bar is overall completion; each grouping then gets one bar per
/// value, proportional to that value's share of all tasks.
pub fn render_chart(report: &StatsReport, width: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Completion  {} {:.1}% ({}/{})\n",
        bar(report.completed, report.total, width),
        report.completion_percent,
        report.completed,
        report.total
    ));

    for grouping in &report.groups {
        let label_width = grouping
            .counts
            .iter()
            .map(|c| c.key.chars().count())
            .max()
            .unwrap_or(0);

        out.push_str(&format!("\nBy {}\n", grouping.field));
        for count in &grouping.counts {
            out.push_str(&format!(
                "  {:<label_width$} | {} {} ({:.0}%)\n",
                count.key,
                bar(count.total, report.total, width),
                count.total,
                percent(count.total, report.total),
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskDocument;

    fn graph(text: &str) -> DependencyGraph {
        DependencyGraph::from_tasks(TaskDocument::parse(text).task_list())
    }

    const DOC: &str = "\
- [x] T001 Scaffold (phase: setup, effort: 2)
- [ ] T002 Schema (phase: setup, priority: high, depends: T001, effort: 3)
- [ ] T003 API (phase: build, type: backend, depends: T002)
- [ ] T004 Docs (priority: low)
";

    #[test]
    fn counts_and_efforts() {
        let report = stats(&graph(DOC), &StatsOptions::default());
        assert_eq!(report.total, 4);
        assert_eq!(report.completed, 1);
        assert_eq!(report.pending, 3);
        assert_eq!(report.ready, 2);
        assert_eq!(report.blocked, 1);
        assert_eq!(report.completion_percent, 25.0);
        assert_eq!(report.total_effort, 7);
        assert_eq!(report.remaining_effort, 5);
        assert_eq!(report.cycles, 0);
        assert_eq!(report.critical_path.len(), 3);
        assert!(report.groups.is_empty());
        assert!(report.chart.is_none());
    }

    #[test]
    fn empty_document_is_zero_percent() {
        let report = stats(&graph(""), &StatsOptions::default());
        assert_eq!(report.total, 0);
        assert_eq!(report.completion_percent, 0.0);
    }

    #[test]
    fn groups_by_phase_in_appearance_order() {
        let options = StatsOptions {
            group_by: vec![GroupBy::Phase],
            ..StatsOptions::default()
        };
        let report = stats(&graph(DOC), &options);
        let counts = &report.groups[0].counts;

        let keys: Vec<_> = counts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["setup", "build", "unspecified"]);
        assert_eq!((counts[0].total, counts[0].completed), (2, 1));
    }

    #[test]
    fn groups_by_priority_high_to_low() {
        let options = StatsOptions {
            group_by: vec![GroupBy::Priority, GroupBy::Type],
            ..StatsOptions::default()
        };
        let report = stats(&graph(DOC), &options);

        let keys: Vec<_> = report.groups[0].counts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["high", "medium", "low"]);

        let keys: Vec<_> = report.groups[1].counts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["unspecified", "backend"]);
    }

    #[test]
    fn chart_lines() {
        let options = StatsOptions {
            group_by: vec![GroupBy::Status],
            include_charts: true,
            chart_width: 4,
        };
        let report = stats(&graph(DOC), &options);
        let chart = report.chart.unwrap();

        assert!(chart.starts_with("Completion  █░░░ 25.0% (1/4)\n"));
        assert!(chart.contains("\nBy status\n"));
        assert!(chart.contains("  completed | █░░░ 1 (25%)\n"));
        assert!(chart.contains("  pending   | ███░ 3 (75%)\n"));
    }

    #[test]
    fn group_names_parse() {
        assert_eq!("Phase".parse::<GroupBy>().unwrap(), GroupBy::Phase);
        assert_eq!("kind".parse::<GroupBy>().unwrap(), GroupBy::Type);
        assert!("owner".parse::<GroupBy>().is_err());
    }
}
