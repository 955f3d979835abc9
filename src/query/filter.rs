//! Task filtering: named presets and AND-composed criteria

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::{DependencyGraph, Priority, Task, TaskStatus};

/// Tags and types that mark cleanup work
pub const CLEANUP_VOCABULARY: &[&str] = &[
    "cleanup",
    "refactor",
    "refactoring",
    "tech-debt",
    "techdebt",
    "chore",
    "polish",
    "lint",
];

/// A named filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Ready tasks, most urgent and cheapest first
    Next,
    /// Same selection and order as `Next`
    Ready,
    /// Pending tasks that are not ready
    Blocked,
    Frontend,
    Backend,
    /// Tasks tagged or typed with the cleanup vocabulary
    Cleanup,
    Pending,
    Completed,
    All,
}

impl Preset {
    pub const ALL: [Preset; 9] = [
        Preset::Next,
        Preset::Ready,
        Preset::Blocked,
        Preset::Frontend,
        Preset::Backend,
        Preset::Cleanup,
        Preset::Pending,
        Preset::Completed,
        Preset::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Next => "next",
            Preset::Ready => "ready",
            Preset::Blocked => "blocked",
            Preset::Frontend => "frontend",
            Preset::Backend => "backend",
            Preset::Cleanup => "cleanup",
            Preset::Pending => "pending",
            Preset::Completed => "completed",
            Preset::All => "all",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Preset::ALL.iter().map(Preset::as_str).collect();
                format!("unknown preset '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Custom filter; every field that is set must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Criteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl Criteria {
    /// Returns true if no field is set (matches everything)
    pub fn is_empty(&self) -> bool {
        self.phase.is_none()
            && self.task_type.is_none()
            && self.status.is_none()
            && self.tag.is_none()
            && self.priority.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.phase.as_deref().map_or(true, |p| task.is_phase(p))
            && self.task_type.as_deref().map_or(true, |t| task.is_type(t))
            && self.status.map_or(true, |s| task.status == s)
            && self.tag.as_deref().map_or(true, |t| task.has_tag(t))
            && self.priority.map_or(true, |p| task.priority == p)
    }
}

/// Either a preset or custom criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Preset(Preset),
    Criteria(Criteria),
}

impl From<Preset> for Filter {
    fn from(preset: Preset) -> Self {
        Filter::Preset(preset)
    }
}

impl From<Criteria> for Filter {
    fn from(criteria: Criteria) -> Self {
        Filter::Criteria(criteria)
    }
}

fn is_cleanup(task: &Task) -> bool {
    CLEANUP_VOCABULARY
        .iter()
        .any(|word| task.has_tag(word) || task.is_type(word))
}

/// Applies a filter to the graph's tasks
///
/// `next`/`ready` order by priority (high first), then effort (smallest
/// first), then position. Everything else keeps document order.
pub fn filter<'g>(graph: &'g DependencyGraph, filter: &Filter) -> Vec<&'g Task> {
    let tasks = graph.tasks().iter();

    match filter {
        Filter::Preset(Preset::Next | Preset::Ready) => {
            let mut ready: Vec<&Task> = graph.ready_tasks().collect();
            ready.sort_by_key(|t| (t.priority.rank(), t.effort, t.position));
            ready
        }
        Filter::Preset(Preset::Blocked) => graph.blocked_tasks().collect(),
        Filter::Preset(Preset::Frontend) => tasks.filter(|t| t.is_type("frontend")).collect(),
        Filter::Preset(Preset::Backend) => tasks.filter(|t| t.is_type("backend")).collect(),
        Filter::Preset(Preset::Cleanup) => tasks.filter(|t| is_cleanup(t)).collect(),
        Filter::Preset(Preset::Pending) => tasks.filter(|t| t.status.is_pending()).collect(),
        Filter::Preset(Preset::Completed) => tasks.filter(|t| t.status.is_complete()).collect(),
        Filter::Preset(Preset::All) => tasks.collect(),
        Filter::Criteria(criteria) => tasks.filter(|t| criteria.matches(t)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskDocument;

    fn graph(text: &str) -> DependencyGraph {
        DependencyGraph::from_tasks(TaskDocument::parse(text).task_list())
    }

    fn ids(tasks: Vec<&Task>) -> Vec<String> {
        tasks.into_iter().map(|t| t.id.to_string()).collect()
    }

    const DOC: &str = "\
- [ ] T001 Scaffold app (phase: setup, type: devops, effort: 3)
- [ ] T002 Login page (phase: ui, type: frontend, depends: T001)
- [ ] T003 Auth API (type: backend, priority: high, effort: 5)
- [ ] T004 Token refresh (type: Backend, priority: high, effort: 2)
- [x] T005 Remove dead code (tags: cleanup)
- [ ] T006 Rename modules (type: refactor, priority: low)
- [ ] T007 Docs (priority: low, effort: 1)
";

    #[test]
    fn next_orders_by_priority_effort_position() {
        let g = graph(DOC);
        assert_eq!(
            ids(filter(&g, &Preset::Next.into())),
            vec!["T004", "T003", "T001", "T007", "T006"]
        );
        assert_eq!(
            filter(&g, &Preset::Ready.into()),
            filter(&g, &Preset::Next.into())
        );
    }

    #[test]
    fn next_scenario_single_chain() {
        let g = graph("- [ ] T001 First\n- [ ] T002 Second (depends: T001)\n");
        assert_eq!(ids(filter(&g, &Preset::Next.into())), vec!["T001"]);

        let g = graph("- [x] T001 First\n- [ ] T002 Second (depends: T001)\n");
        assert_eq!(ids(filter(&g, &Preset::Next.into())), vec!["T002"]);
    }

    #[test]
    fn type_presets_are_case_insensitive() {
        let g = graph(DOC);
        assert_eq!(ids(filter(&g, &Preset::Frontend.into())), vec!["T002"]);
        assert_eq!(ids(filter(&g, &Preset::Backend.into())), vec!["T003", "T004"]);
    }

    #[test]
    fn cleanup_matches_tags_and_types() {
        let g = graph(DOC);
        assert_eq!(ids(filter(&g, &Preset::Cleanup.into())), vec!["T005", "T006"]);
    }

    #[test]
    fn status_presets() {
        let g = graph(DOC);
        assert_eq!(ids(filter(&g, &Preset::Blocked.into())), vec!["T002"]);
        assert_eq!(ids(filter(&g, &Preset::Completed.into())), vec!["T005"]);
        assert_eq!(filter(&g, &Preset::Pending.into()).len(), 6);
        assert_eq!(filter(&g, &Preset::All.into()).len(), 7);
    }

    #[test]
    fn criteria_compose_with_and() {
        let g = graph(DOC);
        let criteria = Criteria {
            task_type: Some("backend".to_string()),
            priority: Some(Priority::High),
            ..Criteria::default()
        };
        assert_eq!(ids(filter(&g, &criteria.into())), vec!["T003", "T004"]);

        let criteria = Criteria {
            phase: Some("SETUP".to_string()),
            status: Some(TaskStatus::Pending),
            ..Criteria::default()
        };
        assert_eq!(ids(filter(&g, &criteria.into())), vec!["T001"]);

        let criteria = Criteria {
            tag: Some("cleanup".to_string()),
            status: Some(TaskStatus::Pending),
            ..Criteria::default()
        };
        assert!(filter(&g, &criteria.into()).is_empty());
    }

    #[test]
    fn empty_criteria_match_everything() {
        let g = graph(DOC);
        let criteria = Criteria::default();
        assert!(criteria.is_empty());
        assert_eq!(filter(&g, &criteria.into()).len(), 7);
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!("NEXT".parse::<Preset>().unwrap(), Preset::Next);
        assert_eq!("cleanup".parse::<Preset>().unwrap(), Preset::Cleanup);
        let err = "soon".parse::<Preset>().unwrap_err();
        assert!(err.contains("expected one of"));
    }
}
