//! Task domain model
//!
//! A task is one checklist line of the task document. Everything except the
//! status comes from the line's trailing metadata block.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::TaskId;

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Returns true if this task is not yet done
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }

    /// The character written between the checkbox brackets
    pub fn marker(&self) -> char {
        match self {
            TaskStatus::Pending => ' ',
            TaskStatus::Completed => 'x',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "todo" | "open" => Ok(TaskStatus::Pending),
            "completed" | "complete" | "done" => Ok(TaskStatus::Completed),
            other => Err(format!(
                "unknown status '{other}' (expected pending or completed)"
            )),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// All priorities, most urgent first
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank: lower is more urgent
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!(
                "unknown priority '{other}' (expected high, medium or low)"
            )),
        }
    }
}

/// Default effort estimate when none is given
pub const DEFAULT_EFFORT: u32 = 1;

/// A task parsed from one checklist line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Free text between the ID and the metadata block
    pub description: String,

    /// Checkbox state
    pub status: TaskStatus,

    /// Workflow phase (setup, implementation, testing, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Work classification (frontend, backend, devops, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    /// IDs this task depends on, in declaration order, without duplicates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    #[serde(default)]
    pub priority: Priority,

    /// Effort estimate in arbitrary units
    pub effort: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Declaration order among the document's tasks (0-based)
    pub position: usize,

    /// 1-based line number in the document
    pub line: usize,
}

impl Task {
    /// Creates a pending task with default metadata
    pub fn new(id: TaskId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            status: TaskStatus::Pending,
            phase: None,
            task_type: None,
            depends_on: Vec::new(),
            priority: Priority::default(),
            effort: DEFAULT_EFFORT,
            tags: Vec::new(),
            position: 0,
            line: 0,
        }
    }

    /// Adds a dependency, ignoring duplicates
    pub fn add_dependency(&mut self, id: TaskId) -> bool {
        if self.depends_on.contains(&id) {
            false
        } else {
            self.depends_on.push(id);
            true
        }
    }

    /// Adds a tag, ignoring duplicates
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() || self.tags.contains(&tag) {
            false
        } else {
            self.tags.push(tag);
            true
        }
    }

    /// Case-insensitive tag check
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Case-insensitive type check
    pub fn is_type(&self, task_type: &str) -> bool {
        self.task_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(task_type))
    }

    /// Case-insensitive phase check
    pub fn is_phase(&self, phase: &str) -> bool {
        self.phase
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> TaskId {
        s.parse().unwrap()
    }

    #[test]
    fn new_task_defaults() {
        let task = Task::new(id("T001"), "Set up repo");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.effort, DEFAULT_EFFORT);
        assert!(task.depends_on.is_empty());
        assert!(task.tags.is_empty());
    }

    #[test]
    fn dependencies_are_deduplicated() {
        let mut task = Task::new(id("T002"), "Build API");
        assert!(task.add_dependency(id("T001")));
        assert!(!task.add_dependency(id("T001")));
        assert_eq!(task.depends_on, vec![id("T001")]);
    }

    #[test]
    fn tags_are_deduplicated_and_case_insensitive() {
        let mut task = Task::new(id("T003"), "Tidy");
        assert!(task.add_tag("Cleanup"));
        assert!(!task.add_tag("Cleanup"));
        assert!(!task.add_tag(""));
        assert!(task.has_tag("cleanup"));
    }

    #[test]
    fn status_parsing_and_markers() {
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert_eq!("Pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert!("blocked".parse::<TaskStatus>().is_err());
        assert_eq!(TaskStatus::Completed.marker(), 'x');
        assert_eq!(TaskStatus::Pending.marker(), ' ');
    }

    #[test]
    fn priority_parsing_and_rank() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn serializes_type_field_name() {
        let mut task = Task::new(id("T004"), "Deploy");
        task.task_type = Some("devops".to_string());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "devops");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["priority"], "medium");
    }
}
