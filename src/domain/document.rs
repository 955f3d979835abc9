//! Task document grammar
//!
//! A task document is markdown with checklist lines of the form:
//!
//! ```text
//! - [ ] T001 Set up repository (phase: setup, effort: 2)
//! - [x] T002 Write README (depends: T001, tags: docs)
//! ```
//!
//! Parsing turns every line into either a [`Line::Task`] or a
//! [`Line::Other`]. Both keep their raw text including the line terminator,
//! so rendering an unmodified document reproduces it byte-for-byte. Status
//! changes rewrite only the checkbox marker character.
//!
//! Parsing never fails: malformed metadata and duplicate IDs are reported
//! as [`ParseWarning`]s alongside a best-effort task list.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::id::TaskId;
use super::metadata::{self, Trailing};
use super::task::{Task, TaskStatus};

/// Checkbox line with an ID token: indent + bullet, `[`, marker, `]`, ID, rest
static TASK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*+]\s+\[([ xX])\]\s+([A-Za-z][A-Za-z0-9_-]*)[:.]?(?:\s+(.*?))?\s*$")
        .expect("task line pattern is valid")
});

/// Kind of problem found while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// The metadata block could not be parsed; the task keeps defaults
    MalformedMetadata { reason: String },
    /// An unrecognized key was kept as a `key:value` tag
    UnknownKey { key: String },
    /// A recognized key had a value that could not be used
    InvalidValue { key: String, value: String },
    /// The ID was already declared earlier; this line is ignored
    DuplicateId { id: TaskId, first_line: usize },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MalformedMetadata { reason } => {
                write!(f, "malformed metadata block: {reason}")
            }
            WarningKind::UnknownKey { key } => {
                write!(f, "unknown metadata key '{key}' kept as a tag")
            }
            WarningKind::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for '{key}', using default")
            }
            WarningKind::DuplicateId { id, first_line } => {
                write!(f, "duplicate task ID {id} (first declared on line {first_line})")
            }
        }
    }
}

/// A non-fatal problem on a specific line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    /// 1-based line number
    pub line: usize,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// A recognized checklist line
#[derive(Debug, Clone, PartialEq)]
pub struct TaskLine {
    raw: String,
    marker_offset: usize,
    task: Task,
    duplicate: bool,
}

impl TaskLine {
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// True if an earlier line already declared this ID
    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Rewrites the checkbox marker; returns true if the status changed
    fn set_status(&mut self, status: TaskStatus) -> bool {
        if self.task.status == status {
            return false;
        }
        let mut buf = [0u8; 4];
        let marker = status.marker().encode_utf8(&mut buf);
        self.raw
            .replace_range(self.marker_offset..self.marker_offset + 1, marker);
        self.task.status = status;
        true
    }
}

/// One line of the document
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Task(TaskLine),
    /// Headings, prose, comments, code: kept verbatim
    Other(String),
}

impl Line {
    pub fn raw(&self) -> &str {
        match self {
            Line::Task(task_line) => task_line.raw(),
            Line::Other(raw) => raw,
        }
    }
}

/// A parsed task document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDocument {
    lines: Vec<Line>,
    warnings: Vec<ParseWarning>,
}

impl TaskDocument {
    /// Parses document text. Never fails.
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut warnings = Vec::new();
        let mut first_seen: HashMap<TaskId, usize> = HashMap::new();
        let mut fence: Option<&str> = None;
        let mut position = 0;

        for (idx, raw) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let content = raw.trim_end_matches(['\n', '\r']);

            let trimmed = content.trim_start();
            let marker = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(m));
            if let Some(marker) = marker {
                fence = match fence {
                    None => Some(marker),
                    Some(open) if open == marker => None,
                    other => other,
                };
                lines.push(Line::Other(raw.to_string()));
                continue;
            }
            if fence.is_some() {
                lines.push(Line::Other(raw.to_string()));
                continue;
            }

            let Some(parsed) = parse_task_line(content, line_no) else {
                lines.push(Line::Other(raw.to_string()));
                continue;
            };
            let (mut task, marker_offset, line_warnings) = parsed;
            warnings.extend(line_warnings.into_iter().map(|kind| ParseWarning {
                line: line_no,
                kind,
            }));

            let duplicate = match first_seen.get(&task.id) {
                Some(&first_line) => {
                    warnings.push(ParseWarning {
                        line: line_no,
                        kind: WarningKind::DuplicateId {
                            id: task.id.clone(),
                            first_line,
                        },
                    });
                    true
                }
                None => {
                    first_seen.insert(task.id.clone(), line_no);
                    task.position = position;
                    position += 1;
                    false
                }
            };

            lines.push(Line::Task(TaskLine {
                raw: raw.to_string(),
                marker_offset,
                task,
                duplicate,
            }));
        }

        Self { lines, warnings }
    }

    /// Unique tasks in declaration order (later duplicates excluded)
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.lines.iter().filter_map(|line| match line {
            Line::Task(task_line) if !task_line.is_duplicate() => Some(task_line.task()),
            _ => None,
        })
    }

    /// Owned copy of the unique tasks
    pub fn task_list(&self) -> Vec<Task> {
        self.tasks().cloned().collect()
    }

    /// Looks up a task by ID (first occurrence)
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks().find(|t| &t.id == id)
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Sets a task's status by rewriting its checkbox marker
    ///
    /// Returns `None` if the ID is not declared, otherwise whether the
    /// status changed.
    pub fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Option<bool> {
        self.lines.iter_mut().find_map(|line| match line {
            Line::Task(task_line) if !task_line.is_duplicate() && &task_line.task().id == id => {
                Some(task_line.set_status(status))
            }
            _ => None,
        })
    }

    /// Renders the document back to text
    pub fn render(&self) -> String {
        self.lines.iter().map(Line::raw).collect()
    }
}

/// Parses a single line (without terminator) into a task
///
/// Returns the task, the byte offset of its checkbox marker, and any
/// metadata warnings. `None` means the line is not a task line.
fn parse_task_line(content: &str, line_no: usize) -> Option<(Task, usize, Vec<WarningKind>)> {
    let caps = TASK_LINE.captures(content)?;
    let marker = caps.get(1)?;
    let id_match = caps.get(2)?;
    let id: TaskId = id_match.as_str().parse().ok()?;
    let rest = caps.get(3).map_or("", |m| m.as_str());

    let status = if marker.as_str() == " " {
        TaskStatus::Pending
    } else {
        TaskStatus::Completed
    };

    let mut warnings = Vec::new();
    let mut task = Task::new(id, "");
    task.status = status;
    task.line = line_no;

    match metadata::split_trailing(rest) {
        Trailing::None => task.description = rest.trim().to_string(),
        Trailing::Unbalanced { description } => {
            task.description = description.to_string();
            warnings.push(WarningKind::MalformedMetadata {
                reason: "unbalanced parentheses".to_string(),
            });
        }
        Trailing::Block { description, inner } => {
            task.description = description.to_string();
            match metadata::parse_entries(inner) {
                Ok(entries) => warnings.extend(metadata::apply(&mut task, entries)),
                Err(reason) => warnings.push(WarningKind::MalformedMetadata { reason }),
            }
        }
    }

    Some((task, marker.start(), warnings))
}
