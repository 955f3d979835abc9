//! Graph visualization
//!
//! Every format projects the same [`DependencyGraph`], so readiness
//! classes, cycle edges and the critical path agree across outputs.

mod ascii;
mod dot;
mod mermaid;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DependencyGraph, NodeState, Task, TaskId};

/// Default maximum description length in node labels
pub const DEFAULT_LABEL_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualFormat {
    #[default]
    Mermaid,
    Dot,
    Ascii,
}

impl VisualFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualFormat::Mermaid => "mermaid",
            VisualFormat::Dot => "dot",
            VisualFormat::Ascii => "ascii",
        }
    }
}

impl fmt::Display for VisualFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mermaid" | "mmd" => Ok(VisualFormat::Mermaid),
            "dot" | "graphviz" => Ok(VisualFormat::Dot),
            "ascii" | "text" => Ok(VisualFormat::Ascii),
            other => Err(format!(
                "unknown format '{other}' (expected mermaid, dot or ascii)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Descriptions longer than this are cut and end in "..."
    pub label_width: usize,
    pub highlight_critical_path: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            label_width: DEFAULT_LABEL_WIDTH,
            highlight_critical_path: true,
        }
    }
}

/// Renders the graph in the requested format
pub fn render(graph: &DependencyGraph, format: VisualFormat, options: &RenderOptions) -> String {
    let view = View::new(graph, options);
    match format {
        VisualFormat::Mermaid => mermaid::render(&view),
        VisualFormat::Dot => dot::render(&view),
        VisualFormat::Ascii => ascii::render(&view),
    }
}

/// Visual class of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeClass {
    Completed,
    Ready,
    Blocked,
    /// Pending and on a dependency cycle
    Cycle,
}

impl NodeClass {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            NodeClass::Completed => "completed",
            NodeClass::Ready => "ready",
            NodeClass::Blocked => "blocked",
            NodeClass::Cycle => "cycle",
        }
    }
}

/// An edge as drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeStyle {
    Normal,
    Critical,
    Cyclic,
    /// From a dependency that is not in the document
    Missing,
}

/// The shared projection every renderer draws from
pub(crate) struct View<'g> {
    pub graph: &'g DependencyGraph,
    pub options: &'g RenderOptions,
    critical: HashSet<(TaskId, TaskId)>,
    /// Dangling dependency IDs in first-reference order
    pub missing: Vec<&'g TaskId>,
}

impl<'g> View<'g> {
    fn new(graph: &'g DependencyGraph, options: &'g RenderOptions) -> Self {
        let critical = if options.highlight_critical_path {
            graph
                .critical_path()
                .windows(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect()
        } else {
            HashSet::new()
        };

        let mut missing: Vec<&TaskId> = Vec::new();
        for (_, dep) in graph.unresolved() {
            if !missing.contains(&dep) {
                missing.push(dep);
            }
        }

        Self {
            graph,
            options,
            critical,
            missing,
        }
    }

    pub fn class(&self, task: &Task) -> NodeClass {
        match self.graph.state(&task.id) {
            Some(NodeState::Completed) => NodeClass::Completed,
            _ if self.graph.in_cycle(&task.id) => NodeClass::Cycle,
            Some(NodeState::Ready) => NodeClass::Ready,
            _ => NodeClass::Blocked,
        }
    }

    /// Every drawn edge as `(dependency, dependent, style)`
    pub fn edges(&self) -> Vec<(&'g TaskId, &'g TaskId, EdgeStyle)> {
        let mut edges: Vec<_> = self
            .graph
            .edges()
            .into_iter()
            .map(|edge| {
                let style = if edge.cyclic {
                    EdgeStyle::Cyclic
                } else if self
                    .critical
                    .contains(&(edge.dependency.clone(), edge.dependent.clone()))
                {
                    EdgeStyle::Critical
                } else {
                    EdgeStyle::Normal
                };
                (edge.dependency, edge.dependent, style)
            })
            .collect();

        edges.extend(
            self.graph
                .unresolved()
                .iter()
                .map(|(task, dep)| (dep, task, EdgeStyle::Missing)),
        );
        edges
    }

    pub fn label(&self, task: &Task) -> String {
        truncate(&task.description, self.options.label_width)
    }
}

/// Cuts `text` to at most `width` characters, ending in "..." when cut
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut out: String = text.chars().take(width - 3).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskDocument;

    pub(super) fn graph(text: &str) -> DependencyGraph {
        DependencyGraph::from_tasks(TaskDocument::parse(text).task_list())
    }

    #[test]
    fn truncate_labels() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("Implement authentication flow", 12), "Implement...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("DOT".parse::<VisualFormat>().unwrap(), VisualFormat::Dot);
        assert_eq!("mermaid".parse::<VisualFormat>().unwrap(), VisualFormat::Mermaid);
        assert_eq!("ascii".parse::<VisualFormat>().unwrap(), VisualFormat::Ascii);
        assert!("svg".parse::<VisualFormat>().is_err());
    }

    #[test]
    fn classes_agree_with_graph() {
        let g = graph(
            "- [x] T001 Done\n\
             - [ ] T002 Next (depends: T001)\n\
             - [ ] T003 Later (depends: T002)\n\
             - [ ] T004 Loop a (depends: T005)\n\
             - [ ] T005 Loop b (depends: T004)\n",
        );
        let options = RenderOptions::default();
        let view = View::new(&g, &options);
        let classes: Vec<_> = g.tasks().iter().map(|t| view.class(t)).collect();
        assert_eq!(
            classes,
            vec![
                NodeClass::Completed,
                NodeClass::Ready,
                NodeClass::Blocked,
                NodeClass::Cycle,
                NodeClass::Cycle,
            ]
        );
    }

    #[test]
    fn edge_styles() {
        let g = graph(
            "- [ ] T001 Root (effort: 5)\n\
             - [ ] T002 Long (depends: T001, effort: 5)\n\
             - [ ] T003 Short (depends: T001)\n\
             - [ ] T004 Dangling (depends: T999)\n",
        );
        let options = RenderOptions::default();
        let view = View::new(&g, &options);
        let styles: Vec<_> = view
            .edges()
            .into_iter()
            .map(|(from, to, style)| (from.to_string(), to.to_string(), style))
            .collect();

        assert!(styles.contains(&("T001".into(), "T002".into(), EdgeStyle::Critical)));
        assert!(styles.contains(&("T001".into(), "T003".into(), EdgeStyle::Normal)));
        assert!(styles.contains(&("T999".into(), "T004".into(), EdgeStyle::Missing)));
        assert_eq!(view.missing.len(), 1);

        let plain = RenderOptions {
            highlight_critical_path: false,
            ..RenderOptions::default()
        };
        let view = View::new(&g, &plain);
        assert!(view.edges().iter().all(|(_, _, s)| *s != EdgeStyle::Critical));
    }
}
