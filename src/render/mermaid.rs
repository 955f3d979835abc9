//! Mermaid flowchart output

use std::collections::HashMap;

use super::{EdgeStyle, NodeClass, View};
use crate::domain::TaskId;

const CLASS_DEFS: &[(&str, &str)] = &[
    ("completed", "fill:#d4edda,stroke:#28a745,color:#155724"),
    ("ready", "fill:#cce5ff,stroke:#0d6efd,color:#084298"),
    ("blocked", "fill:#e2e3e5,stroke:#6c757d,color:#41464b"),
    ("cycle", "fill:#f8d7da,stroke:#dc3545,color:#842029,stroke-width:2px"),
    ("missing", "fill:#ffffff,stroke:#6c757d,stroke-dasharray:5 5"),
];

pub(super) fn render(view: &View<'_>) -> String {
    let mut out = String::from("flowchart TD\n");

    // Task IDs may differ only in `-` versus `_`, so nodes are keyed by
    // position and the ID lives in the label
    let mut node_ids: HashMap<&TaskId, String> = HashMap::new();
    for (i, task) in view.graph.tasks().iter().enumerate() {
        node_ids.insert(&task.id, format!("n{i}"));
    }
    for (i, id) in view.missing.iter().enumerate() {
        node_ids.insert(*id, format!("m{i}"));
    }
    let node = |id: &TaskId| node_ids.get(id).cloned().unwrap_or_default();

    for task in view.graph.tasks() {
        out.push_str(&format!(
            "    {}[\"{}: {}\"]\n",
            node(&task.id),
            escape_mermaid(task.id.as_str()),
            escape_mermaid(&view.label(task)),
        ));
    }
    for id in &view.missing {
        out.push_str(&format!(
            "    {}[\"{}: missing\"]\n",
            node(id),
            escape_mermaid(id.as_str())
        ));
    }

    for (from, to, style) in view.edges() {
        let arrow = match style {
            EdgeStyle::Normal => "-->",
            EdgeStyle::Critical => "==>",
            EdgeStyle::Cyclic => "-.->|cycle|",
            EdgeStyle::Missing => "-.->|missing|",
        };
        out.push_str(&format!("    {} {} {}\n", node(from), arrow, node(to)));
    }

    for (name, style) in CLASS_DEFS {
        out.push_str(&format!("    classDef {name} {style}\n"));
    }

    for class in [
        NodeClass::Completed,
        NodeClass::Ready,
        NodeClass::Blocked,
        NodeClass::Cycle,
    ] {
        let members: Vec<String> = view
            .graph
            .tasks()
            .iter()
            .filter(|t| view.class(t) == class)
            .map(|t| node(&t.id))
            .collect();
        if !members.is_empty() {
            out.push_str(&format!("    class {} {}\n", members.join(","), class.name()));
        }
    }
    if !view.missing.is_empty() {
        let members: Vec<String> = view.missing.iter().map(|id| node(id)).collect();
        out.push_str(&format!("    class {} missing\n", members.join(",")));
    }

    out
}

/// Escape a string for Mermaid labels.
fn escape_mermaid(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use crate::domain::{DependencyGraph, TaskDocument};
    use crate::render::{render, RenderOptions, VisualFormat};

    fn mermaid(text: &str) -> String {
        let graph = DependencyGraph::from_tasks(TaskDocument::parse(text).task_list());
        render(&graph, VisualFormat::Mermaid, &RenderOptions::default())
    }

    #[test]
    fn starts_with_flowchart() {
        assert!(mermaid("").starts_with("flowchart TD\n"));
    }

    #[test]
    fn nodes_edges_and_classes() {
        let out = mermaid(
            "- [x] T001 Set up repository\n\
             - [ ] T002 Write <b>\"docs\"</b> (depends: T001)\n",
        );
        assert!(out.contains("    n0[\"T001: Set up repository\"]\n"));
        assert!(out.contains("&quot;docs&quot;"));
        assert!(out.contains("&lt;b&gt;"));
        assert!(out.contains("    n0 ==> n1\n"));
        assert!(out.contains("    class n0 completed\n"));
        assert!(out.contains("    class n1 ready\n"));
        assert!(out.contains("    classDef blocked "));
    }

    #[test]
    fn cycles_and_missing_nodes() {
        let out = mermaid(
            "- [ ] T001 A (depends: T002)\n\
             - [ ] T002 B (depends: T001)\n\
             - [ ] API-1 C (depends: T404)\n",
        );
        assert!(out.contains("    n1 -.->|cycle| n0\n"));
        assert!(out.contains("    n0 -.->|cycle| n1\n"));
        assert!(out.contains("    class n0,n1 cycle\n"));
        assert!(out.contains("    m0[\"T404: missing\"]\n"));
        assert!(out.contains("    m0 -.->|missing| n2\n"));
        assert!(out.contains("    class m0 missing\n"));
    }

    #[test]
    fn ids_differing_in_separator_stay_distinct() {
        let out = mermaid(
            "- [x] API-1 Dashed\n\
             - [ ] API_1 Underscored (depends: API-1, T404)\n",
        );
        assert!(out.contains("    n0[\"API-1: Dashed\"]\n"));
        assert!(out.contains("    n1[\"API_1: Underscored\"]\n"));
        assert_eq!(out.matches("n0[").count(), 1);
        assert_eq!(out.matches("n1[").count(), 1);
        assert!(out.contains("    n0 ==> n1\n"));
        assert!(out.contains("    m0 -.->|missing| n1\n"));
        assert!(out.contains("    class n0 completed\n"));
        assert!(out.contains("    class n1 blocked\n"));
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let out = mermaid(&format!("- [ ] T001 {}\n", "word ".repeat(20)));
        assert!(out.contains("..."));
    }
}
