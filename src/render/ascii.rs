//! Indented plain-text listing in topological order

use super::{NodeClass, View};

pub const LEGEND: &str = "Legend: [x] completed  [>] ready  [ ] blocked  [!] cycle";

fn glyph(class: NodeClass) -> &'static str {
    match class {
        NodeClass::Completed => "[x]",
        NodeClass::Ready => "[>]",
        NodeClass::Blocked => "[ ]",
        NodeClass::Cycle => "[!]",
    }
}

pub(super) fn render(view: &View<'_>) -> String {
    let graph = view.graph;
    if graph.is_empty() {
        return "No tasks\n".to_string();
    }

    let mut out = String::new();
    for task in graph.topological_order() {
        let indent = "  ".repeat(graph.level(&task.id).unwrap_or(0));
        out.push_str(&format!(
            "{indent}{} {} {}",
            glyph(view.class(task)),
            task.id,
            view.label(task)
        ));
        if !task.depends_on.is_empty() {
            let deps: Vec<&str> = task.depends_on.iter().map(|d| d.as_str()).collect();
            out.push_str(&format!("  <- {}", deps.join(", ")));
        }
        out.push('\n');
    }

    out.push('\n');
    for missing in &view.missing {
        let needed_by: Vec<&str> = graph
            .unresolved()
            .iter()
            .filter(|(_, dep)| dep == *missing)
            .map(|(task, _)| task.as_str())
            .collect();
        out.push_str(&format!(
            "Missing: {} (needed by {})\n",
            missing,
            needed_by.join(", ")
        ));
    }
    for cycle in graph.cycles() {
        let ids: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
        out.push_str(&format!("Cycle: {} -> {}\n", ids.join(" -> "), ids[0]));
    }
    if view.options.highlight_critical_path {
        let path = graph.critical_path();
        if !path.is_empty() {
            let effort = graph.depth(&path[path.len() - 1]).unwrap_or(0);
            let ids: Vec<&str> = path.iter().map(|id| id.as_str()).collect();
            out.push_str(&format!(
                "Critical path: {} (effort {})\n",
                ids.join(" -> "),
                effort
            ));
        }
    }
    out.push_str(LEGEND);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use crate::domain::{DependencyGraph, TaskDocument};
    use crate::render::{render, RenderOptions, VisualFormat};

    fn ascii(text: &str) -> String {
        let graph = DependencyGraph::from_tasks(TaskDocument::parse(text).task_list());
        render(&graph, VisualFormat::Ascii, &RenderOptions::default())
    }

    #[test]
    fn indented_topological_listing() {
        let out = ascii(
            "- [ ] T003 Release (depends: T002, effort: 2)\n\
             - [x] T001 Set up repository\n\
             - [ ] T002 Write docs (depends: T001)\n",
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[x] T001 Set up repository");
        assert_eq!(lines[1], "  [>] T002 Write docs  <- T001");
        assert_eq!(lines[2], "    [ ] T003 Release  <- T002");
        assert!(out.contains("Critical path: T001 -> T002 -> T003 (effort 4)\n"));
        assert!(out.ends_with(&format!("{}\n", super::LEGEND)));
    }

    #[test]
    fn cycles_and_missing() {
        let out = ascii(
            "- [ ] T001 A (depends: T002)\n\
             - [ ] T002 B (depends: T001)\n\
             - [ ] T003 C (depends: T404)\n",
        );
        assert!(out.contains("[!] T001 A  <- T002\n"));
        assert!(out.contains("[!] T002 B  <- T001\n"));
        assert!(out.contains("[ ] T003 C  <- T404\n"));
        assert!(out.contains("Missing: T404 (needed by T003)\n"));
        assert!(out.contains("Cycle: T001 -> T002 -> T001\n"));
    }

    #[test]
    fn empty_document() {
        assert_eq!(ascii("# Nothing here\n"), "No tasks\n");
    }
}
