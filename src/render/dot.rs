//! Graphviz DOT output

use super::{EdgeStyle, NodeClass, View};

fn node_colors(class: NodeClass) -> (&'static str, &'static str) {
    match class {
        NodeClass::Completed => ("#d4edda", "#28a745"),
        NodeClass::Ready => ("#cce5ff", "#0d6efd"),
        NodeClass::Blocked => ("#e2e3e5", "#6c757d"),
        NodeClass::Cycle => ("#f8d7da", "#dc3545"),
    }
}

pub(super) fn render(view: &View<'_>) -> String {
    let mut out = String::new();
    out.push_str("digraph tasks {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\", fontsize=10];\n");
    out.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n");
    out.push('\n');

    for task in view.graph.tasks() {
        let class = view.class(task);
        let (fill, color) = node_colors(class);
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\\n{}\", fillcolor=\"{}\", color=\"{}\", class=\"{}\"];\n",
            escape_dot(task.id.as_str()),
            escape_dot(task.id.as_str()),
            escape_dot(&view.label(task)),
            fill,
            color,
            class.name(),
        ));
    }
    for id in &view.missing {
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\\n(missing)\", style=dashed, color=\"#6c757d\", class=\"missing\"];\n",
            escape_dot(id.as_str()),
            escape_dot(id.as_str()),
        ));
    }

    if !view.graph.is_empty() || !view.missing.is_empty() {
        out.push('\n');
    }

    for (from, to, style) in view.edges() {
        let attrs = match style {
            EdgeStyle::Normal => "",
            EdgeStyle::Critical => " [style=bold, penwidth=2.5, color=\"#fd7e14\"]",
            EdgeStyle::Cyclic => " [style=dashed, color=\"#dc3545\", label=\"cycle\"]",
            EdgeStyle::Missing => " [style=dotted, color=\"#6c757d\"]",
        };
        out.push_str(&format!(
            "  \"{}\" -> \"{}\"{};\n",
            escape_dot(from.as_str()),
            escape_dot(to.as_str()),
            attrs
        ));
    }

    out.push_str("}\n");
    out
}

/// Escape a string for Graphviz DOT labels.
fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
