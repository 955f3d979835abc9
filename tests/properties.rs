//! Property tests for parsing, graph analysis and mutation

use proptest::prelude::*;
use std::collections::HashSet;

use tick_cli::domain::mutation;
use tick_cli::domain::{DependencyGraph, NodeState, TaskDocument, TaskId, TaskStatus};

/// One generated task: (completed, dependency numbers, effort)
type TaskSpec = (bool, Vec<u8>, u8);

fn task_line(n: usize, (done, deps, effort): &TaskSpec) -> String {
    let marker = if *done { 'x' } else { ' ' };
    let mut meta = vec![format!("effort: {effort}")];
    if !deps.is_empty() {
        let deps: Vec<String> = deps.iter().map(|d| format!("T{:03}", d)).collect();
        meta.push(format!("depends: {}", deps.join(", ")));
    }
    format!("- [{marker}] T{n:03} Task number {n} ({})", meta.join(", "))
}

/// Documents of up to 12 tasks whose dependencies may dangle or form cycles,
/// interleaved with prose and headings
fn document() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(
            (any::<bool>(), prop::collection::vec(0u8..15, 0..4), 0u8..10),
            0..12,
        ),
        prop::collection::vec("[a-zA-Z #*`()-]{0,30}", 0..6),
        any::<bool>(),
    )
        .prop_map(|(tasks, prose, trailing_newline)| {
            let mut lines = Vec::new();
            for (i, spec) in tasks.iter().enumerate() {
                if let Some(text) = prose.get(i) {
                    // Keep prose from looking like a fence or a checklist item
                    lines.push(format!("Note: {}", text));
                }
                lines.push(task_line(i, spec));
            }
            let mut doc = lines.join("\n");
            if trailing_newline {
                doc.push('\n');
            }
            doc
        })
}

proptest! {
    #[test]
    fn unmodified_document_round_trips(text in document()) {
        let doc = TaskDocument::parse(&text);
        prop_assert_eq!(doc.render(), text.clone());

        let reparsed = TaskDocument::parse(&doc.render());
        prop_assert_eq!(reparsed.task_list(), doc.task_list());
    }

    #[test]
    fn tick_twice_equals_tick_once(text in document(), pick in 0usize..12) {
        let id: TaskId = format!("T{pick:03}").parse().unwrap();

        let mut once = TaskDocument::parse(&text);
        let first = mutation::tick(&mut once, &id);

        let mut twice = TaskDocument::parse(&text);
        let _ = mutation::tick(&mut twice, &id);
        let second = mutation::tick(&mut twice, &id);

        prop_assert_eq!(once.render(), twice.render());
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if second.is_ok() {
            prop_assert_eq!(second, Ok(mutation::TickOutcome::Unchanged));
            prop_assert_eq!(
                twice.task(&id).map(|t| t.status),
                Some(TaskStatus::Completed)
            );
        }
    }

    #[test]
    fn tick_changes_only_one_marker(text in document(), pick in 0usize..12) {
        let id: TaskId = format!("T{pick:03}").parse().unwrap();
        let mut doc = TaskDocument::parse(&text);

        if mutation::tick(&mut doc, &id) == Ok(mutation::TickOutcome::Changed) {
            let after = doc.render();
            prop_assert_eq!(after.len(), text.len());
            let diff = text.bytes().zip(after.bytes()).filter(|(a, b)| a != b).count();
            prop_assert_eq!(diff, 1);
        }
    }

    #[test]
    fn ready_tasks_have_no_unmet_dependency(text in document()) {
        let doc = TaskDocument::parse(&text);
        let graph = DependencyGraph::from_tasks(doc.task_list());

        for task in graph.ready_tasks() {
            prop_assert!(task.status.is_pending());
            for dep in &task.depends_on {
                let dep_task = graph.task(dep);
                prop_assert!(dep_task.is_some(), "{} depends on unknown {}", task.id, dep);
                prop_assert!(dep_task.is_some_and(|d| d.status.is_complete()));
            }
        }

        for task in graph.tasks() {
            let state = graph.state(&task.id);
            prop_assert!(state.is_some());
            if task.status.is_complete() {
                prop_assert_eq!(state, Some(NodeState::Completed));
            }
        }
    }

    #[test]
    fn reported_cycles_are_real(text in document()) {
        let doc = TaskDocument::parse(&text);
        let graph = DependencyGraph::from_tasks(doc.task_list());

        for cycle in graph.cycles() {
            prop_assert!(!cycle.is_empty());
            let members: HashSet<&TaskId> = cycle.iter().collect();
            prop_assert_eq!(members.len(), cycle.len());

            for (i, id) in cycle.iter().enumerate() {
                let task = graph.task(id);
                prop_assert!(task.is_some());
                // Each member depends on the next one around the cycle
                let next = &cycle[(i + 1) % cycle.len()];
                prop_assert!(
                    task.is_some_and(|t| t.depends_on.contains(next)),
                    "{} does not depend on {}", id, next
                );
                prop_assert!(!graph.is_ready(id));
            }
        }
    }

    #[test]
    fn cyclic_graphs_report_a_cycle(text in document()) {
        let doc = TaskDocument::parse(&text);
        let graph = DependencyGraph::from_tasks(doc.task_list());

        // Only tasks on a cycle lack a depth
        let has_cycle = graph.tasks().iter().any(|t| graph.depth(&t.id).is_none());
        prop_assert_eq!(has_cycle, !graph.cycles().is_empty());
    }
}
