//! Operation facade
//!
//! Every call reads the document, parses it, builds the graph and computes
//! its answer. Nothing survives between calls, so external edits to the
//! document are always picked up. Mutations write the document back only
//! when a marker actually changed.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::mutation::{self, BatchOutcome, MutationError, TickOutcome};
use crate::domain::{
    DependencyGraph, GraphSummary, NodeState, ParseWarning, RangeError, Task, TaskDocument,
    TaskId, TickTarget,
};
use crate::query::{self, Filter, GroupBy, Preset, RankedTask, StatsOptions, StatsReport};
use crate::render::{self, VisualFormat};
use crate::storage::{Config, ConfigError, DocumentStore, StorageError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error(transparent)]
    InvalidRange(#[from] RangeError),

    #[error(transparent)]
    Io(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<MutationError> for EngineError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::NotFound(id) => EngineError::NotFound(id),
        }
    }
}

/// Non-fatal findings that accompany every result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub warnings: Vec<ParseWarning>,
    pub cycles: Vec<Vec<TaskId>>,
    /// `(task, missing dependency)` pairs
    pub unresolved: Vec<(TaskId, TaskId)>,
}

impl Diagnostics {
    fn collect(doc: &TaskDocument, graph: &DependencyGraph) -> Self {
        Self {
            warnings: doc.warnings().to_vec(),
            cycles: graph.cycles().to_vec(),
            unresolved: graph.unresolved().to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.cycles.is_empty() && self.unresolved.is_empty()
    }
}

/// A result plus the diagnostics of the document it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

/// Everything known about one task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDetail {
    pub task: Task,
    pub state: NodeState,
    pub in_cycle: bool,
    /// Effort-weighted depth; absent for tasks on a cycle
    pub depth: Option<u64>,
    pub level: Option<usize>,
    /// Dependencies that are not completed or not in the document
    pub blockers: Vec<TaskId>,
    pub dependents: Vec<TaskId>,
}

/// Stateless entry point for all operations on one document
#[derive(Debug, Clone)]
pub struct Engine {
    store: DocumentStore,
    config: Config,
}

impl Engine {
    pub fn new(store: DocumentStore, config: Config) -> Self {
        Self { store, config }
    }

    /// Opens the document named by the configuration
    pub fn from_config(config: Config) -> Self {
        let store = DocumentStore::new(config.document_path());
        Self::new(store, config)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn load(&self) -> Result<(TaskDocument, DependencyGraph), EngineError> {
        let doc = self.store.read()?;
        let graph = DependencyGraph::from_tasks(doc.task_list());
        debug!(
            tasks = graph.len(),
            warnings = doc.warnings().len(),
            cycles = graph.cycles().len(),
            "parsed task document"
        );
        Ok((doc, graph))
    }

    fn query<T>(
        &self,
        f: impl FnOnce(&DependencyGraph) -> T,
    ) -> Result<Outcome<T>, EngineError> {
        let (doc, graph) = self.load()?;
        Ok(Outcome {
            value: f(&graph),
            diagnostics: Diagnostics::collect(&doc, &graph),
        })
    }

    /// All tasks in document order
    pub fn list(&self) -> Result<Outcome<Vec<Task>>, EngineError> {
        self.filter(&Preset::All.into())
    }

    pub fn filter(&self, filter: &Filter) -> Result<Outcome<Vec<Task>>, EngineError> {
        self.query(|graph| query::filter(graph, filter).into_iter().cloned().collect())
    }

    /// Ready tasks, most urgent first
    pub fn next(&self) -> Result<Outcome<Vec<Task>>, EngineError> {
        self.filter(&Preset::Next.into())
    }

    /// Ranked search; `limit` falls back to the configured limit
    pub fn search(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Outcome<Vec<RankedTask>>, EngineError> {
        let mut options = self.config.search_options();
        if let Some(limit) = limit {
            options.limit = limit;
        }
        self.query(|graph| query::search(graph.tasks(), text, &options))
    }

    pub fn stats(
        &self,
        group_by: &[GroupBy],
        include_charts: bool,
    ) -> Result<Outcome<StatsReport>, EngineError> {
        let options = StatsOptions {
            group_by: group_by.to_vec(),
            include_charts,
            chart_width: self.config.stats.chart_width,
        };
        self.query(|graph| query::stats(graph, &options))
    }

    pub fn visualize(&self, format: VisualFormat) -> Result<Outcome<String>, EngineError> {
        let options = self.config.render_options();
        self.query(|graph| render::render(graph, format, &options))
    }

    pub fn show(&self, id: &TaskId) -> Result<Outcome<TaskDetail>, EngineError> {
        let (doc, graph) = self.load()?;
        let (Some(task), Some(state)) = (graph.task(id), graph.state(id)) else {
            return Err(EngineError::NotFound(id.clone()));
        };

        let detail = TaskDetail {
            task: task.clone(),
            state,
            in_cycle: graph.in_cycle(id),
            depth: graph.depth(id),
            level: graph.level(id),
            blockers: graph.blockers(id).into_iter().cloned().collect(),
            dependents: graph.dependents(id).into_iter().cloned().collect(),
        };
        Ok(Outcome {
            value: detail,
            diagnostics: Diagnostics::collect(&doc, &graph),
        })
    }

    /// Readiness, cycles, depths and dangling dependencies
    pub fn check(&self) -> Result<Outcome<GraphSummary>, EngineError> {
        self.query(DependencyGraph::summary)
    }

    pub fn tick(&self, id: &TaskId) -> Result<Outcome<TickOutcome>, EngineError> {
        self.mutate(|doc| Ok(mutation::tick(doc, id)?))
    }

    pub fn untick(&self, id: &TaskId) -> Result<Outcome<TickOutcome>, EngineError> {
        self.mutate(|doc| Ok(mutation::untick(doc, id)?))
    }

    /// Ticks every ID of a list or range expression
    ///
    /// A malformed expression fails before the document is read. Missing
    /// IDs are reported per item and never stop the batch.
    pub fn tick_range(&self, spec: &str) -> Result<Outcome<BatchOutcome>, EngineError> {
        let target = TickTarget::parse(spec)?;
        self.mutate(|doc| Ok(mutation::tick_all(doc, &target)))
    }

    fn mutate<T: Changes>(
        &self,
        f: impl FnOnce(&mut TaskDocument) -> Result<T, EngineError>,
    ) -> Result<Outcome<T>, EngineError> {
        let mut doc = self.store.read()?;
        let value = f(&mut doc)?;

        let changed = value.changes();
        if changed > 0 {
            self.store.write(&doc)?;
            info!(path = %self.store.path().display(), changed, "updated task document");
        } else {
            debug!("no markers changed; document left untouched");
        }

        let graph = DependencyGraph::from_tasks(doc.task_list());
        Ok(Outcome {
            value,
            diagnostics: Diagnostics::collect(&doc, &graph),
        })
    }
}

/// Number of markers a mutation flipped
trait Changes {
    fn changes(&self) -> usize;
}

impl Changes for TickOutcome {
    fn changes(&self) -> usize {
        usize::from(*self == TickOutcome::Changed)
    }
}

impl Changes for BatchOutcome {
    fn changes(&self) -> usize {
        self.changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use std::fs;
    use tempfile::TempDir;

    const DOC: &str = "# Sprint\n\
        \n\
        - [ ] T001 Set up repository (phase: setup)\n\
        - [ ] T002 Implement authentication flow (depends: T001, type: backend)\n\
        - [ ] T003 Write docs (tags: docs)\n\
        - [ ] T004 Release (depends: T002, T003)\n";

    fn engine(text: &str) -> (TempDir, Engine) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.md");
        fs::write(&path, text).unwrap();
        let engine = Engine::new(DocumentStore::new(path), Config::default());
        (dir, engine)
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn id(s: &str) -> TaskId {
        s.parse().unwrap()
    }

    #[test]
    fn next_then_tick_unblocks_dependent() {
        let (_dir, engine) =
            engine("- [ ] T001 First\n- [ ] T002 Second (depends: T001)\n");

        assert_eq!(ids(&engine.next().unwrap().value), vec!["T001"]);
        assert_eq!(engine.tick(&id("T001")).unwrap().value, TickOutcome::Changed);
        assert_eq!(ids(&engine.next().unwrap().value), vec!["T002"]);
    }

    #[test]
    fn tick_missing_is_not_found() {
        let (_dir, engine) = engine(DOC);
        let err = engine.tick(&id("T099")).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(ref missing) if missing.as_str() == "T099"));
        assert_eq!(fs::read_to_string(engine.store().path()).unwrap(), DOC);
    }

    #[test]
    fn unchanged_tick_does_not_rewrite() {
        let (_dir, engine) = engine("- [x] T001 Done\n");
        let before = fs::metadata(engine.store().path()).unwrap().modified().unwrap();

        assert_eq!(engine.tick(&id("T001")).unwrap().value, TickOutcome::Unchanged);
        let after = fs::metadata(engine.store().path()).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn tick_range_preserves_other_bytes() {
        let (_dir, engine) = engine(DOC);
        let outcome = engine.tick_range("T001-T003").unwrap();
        assert_eq!(outcome.value.changed(), 3);

        let text = fs::read_to_string(engine.store().path()).unwrap();
        assert_eq!(text, DOC.replacen("- [ ]", "- [x]", 3));
    }

    #[test]
    fn tick_range_rejects_bad_expression() {
        let (_dir, engine) = engine(DOC);
        assert!(matches!(
            engine.tick_range("T003-T001"),
            Err(EngineError::InvalidRange(_))
        ));
    }

    #[test]
    fn untick_reopens_task() {
        let (_dir, engine) = engine("- [x] T001 Done\n");
        assert_eq!(engine.untick(&id("T001")).unwrap().value, TickOutcome::Changed);
        let listed = engine.list().unwrap().value;
        assert_eq!(listed[0].status, TaskStatus::Pending);
    }

    #[test]
    fn search_uses_configured_limit() {
        let (_dir, engine) = engine(DOC);
        let results = engine.search("autentication", Some(3)).unwrap().value;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].task.id.as_str(), "T002");
    }

    #[test]
    fn show_reports_blockers_and_dependents() {
        let (_dir, engine) = engine(DOC);
        let detail = engine.show(&id("T002")).unwrap().value;

        assert_eq!(detail.state, NodeState::Blocked);
        assert_eq!(detail.blockers, vec![id("T001")]);
        assert_eq!(detail.dependents, vec![id("T004")]);
        assert!(!detail.in_cycle);

        assert!(matches!(
            engine.show(&id("T404")),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn diagnostics_surface_warnings_and_cycles() {
        let (_dir, engine) = engine(
            "- [ ] T001 A (depends: T002)\n\
             - [ ] T002 B (depends: T001)\n\
             - [ ] T001 Again\n\
             - [ ] T003 C (depends: T404)\n",
        );
        let outcome = engine.check().unwrap();

        assert_eq!(outcome.diagnostics.warnings.len(), 1);
        assert_eq!(outcome.diagnostics.cycles, vec![vec![id("T001"), id("T002")]]);
        assert_eq!(outcome.diagnostics.unresolved, vec![(id("T003"), id("T404"))]);
        assert!(!outcome.diagnostics.is_empty());
        assert_eq!(outcome.value.ready, vec![]);
    }

    #[test]
    fn stats_and_visualize_read_fresh_document() {
        let (_dir, engine) = engine(DOC);
        assert_eq!(engine.stats(&[], false).unwrap().value.completed, 0);

        fs::write(engine.store().path(), DOC.replace("- [ ] T003", "- [x] T003")).unwrap();
        assert_eq!(engine.stats(&[], false).unwrap().value.completed, 1);

        let ascii = engine.visualize(VisualFormat::Ascii).unwrap().value;
        assert!(ascii.contains("[x] T003 Write docs"));
    }

    #[test]
    fn missing_document_is_io_error() {
        let dir = TempDir::new().unwrap();
        let engine = Engine::new(
            DocumentStore::new(dir.path().join("absent.md")),
            Config::default(),
        );
        assert!(matches!(engine.list(), Err(EngineError::Io(_))));
    }
}
