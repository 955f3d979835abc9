//! Dependency graph for tasks
//!
//! Built from scratch on every call from the parsed task list; it is never
//! the system of record. Uses petgraph for storage and strongly connected
//! components.
//!
//! Edge direction is `dependency -> dependent`: "dependency must be
//! completed before dependent". Dependencies on IDs that are not declared
//! in the document are kept aside as unresolved and make the task blocked.
//!
//! Cycles are a warning-level condition: they are reported, their members
//! are never ready, and they are left out of the effort-weighted depth.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;

use super::id::TaskId;
use super::task::Task;

/// Readiness of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Completed,
    Ready,
    Blocked,
}

/// A resolved dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<'a> {
    /// The task that must be completed first
    pub dependency: &'a TaskId,
    /// The task waiting on it
    pub dependent: &'a TaskId,
    /// Both ends sit on the same dependency cycle
    pub cyclic: bool,
}

/// Serializable snapshot of the graph computations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub ready: Vec<TaskId>,
    pub blocked: Vec<TaskId>,
    pub cycles: Vec<Vec<TaskId>>,
    pub depth: Vec<(TaskId, u64)>,
    pub unresolved: Vec<(TaskId, TaskId)>,
    pub critical_path: Vec<TaskId>,
}

/// A dependency graph over one document's tasks
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Tasks in position order; node `i` is `tasks[i]`
    tasks: Vec<Task>,

    /// The underlying directed graph
    graph: DiGraph<usize, ()>,

    /// Map from TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,

    /// `(dependent, missing dependency)` pairs
    unresolved: Vec<(TaskId, TaskId)>,

    cycles: Vec<Vec<TaskId>>,

    /// Node -> strongly connected component, for nodes on a cycle
    cycle_component: HashMap<usize, usize>,

    states: Vec<NodeState>,

    /// Effort-weighted critical path length ending at each acyclic node
    depth: Vec<Option<u64>>,

    /// Longest chain length in edges ending at each acyclic node
    level: Vec<Option<usize>>,

    /// Kahn order of acyclic nodes, then cyclic nodes by position
    order: Vec<usize>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a collection of tasks
    ///
    /// Tasks are ordered by `position`; a repeated ID keeps its first
    /// occurrence.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut tasks: Vec<Task> = tasks.into_iter().collect();
        tasks.sort_by_key(|t| t.position);

        let mut seen = HashSet::new();
        tasks.retain(|t| seen.insert(t.id.clone()));

        let mut graph = DiGraph::with_capacity(tasks.len(), 0);
        let mut node_map = HashMap::with_capacity(tasks.len());

        // First pass: add all nodes
        for (i, task) in tasks.iter().enumerate() {
            let idx = graph.add_node(i);
            node_map.insert(task.id.clone(), idx);
        }

        // Second pass: add all edges
        let mut unresolved = Vec::new();
        for (i, task) in tasks.iter().enumerate() {
            for dep_id in &task.depends_on {
                match node_map.get(dep_id) {
                    Some(&dep_idx) => {
                        graph.add_edge(dep_idx, NodeIndex::new(i), ());
                    }
                    None => unresolved.push((task.id.clone(), dep_id.clone())),
                }
            }
        }

        let mut built = Self {
            tasks,
            graph,
            node_map,
            unresolved,
            ..Self::default()
        };
        built.compute();
        built
    }

    fn compute(&mut self) {
        self.find_cycle_components();
        self.cycles = self
            .find_cycles()
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|i| self.tasks[i].id.clone()).collect())
            .collect();
        self.compute_depths();
        self.compute_states();
    }

    /// Marks every node that sits on some cycle
    fn find_cycle_components(&mut self) {
        for (component, scc) in kosaraju_scc(&self.graph).into_iter().enumerate() {
            let on_cycle = scc.len() > 1
                || scc
                    .first()
                    .is_some_and(|&n| self.graph.contains_edge(n, n));
            if on_cycle {
                for n in scc {
                    self.cycle_component.insert(n.index(), component);
                }
            }
        }
    }

    /// Indices of a node's resolved dependencies, in position order
    fn dependency_indices(&self, node: usize) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(node), Direction::Incoming)
            .map(|n| n.index())
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Indices of a node's dependents, in position order
    fn dependent_indices(&self, node: usize) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(node), Direction::Outgoing)
            .map(|n| n.index())
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Depth-first search along "depends on" edges with an explicit stack
    ///
    /// Each back edge yields the cycle of nodes between its target and the
    /// top of the stack, rotated to start at its earliest-declared member.
    fn find_cycles(&self) -> Vec<Vec<usize>> {
        let n = self.tasks.len();
        let mut marks = vec![Mark::Unvisited; n];
        let mut path: Vec<usize> = Vec::new();
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for start in 0..n {
            if marks[start] != Mark::Unvisited {
                continue;
            }

            // Frames of (node, its dependencies, next dependency to follow)
            let mut stack = vec![(start, self.dependency_indices(start), 0usize)];
            marks[start] = Mark::OnStack;
            path.push(start);

            while let Some((node, deps, next)) = stack.last_mut() {
                let Some(&dep) = deps.get(*next) else {
                    marks[*node] = Mark::Done;
                    path.pop();
                    stack.pop();
                    continue;
                };
                *next += 1;

                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::OnStack;
                        path.push(dep);
                        stack.push((dep, self.dependency_indices(dep), 0));
                    }
                    Mark::OnStack => {
                        if let Some(from) = path.iter().position(|&p| p == dep) {
                            let mut cycle = path[from..].to_vec();
                            let min_at = cycle
                                .iter()
                                .enumerate()
                                .min_by_key(|&(_, p)| *p)
                                .map_or(0, |(i, _)| i);
                            cycle.rotate_left(min_at);
                            if seen.insert(cycle.clone()) {
                                found.push(cycle);
                            }
                        }
                    }
                    Mark::Done => {}
                }
            }
        }

        found.sort_by_key(|cycle: &Vec<usize>| (cycle[0], cycle.len()));
        found
    }

    /// Kahn's algorithm over the acyclic part of the graph
    fn compute_depths(&mut self) {
        let n = self.tasks.len();
        let acyclic = |i: usize| !self.cycle_component.contains_key(&i);

        let mut indegree = vec![0usize; n];
        for i in (0..n).filter(|&i| acyclic(i)) {
            indegree[i] = self
                .dependency_indices(i)
                .into_iter()
                .filter(|&d| acyclic(d))
                .count();
        }

        let mut depth: Vec<Option<u64>> = vec![None; n];
        let mut level: Vec<Option<usize>> = vec![None; n];
        let mut order = Vec::with_capacity(n);

        let mut queue: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&i| acyclic(i) && indegree[i] == 0)
            .map(Reverse)
            .collect();

        while let Some(Reverse(node)) = queue.pop() {
            let deps: Vec<usize> = self
                .dependency_indices(node)
                .into_iter()
                .filter(|&d| acyclic(d))
                .collect();

            let base = deps.iter().filter_map(|&d| depth[d]).max().unwrap_or(0);
            depth[node] = Some(base + u64::from(self.tasks[node].effort));
            level[node] = Some(
                deps.iter()
                    .filter_map(|&d| level[d])
                    .max()
                    .map_or(0, |l| l + 1),
            );
            order.push(node);

            for dependent in self.dependent_indices(node) {
                if !acyclic(dependent) {
                    continue;
                }
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    queue.push(Reverse(dependent));
                }
            }
        }

        order.extend((0..n).filter(|&i| !acyclic(i)));

        self.depth = depth;
        self.level = level;
        self.order = order;
    }

    fn compute_states(&mut self) {
        let missing: HashSet<&TaskId> = self.unresolved.iter().map(|(t, _)| t).collect();

        self.states = (0..self.tasks.len())
            .map(|i| {
                let task = &self.tasks[i];
                if task.status.is_complete() {
                    return NodeState::Completed;
                }
                let deps_done = self
                    .dependency_indices(i)
                    .into_iter()
                    .all(|d| self.tasks[d].status.is_complete());
                if deps_done && !missing.contains(&task.id) && !self.cycle_component.contains_key(&i)
                {
                    NodeState::Ready
                } else {
                    NodeState::Blocked
                }
            })
            .collect();
    }

    fn index_of(&self, task_id: &TaskId) -> Option<usize> {
        self.node_map.get(task_id).map(|idx| idx.index())
    }

    /// All tasks in position order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: &TaskId) -> Option<&Task> {
        self.index_of(task_id).map(|i| &self.tasks[i])
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn state(&self, task_id: &TaskId) -> Option<NodeState> {
        self.index_of(task_id).map(|i| self.states[i])
    }

    pub fn is_ready(&self, task_id: &TaskId) -> bool {
        self.state(task_id) == Some(NodeState::Ready)
    }

    pub fn is_blocked(&self, task_id: &TaskId) -> bool {
        self.state(task_id) == Some(NodeState::Blocked)
    }

    /// Pending tasks whose dependencies are all completed, in position order
    pub fn ready_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks_in_state(NodeState::Ready)
    }

    /// Pending tasks with an unmet, dangling or cyclic dependency
    pub fn blocked_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks_in_state(NodeState::Blocked)
    }

    fn tasks_in_state(&self, state: NodeState) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .zip(&self.states)
            .filter(move |(_, s)| **s == state)
            .map(|(t, _)| t)
    }

    /// Reported cycles, each starting at its earliest-declared member
    pub fn cycles(&self) -> &[Vec<TaskId>] {
        &self.cycles
    }

    /// Returns true if the task sits on any dependency cycle
    pub fn in_cycle(&self, task_id: &TaskId) -> bool {
        self.index_of(task_id)
            .is_some_and(|i| self.cycle_component.contains_key(&i))
    }

    /// Dependencies on IDs missing from the document: `(dependent, missing)`
    pub fn unresolved(&self) -> &[(TaskId, TaskId)] {
        &self.unresolved
    }

    /// Maximum cumulative effort along any chain ending at the task
    ///
    /// `None` for tasks on a cycle.
    pub fn depth(&self, task_id: &TaskId) -> Option<u64> {
        self.index_of(task_id).and_then(|i| self.depth[i])
    }

    /// Number of edges on the longest chain ending at the task
    pub fn level(&self, task_id: &TaskId) -> Option<usize> {
        self.index_of(task_id).and_then(|i| self.level[i])
    }

    /// Returns the direct dependents of a task (tasks that depend on it)
    pub fn dependents(&self, task_id: &TaskId) -> Vec<&TaskId> {
        self.index_of(task_id)
            .map(|i| {
                self.dependent_indices(i)
                    .into_iter()
                    .map(|d| &self.tasks[d].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Declared dependencies that are not completed or not declared at all
    pub fn blockers(&self, task_id: &TaskId) -> Vec<&TaskId> {
        let Some(task) = self.task(task_id) else {
            return Vec::new();
        };
        task.depends_on
            .iter()
            .filter(|dep| {
                self.task(dep)
                    .map_or(true, |t| !t.status.is_complete())
            })
            .collect()
    }

    /// Tasks with dependencies before dependents; cyclic tasks come last
    pub fn topological_order(&self) -> Vec<&Task> {
        self.order.iter().map(|&i| &self.tasks[i]).collect()
    }

    /// All resolved edges, grouped by dependent in position order
    pub fn edges(&self) -> Vec<Edge<'_>> {
        (0..self.tasks.len())
            .flat_map(|i| {
                self.dependency_indices(i).into_iter().map(move |d| Edge {
                    dependency: &self.tasks[d].id,
                    dependent: &self.tasks[i].id,
                    cyclic: match (self.cycle_component.get(&d), self.cycle_component.get(&i)) {
                        (Some(a), Some(b)) => a == b,
                        _ => false,
                    },
                })
            })
            .collect()
    }

    /// The longest effort-weighted chain in the acyclic part, root first
    pub fn critical_path(&self) -> Vec<TaskId> {
        let end = (0..self.tasks.len())
            .filter_map(|i| self.depth[i].map(|d| (d, Reverse(i))))
            .max()
            .map(|(_, Reverse(i))| i);

        let Some(mut node) = end else {
            return Vec::new();
        };

        let mut path = vec![node];
        loop {
            let next = self
                .dependency_indices(node)
                .into_iter()
                .filter_map(|d| self.depth[d].map(|depth| (depth, Reverse(d))))
                .max()
                .map(|(_, Reverse(d))| d);
            match next {
                Some(d) => {
                    path.push(d);
                    node = d;
                }
                None => break,
            }
        }

        path.reverse();
        path.into_iter().map(|i| self.tasks[i].id.clone()).collect()
    }

    /// Snapshot of readiness, cycles and depths
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            ready: self.ready_tasks().map(|t| t.id.clone()).collect(),
            blocked: self.blocked_tasks().map(|t| t.id.clone()).collect(),
            cycles: self.cycles.clone(),
            depth: self
                .tasks
                .iter()
                .zip(&self.depth)
                .filter_map(|(t, d)| d.map(|d| (t.id.clone(), d)))
                .collect(),
            unresolved: self.unresolved.clone(),
            critical_path: self.critical_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}
