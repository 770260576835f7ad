//! Dependency graph construction and ordering.

use rustc_hash::FxHashMap;

use crate::index::{TaskIndex, TaskPos};
use crate::models::{Dependency, DependencyType, Task, TaskId};

/// One adjacency entry: the task on the other end plus the link semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub other: TaskPos,
    pub dep_type: DependencyType,
    pub lag: i64,
}

/// Predecessor and successor adjacency over dense task positions.
///
/// Dependencies naming an unknown task are not stored; `dropped` counts them.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub index: TaskIndex,
    /// Position -> index into the task slice the graph was built from.
    slots: Vec<usize>,
    pub preds: Vec<Vec<Edge>>,
    pub succs: Vec<Vec<Edge>>,
    pub dropped: usize,
}

impl DependencyGraph {
    pub fn build(tasks: &[Task], dependencies: &[Dependency]) -> Self {
        let mut index = TaskIndex::with_capacity(tasks.len());
        let mut slots = Vec::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.get(task.id).is_none() {
                index.insert(task.id);
                slots.push(i);
            }
        }

        let n = index.len();
        let mut preds: Vec<Vec<Edge>> = vec![Vec::new(); n];
        let mut succs: Vec<Vec<Edge>> = vec![Vec::new(); n];
        let mut dropped = 0;

        for dep in dependencies {
            let (Some(pred), Some(succ)) =
                (index.get(dep.predecessor_id), index.get(dep.successor_id))
            else {
                dropped += 1;
                continue;
            };
            preds[succ as usize].push(Edge {
                other: pred,
                dep_type: dep.dep_type,
                lag: dep.lag,
            });
            succs[pred as usize].push(Edge {
                other: succ,
                dep_type: dep.dep_type,
                lag: dep.lag,
            });
        }

        Self {
            index,
            slots,
            preds,
            succs,
            dropped,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Index into the original task slice for a position.
    #[inline]
    pub fn slot(&self, pos: TaskPos) -> usize {
        self.slots[pos as usize]
    }

    #[inline]
    pub fn task_id(&self, pos: TaskPos) -> TaskId {
        self.index.resolve(pos).unwrap_or_default()
    }

    /// Depth-first topological order starting from `roots`, in root order.
    ///
    /// Successor edges are followed iteratively; the post-order is reversed so
    /// every predecessor precedes its successors. Nodes unreachable from the
    /// roots are left out. Edges that close a cycle are recorded in the
    /// result and must be ignored by the passes consuming the order.
    pub fn topological_order(&self, roots: impl IntoIterator<Item = TaskPos>) -> TopoOrder {
        let n = self.len();
        let mut visited = vec![false; n];
        let mut postorder: Vec<TaskPos> = Vec::with_capacity(n);

        for root in roots {
            if visited[root as usize] {
                continue;
            }
            visited[root as usize] = true;
            let mut stack: Vec<(TaskPos, usize)> = vec![(root, 0)];

            loop {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let node = frame.0;
                let next_edge = frame.1;
                frame.1 += 1;

                match self.succs[node as usize].get(next_edge) {
                    Some(edge) => {
                        let child = edge.other as usize;
                        if !visited[child] {
                            visited[child] = true;
                            stack.push((edge.other, 0));
                        }
                    }
                    None => {
                        postorder.push(node);
                        stack.pop();
                    }
                }
            }
        }

        postorder.reverse();
        TopoOrder::new(postorder, self)
    }

    /// A cycle as a list of positions, following successor edges.
    pub fn find_cycle(&self) -> Option<Vec<TaskPos>> {
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;

        let n = self.len();
        let mut color = vec![WHITE; n];

        for root in 0..n as TaskPos {
            if color[root as usize] != WHITE {
                continue;
            }
            color[root as usize] = GRAY;
            let mut stack: Vec<(TaskPos, usize)> = vec![(root, 0)];

            loop {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let node = frame.0;
                let next_edge = frame.1;
                frame.1 += 1;

                match self.succs[node as usize].get(next_edge) {
                    Some(edge) => match color[edge.other as usize] {
                        WHITE => {
                            color[edge.other as usize] = GRAY;
                            stack.push((edge.other, 0));
                        }
                        GRAY => {
                            if let Some(start) = stack.iter().position(|f| f.0 == edge.other) {
                                return Some(stack[start..].iter().map(|f| f.0).collect());
                            }
                        }
                        _ => {}
                    },
                    None => {
                        color[node as usize] = BLACK;
                        stack.pop();
                    }
                }
            }
        }
        None
    }
}

/// A topological order plus the rank of every ordered position.
#[derive(Debug, Clone)]
pub struct TopoOrder {
    pub order: Vec<TaskPos>,
    rank: Vec<Option<usize>>,
    /// Edges (predecessor, successor) that point backwards in `order`.
    pub cycle_edges: Vec<(TaskPos, TaskPos)>,
}

impl TopoOrder {
    fn new(order: Vec<TaskPos>, graph: &DependencyGraph) -> Self {
        let mut rank = vec![None; graph.len()];
        for (i, &pos) in order.iter().enumerate() {
            rank[pos as usize] = Some(i);
        }

        let mut cycle_edges = Vec::new();
        for &pos in &order {
            for edge in &graph.succs[pos as usize] {
                if is_backward(&rank, pos, edge.other) {
                    cycle_edges.push((pos, edge.other));
                }
            }
        }

        Self {
            order,
            rank,
            cycle_edges,
        }
    }

    /// True when the edge `pred -> succ` closes a cycle (self-links included).
    #[inline]
    pub fn is_cycle_edge(&self, pred: TaskPos, succ: TaskPos) -> bool {
        is_backward(&self.rank, pred, succ)
    }

    pub fn contains(&self, pos: TaskPos) -> bool {
        self.rank[pos as usize].is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn is_backward(rank: &[Option<usize>], pred: TaskPos, succ: TaskPos) -> bool {
    match (rank[pred as usize], rank[succ as usize]) {
        (Some(p), Some(s)) => s <= p,
        _ => false,
    }
}

/// Longest-path layer of every task: tasks without predecessors sit on layer
/// 0, every other task one past its deepest predecessor. Edges closing a cycle
/// are ignored.
pub fn assign_layers(tasks: &[Task], dependencies: &[Dependency]) -> FxHashMap<TaskId, usize> {
    let graph = DependencyGraph::build(tasks, dependencies);
    let topo = graph.topological_order(0..graph.len() as TaskPos);

    let mut layers = vec![0usize; graph.len()];
    for &pos in &topo.order {
        let layer = graph.preds[pos as usize]
            .iter()
            .filter(|edge| !topo.is_cycle_edge(edge.other, pos))
            .map(|edge| layers[edge.other as usize] + 1)
            .max()
            .unwrap_or(0);
        layers[pos as usize] = layer;
    }

    topo.order
        .iter()
        .map(|&pos| (graph.task_id(pos), layers[pos as usize]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tasks(ids: &[TaskId]) -> Vec<Task> {
        ids.iter().map(|&id| Task::new(id, format!("t{}", id), 1)).collect()
    }

    fn order_ids(graph: &DependencyGraph, topo: &TopoOrder) -> Vec<TaskId> {
        topo.order.iter().map(|&p| graph.task_id(p)).collect()
    }

    #[test]
    fn test_build_drops_unknown_endpoints() {
        let tasks = make_tasks(&[1, 2]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(1, 99),
            Dependency::finish_to_start(42, 2),
        ];
        let graph = DependencyGraph::build(&tasks, &deps);
        assert_eq!(graph.dropped, 2);
        assert_eq!(graph.succs[0].len(), 1);
        assert_eq!(graph.preds[1].len(), 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first_slot() {
        let tasks = make_tasks(&[1, 2, 1]);
        let graph = DependencyGraph::build(&tasks, &[]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.slot(0), 0);
        assert_eq!(graph.slot(1), 1);
    }

    #[test]
    fn test_topological_order_respects_edges() {
        // Listed in reverse dependency order
        let tasks = make_tasks(&[3, 2, 1]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
        ];
        let graph = DependencyGraph::build(&tasks, &deps);
        let topo = graph.topological_order(0..3);
        assert_eq!(order_ids(&graph, &topo), vec![1, 2, 3]);
        assert!(topo.cycle_edges.is_empty());
    }

    #[test]
    fn test_topological_order_diamond() {
        let tasks = make_tasks(&[1, 2, 3, 4]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(1, 3),
            Dependency::finish_to_start(2, 4),
            Dependency::finish_to_start(3, 4),
        ];
        let graph = DependencyGraph::build(&tasks, &deps);
        let topo = graph.topological_order(0..4);
        let ids = order_ids(&graph, &topo);
        let rank = |id: TaskId| ids.iter().position(|&x| x == id).unwrap();
        assert_eq!(ids.len(), 4);
        assert!(rank(1) < rank(2));
        assert!(rank(1) < rank(3));
        assert!(rank(2) < rank(4));
        assert!(rank(3) < rank(4));
    }

    #[test]
    fn test_unreached_nodes_left_out() {
        let tasks = make_tasks(&[1, 2, 3]);
        let deps = vec![Dependency::finish_to_start(1, 2)];
        let graph = DependencyGraph::build(&tasks, &deps);
        // Only task 1 is a root; task 3 is unreachable from it
        let topo = graph.topological_order([0]);
        assert_eq!(order_ids(&graph, &topo), vec![1, 2]);
        assert!(!topo.contains(2));
    }

    #[test]
    fn test_cycle_edges_recorded() {
        let tasks = make_tasks(&[1, 2, 3]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
            Dependency::finish_to_start(3, 1),
        ];
        let graph = DependencyGraph::build(&tasks, &deps);
        let topo = graph.topological_order(0..3);
        assert_eq!(topo.len(), 3);
        assert_eq!(topo.cycle_edges, vec![(2, 0)]);
        assert!(topo.is_cycle_edge(2, 0));
        assert!(!topo.is_cycle_edge(0, 1));
    }

    #[test]
    fn test_self_link_is_cycle_edge() {
        let tasks = make_tasks(&[1]);
        let deps = vec![Dependency::finish_to_start(1, 1)];
        let graph = DependencyGraph::build(&tasks, &deps);
        let topo = graph.topological_order([0]);
        assert_eq!(topo.cycle_edges, vec![(0, 0)]);
    }

    #[test]
    fn test_find_cycle() {
        let tasks = make_tasks(&[1, 2, 3, 4]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
            Dependency::finish_to_start(3, 4),
            Dependency::finish_to_start(4, 2),
        ];
        let graph = DependencyGraph::build(&tasks, &deps);
        let cycle: Vec<TaskId> = graph
            .find_cycle()
            .unwrap()
            .into_iter()
            .map(|p| graph.task_id(p))
            .collect();
        assert_eq!(cycle, vec![2, 3, 4]);

        let acyclic = DependencyGraph::build(&tasks, &deps[..3]);
        assert!(acyclic.find_cycle().is_none());
    }

    #[test]
    fn test_assign_layers_longest_path() {
        let tasks = make_tasks(&[1, 2, 3, 4, 5]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
            Dependency::finish_to_start(1, 3),
            Dependency::finish_to_start(4, 3),
        ];
        let layers = assign_layers(&tasks, &deps);
        assert_eq!(layers[&1], 0);
        assert_eq!(layers[&2], 1);
        assert_eq!(layers[&3], 2);
        assert_eq!(layers[&4], 0);
        assert_eq!(layers[&5], 0);
    }

    #[test]
    fn test_assign_layers_with_cycle_terminates() {
        let tasks = make_tasks(&[1, 2]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 1),
        ];
        let layers = assign_layers(&tasks, &deps);
        assert_eq!(layers[&1], 0);
        assert_eq!(layers[&2], 1);
    }
}
