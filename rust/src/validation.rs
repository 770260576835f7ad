//! Strict checks over a task list and its dependencies.
//!
//! Scheduling itself tolerates bad references and cycles; these functions let
//! callers reject such input up front.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use thiserror::Error;

use crate::critical_path::DependencyGraph;
use crate::models::{Dependency, Task, TaskId};

/// Reasons a dependency network is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(TaskId),
    #[error("Dependency {predecessor} -> {successor} references an unknown task")]
    UnknownTask {
        predecessor: TaskId,
        successor: TaskId,
    },
    #[error("Task {0} depends on itself")]
    SelfDependency(TaskId),
    #[error("Circular dependency detected: {0:?}")]
    CircularDependency(Vec<TaskId>),
}

/// Check ids are unique, every dependency resolves and the network is acyclic.
pub fn validate_dependencies(
    tasks: &[Task],
    dependencies: &[Dependency],
) -> Result<(), ValidationError> {
    let mut seen: FxHashSet<TaskId> = FxHashSet::default();
    for task in tasks {
        if !seen.insert(task.id) {
            return Err(ValidationError::DuplicateTaskId(task.id));
        }
    }

    for dep in dependencies {
        if !seen.contains(&dep.predecessor_id) || !seen.contains(&dep.successor_id) {
            return Err(ValidationError::UnknownTask {
                predecessor: dep.predecessor_id,
                successor: dep.successor_id,
            });
        }
        if dep.predecessor_id == dep.successor_id {
            return Err(ValidationError::SelfDependency(dep.predecessor_id));
        }
    }

    match find_cycle(tasks, dependencies) {
        Some(cycle) => Err(ValidationError::CircularDependency(cycle)),
        None => Ok(()),
    }
}

/// Whether adding `predecessor -> successor` would close a cycle.
///
/// True for a self-link or when `predecessor` is already reachable from
/// `successor` along existing links.
pub fn would_create_cycle(
    dependencies: &[Dependency],
    predecessor: TaskId,
    successor: TaskId,
) -> bool {
    if predecessor == successor {
        return true;
    }

    let mut successors: FxHashMap<TaskId, Vec<TaskId>> = FxHashMap::default();
    for dep in dependencies {
        successors
            .entry(dep.predecessor_id)
            .or_default()
            .push(dep.successor_id);
    }

    let mut visited: FxHashSet<TaskId> = FxHashSet::default();
    let mut queue: VecDeque<TaskId> = VecDeque::from([successor]);
    visited.insert(successor);

    while let Some(current) = queue.pop_front() {
        if current == predecessor {
            return true;
        }
        for &next in successors.get(&current).into_iter().flatten() {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// Ids along one dependency cycle, in link order, if the network has any.
pub fn find_cycle(tasks: &[Task], dependencies: &[Dependency]) -> Option<Vec<TaskId>> {
    let graph = DependencyGraph::build(tasks, dependencies);
    graph
        .find_cycle()
        .map(|cycle| cycle.into_iter().map(|pos| graph.task_id(pos)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tasks(ids: &[TaskId]) -> Vec<Task> {
        ids.iter().map(|&id| Task::new(id, format!("t{}", id), 1)).collect()
    }

    #[test]
    fn test_valid_network() {
        let tasks = make_tasks(&[1, 2, 3]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(1, 3),
        ];
        assert_eq!(validate_dependencies(&tasks, &deps), Ok(()));
    }

    #[test]
    fn test_duplicate_id() {
        let tasks = make_tasks(&[1, 2, 1]);
        assert_eq!(
            validate_dependencies(&tasks, &[]),
            Err(ValidationError::DuplicateTaskId(1))
        );
    }

    #[test]
    fn test_unknown_endpoint() {
        let tasks = make_tasks(&[1]);
        let deps = vec![Dependency::finish_to_start(1, 9)];
        assert_eq!(
            validate_dependencies(&tasks, &deps),
            Err(ValidationError::UnknownTask {
                predecessor: 1,
                successor: 9
            })
        );
    }

    #[test]
    fn test_self_dependency() {
        let tasks = make_tasks(&[4]);
        let deps = vec![Dependency::finish_to_start(4, 4)];
        assert_eq!(
            validate_dependencies(&tasks, &deps),
            Err(ValidationError::SelfDependency(4))
        );
    }

    #[test]
    fn test_cycle_rejected() {
        let tasks = make_tasks(&[1, 2, 3]);
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
            Dependency::finish_to_start(3, 1),
        ];
        let err = validate_dependencies(&tasks, &deps).unwrap_err();
        assert_eq!(err, ValidationError::CircularDependency(vec![1, 2, 3]));
        assert!(err.to_string().contains("Circular dependency"));
    }

    #[test]
    fn test_would_create_cycle() {
        let deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
        ];
        assert!(would_create_cycle(&deps, 3, 1));
        assert!(would_create_cycle(&deps, 2, 2));
        assert!(!would_create_cycle(&deps, 1, 3));
        assert!(!would_create_cycle(&deps, 4, 1));
    }
}
