//! Dense positions for task ids.
//!
//! Maps caller-assigned task ids to contiguous integers so the scheduling
//! passes can keep their per-task state in plain vectors.

use rustc_hash::FxHashMap;

use crate::models::{Task, TaskId};

/// Position of a task inside a [`TaskIndex`] (u32 for compact storage).
pub type TaskPos = u32;

/// Bidirectional task id <-> position map.
#[derive(Debug, Clone)]
pub struct TaskIndex {
    to_pos: FxHashMap<TaskId, TaskPos>,
    ids: Vec<TaskId>,
}

impl TaskIndex {
    /// Create a new index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_pos: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Index the tasks in list order. A repeated id keeps its first position.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut index = Self::with_capacity(tasks.len());
        for task in tasks {
            index.insert(task.id);
        }
        index
    }

    /// Insert an id, returning its position.
    /// If already present, returns the existing position.
    pub fn insert(&mut self, id: TaskId) -> TaskPos {
        if let Some(&pos) = self.to_pos.get(&id) {
            return pos;
        }
        let pos = self.ids.len() as TaskPos;
        self.ids.push(id);
        self.to_pos.insert(id, pos);
        pos
    }

    /// Get the position for an id, if it exists.
    #[inline]
    pub fn get(&self, id: TaskId) -> Option<TaskPos> {
        self.to_pos.get(&id).copied()
    }

    /// Get the id stored at a position.
    #[inline]
    pub fn resolve(&self, pos: TaskPos) -> Option<TaskId> {
        self.ids.get(pos as usize).copied()
    }

    /// Number of indexed ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for TaskIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let mut index = TaskIndex::with_capacity(10);

        let a = index.insert(40);
        let b = index.insert(7);
        let again = index.insert(40); // duplicate

        assert_eq!(a, again);
        assert_ne!(a, b);

        assert_eq!(index.resolve(a), Some(40));
        assert_eq!(index.resolve(b), Some(7));
        assert_eq!(index.get(7), Some(b));
        assert_eq!(index.get(99), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_from_tasks_keeps_list_order() {
        let tasks = vec![Task::new(5, "a", 1), Task::new(2, "b", 1), Task::new(5, "dup", 1)];
        let index = TaskIndex::from_tasks(&tasks);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(5), Some(0));
        assert_eq!(index.get(2), Some(1));
    }
}
