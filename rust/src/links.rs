//! Dependency list editing and the predecessor column notation.
//!
//! The notation is a comma-separated list of `<id>[TYPE][+/-lag][d]` items,
//! e.g. `"1FS, 2SS+3d, 4FF-1d"`. The type defaults to FS and the lag to 0.

use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

use crate::models::{Dependency, DependencyType, TaskId};

static PREDECESSOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(FS|FF|SS|SF)?\s*([+-]\d+)?d?").unwrap()
});

/// Chain `ids` with finish-to-start links in the given order.
///
/// Pairs that are already linked (any type) are skipped. Returns the number
/// of dependencies added.
pub fn link_tasks(dependencies: &mut Vec<Dependency>, ids: &[TaskId]) -> usize {
    let mut added = 0;
    for pair in ids.windows(2) {
        let (pred, succ) = (pair[0], pair[1]);
        if pred == succ {
            continue;
        }
        let exists = dependencies
            .iter()
            .any(|d| d.predecessor_id == pred && d.successor_id == succ);
        if !exists {
            dependencies.push(Dependency::finish_to_start(pred, succ));
            added += 1;
        }
    }
    added
}

/// Remove every dependency whose two endpoints are both in `ids`.
pub fn unlink_tasks(dependencies: &mut Vec<Dependency>, ids: &[TaskId]) -> usize {
    let selected: FxHashSet<TaskId> = ids.iter().copied().collect();
    let before = dependencies.len();
    dependencies.retain(|d| {
        !(selected.contains(&d.predecessor_id) && selected.contains(&d.successor_id))
    });
    before - dependencies.len()
}

/// Remove every dependency touching `id`, e.g. after deleting the task.
pub fn remove_task_links(dependencies: &mut Vec<Dependency>, id: TaskId) -> usize {
    let before = dependencies.len();
    dependencies.retain(|d| d.predecessor_id != id && d.successor_id != id);
    before - dependencies.len()
}

/// Predecessor column text for `successor_id`, in dependency list order.
pub fn format_predecessors(successor_id: TaskId, dependencies: &[Dependency]) -> String {
    dependencies
        .iter()
        .filter(|d| d.successor_id == successor_id)
        .map(Dependency::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse predecessor column text into dependencies ending at `successor_id`.
///
/// Items naming an id outside `valid_ids`, the successor itself, or not
/// matching the notation are skipped.
pub fn parse_predecessors(
    successor_id: TaskId,
    text: &str,
    valid_ids: &FxHashSet<TaskId>,
) -> Vec<Dependency> {
    let mut dependencies = Vec::new();

    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some(caps) = PREDECESSOR_REGEX.captures(part) else {
            continue;
        };
        let Ok(predecessor_id) = caps[1].parse::<TaskId>() else {
            continue;
        };
        if predecessor_id == successor_id || !valid_ids.contains(&predecessor_id) {
            continue;
        }
        let dep_type = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(DependencyType::FS);
        let lag = caps
            .get(3)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0);

        dependencies.push(Dependency::new(predecessor_id, successor_id, dep_type, lag));
    }

    dependencies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[TaskId]) -> FxHashSet<TaskId> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_link_tasks_skips_existing() {
        let mut deps = vec![Dependency::new(2, 3, DependencyType::SS, 1)];
        let added = link_tasks(&mut deps, &[1, 2, 3]);
        assert_eq!(added, 1);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[1], Dependency::finish_to_start(1, 2));
        assert_eq!(deps[0].dep_type, DependencyType::SS);
    }

    #[test]
    fn test_unlink_tasks_within_selection() {
        let mut deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
            Dependency::finish_to_start(3, 4),
        ];
        let removed = unlink_tasks(&mut deps, &[1, 2, 3]);
        assert_eq!(removed, 2);
        assert_eq!(deps, vec![Dependency::finish_to_start(3, 4)]);
    }

    #[test]
    fn test_remove_task_links() {
        let mut deps = vec![
            Dependency::finish_to_start(1, 2),
            Dependency::finish_to_start(2, 3),
            Dependency::finish_to_start(1, 3),
        ];
        assert_eq!(remove_task_links(&mut deps, 2), 2);
        assert_eq!(deps, vec![Dependency::finish_to_start(1, 3)]);
    }

    #[test]
    fn test_format_predecessors() {
        let deps = vec![
            Dependency::finish_to_start(1, 5),
            Dependency::new(2, 5, DependencyType::SS, 3),
            Dependency::finish_to_start(1, 6),
            Dependency::new(4, 5, DependencyType::FF, -1),
        ];
        assert_eq!(format_predecessors(5, &deps), "1FS, 2SS+3d, 4FF-1d");
        assert_eq!(format_predecessors(9, &deps), "");
    }

    #[test]
    fn test_parse_predecessors() {
        let valid = ids(&[1, 2, 4, 5]);
        let deps = parse_predecessors(5, "1, 2ss+3d, 4 FF -1, 7FS, junk, 5", &valid);
        assert_eq!(
            deps,
            vec![
                Dependency::finish_to_start(1, 5),
                Dependency::new(2, 5, DependencyType::SS, 3),
                Dependency::new(4, 5, DependencyType::FF, -1),
            ]
        );
    }

    #[test]
    fn test_format_then_parse_preserves_links() {
        let deps = vec![
            Dependency::new(3, 8, DependencyType::SF, 2),
            Dependency::new(6, 8, DependencyType::FS, -4),
        ];
        let text = format_predecessors(8, &deps);
        assert_eq!(parse_predecessors(8, &text, &ids(&[3, 6])), deps);
    }
}
