//! Work Breakdown Structure maintenance.
//!
//! All operations work on the ordered task list in place. The order is the
//! outline: a task's children are the contiguous run of following tasks with
//! a strictly greater `wbs_level`. Structural edits (`indent`, `outdent`,
//! `move_task`, `sort_waterfall`, inserts, deletes) must be followed by
//! [`recalculate_all`] before scheduling, since the scheduler trusts
//! `is_summary` and `parent_id`.

use chrono::NaiveDate;

use crate::models::{Task, TaskId};

/// Assign dot-notation outline numbers ("1", "1.1", "1.2", "2", ...).
pub fn recalculate_numbering(tasks: &mut [Task]) {
    let mut counters: Vec<u32> = Vec::new();

    for task in tasks.iter_mut() {
        let level = task.wbs_level;
        if counters.len() <= level {
            counters.resize(level + 1, 0);
        }
        counters[level] += 1;
        for deeper in counters.iter_mut().skip(level + 1) {
            *deeper = 0;
        }

        task.wbs = counters[..=level]
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
    }
}

/// A task is a summary iff the next task sits deeper in the outline.
pub fn update_summary_flags(tasks: &mut [Task]) {
    let levels: Vec<usize> = tasks.iter().map(|t| t.wbs_level).collect();
    for (i, task) in tasks.iter_mut().enumerate() {
        task.is_summary = levels.get(i + 1).is_some_and(|&next| next > levels[i]);
    }
}

/// Derive `parent_id` from the level sequence.
pub fn update_parent_ids(tasks: &mut [Task]) {
    // parents[level] = parent of the next task seen at that level
    let mut parents: Vec<Option<TaskId>> = vec![None];

    for task in tasks.iter_mut() {
        let level = task.wbs_level;
        parents.truncate(level + 1);
        while parents.len() <= level {
            // Skipped levels inherit the nearest ancestor
            let nearest = parents.last().copied().flatten();
            parents.push(nearest);
        }

        task.parent_id = if level > 0 { parents[level] } else { None };
        parents.push(Some(task.id));
    }
}

/// Make the task at `index` a child of its predecessor row.
///
/// Fails for the first row, an out-of-range index, or when the task is
/// already deeper than the row above. The task's own children move with it.
pub fn indent(tasks: &mut [Task], index: usize) -> bool {
    if index == 0 || index >= tasks.len() {
        return false;
    }
    let old_level = tasks[index].wbs_level;
    if old_level > tasks[index - 1].wbs_level {
        return false;
    }

    tasks[index].wbs_level += 1;
    for child in tasks[index + 1..].iter_mut() {
        if child.wbs_level <= old_level {
            break;
        }
        child.wbs_level += 1;
    }
    true
}

/// Move the task at `index` up one outline level, together with its children.
pub fn outdent(tasks: &mut [Task], index: usize) -> bool {
    let Some(task) = tasks.get_mut(index) else {
        return false;
    };
    if task.wbs_level == 0 {
        return false;
    }
    let old_level = task.wbs_level;
    task.wbs_level -= 1;

    for child in tasks[index + 1..].iter_mut() {
        if child.wbs_level <= old_level {
            break;
        }
        child.wbs_level -= 1;
    }
    true
}

/// Numbering, then summary flags, then parent ids.
pub fn recalculate_all(tasks: &mut [Task]) {
    recalculate_numbering(tasks);
    update_summary_flags(tasks);
    update_parent_ids(tasks);
}

/// Move a single row from `from` to the drop position `to`.
///
/// `to` is a position in the list before removal, so dropping below the
/// source shifts the insert point up by one. Only the row moves; levels are
/// left as they are.
pub fn move_task(tasks: &mut Vec<Task>, from: usize, to: usize) -> bool {
    if from == to || from >= tasks.len() || to > tasks.len() {
        return false;
    }
    let task = tasks.remove(from);
    let target = if from < to { to - 1 } else { to };
    tasks.insert(target, task);
    true
}

/// Reorder the outline so siblings run by ascending start date.
///
/// Siblings compare by `(start_date, end_date, id)` with undated tasks last;
/// every task keeps its subtree directly beneath it.
pub fn sort_waterfall(tasks: &mut Vec<Task>) {
    let n = tasks.len();
    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut open: Vec<usize> = Vec::new();

    for (i, task) in tasks.iter().enumerate() {
        while open
            .last()
            .is_some_and(|&top| tasks[top].wbs_level >= task.wbs_level)
        {
            open.pop();
        }
        match open.last() {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }
        open.push(i);
    }

    let key = |i: &usize| {
        let t = &tasks[*i];
        (
            t.start_date.unwrap_or(NaiveDate::MAX),
            t.end_date.unwrap_or(NaiveDate::MAX),
            t.id,
        )
    };
    roots.sort_by_key(key);
    for group in children.iter_mut() {
        group.sort_by_key(key);
    }

    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().rev());
    }

    let mut slots: Vec<Option<Task>> = tasks.drain(..).map(Some).collect();
    tasks.extend(order.into_iter().filter_map(|i| slots[i].take()));
}
