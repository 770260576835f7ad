//! Summary task rollup.

use rustc_hash::FxHashMap;

use crate::calendar::{count_working_days, Calendar};
use crate::log_changes;
use crate::models::{Task, TaskId};

/// Derive every summary task's dates, duration, progress and critical flag
/// from its direct children.
///
/// Summaries are visited deepest level first so nested summaries are settled
/// before their parents read them. Start and end roll up independently; a side
/// no child has a date for is left as it was. Returns the number of summaries
/// with at least one child.
pub fn rollup_summaries(tasks: &mut [Task], calendar: &Calendar, verbosity: u8) -> usize {
    let mut children: FxHashMap<TaskId, Vec<usize>> = FxHashMap::default();
    for (i, task) in tasks.iter().enumerate() {
        if let Some(parent) = task.parent_id {
            children.entry(parent).or_default().push(i);
        }
    }

    let mut summaries: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_summary)
        .map(|(i, _)| i)
        .collect();
    summaries.sort_by_key(|&i| std::cmp::Reverse(tasks[i].wbs_level));

    let mut rolled = 0;
    for i in summaries {
        let Some(kids) = children.get(&tasks[i].id) else {
            continue;
        };

        let start = kids.iter().filter_map(|&c| tasks[c].start_date).min();
        let end = kids.iter().filter_map(|&c| tasks[c].end_date).max();

        let total_duration: i64 = kids.iter().map(|&c| tasks[c].duration.max(0)).sum();
        let progress = if total_duration > 0 {
            kids.iter()
                .map(|&c| tasks[c].progress * tasks[c].duration.max(0) as f64)
                .sum::<f64>()
                / total_duration as f64
        } else {
            tasks[i].progress
        };
        let critical = kids.iter().any(|&c| tasks[c].is_critical);

        let summary = &mut tasks[i];
        if start.is_some() {
            summary.start_date = start;
        }
        if end.is_some() {
            summary.end_date = end;
        }
        if let (Some(s), Some(e)) = (summary.start_date, summary.end_date) {
            summary.duration = count_working_days(s, e, calendar);
        }
        summary.progress = progress;
        summary.is_critical = critical;
        rolled += 1;

        log_changes!(
            verbosity,
            "  summary {} ({}): {:?} -> {:?}, {}d, {:.1}%",
            summary.id,
            summary.wbs,
            summary.start_date,
            summary.end_date,
            summary.duration,
            progress
        );
    }
    rolled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wbs::recalculate_all;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn leaf(id: TaskId, level: usize, start: NaiveDate, end: NaiveDate, duration: i64) -> Task {
        let mut task = Task::new(id, format!("t{}", id), duration);
        task.wbs_level = level;
        task.start_date = Some(start);
        task.end_date = Some(end);
        task
    }

    #[test]
    fn test_rollup_single_level() {
        let mut parent = Task::new(1, "Phase", 1);
        parent.wbs_level = 0;
        let mut a = leaf(2, 1, date(2024, 1, 1), date(2024, 1, 5), 5);
        a.progress = 100.0;
        let mut b = leaf(3, 1, date(2024, 1, 8), date(2024, 1, 12), 5);
        b.is_critical = true;

        let mut tasks = vec![parent, a, b];
        recalculate_all(&mut tasks);
        let rolled = rollup_summaries(&mut tasks, &Calendar::default(), 0);

        assert_eq!(rolled, 1);
        assert_eq!(tasks[0].start_date, Some(date(2024, 1, 1)));
        assert_eq!(tasks[0].end_date, Some(date(2024, 1, 12)));
        assert_eq!(tasks[0].duration, 10);
        assert!((tasks[0].progress - 50.0).abs() < 1e-9);
        assert!(tasks[0].is_critical);
    }

    #[test]
    fn test_rollup_nested_deepest_first() {
        let mut tasks = vec![
            Task::new(1, "Project", 1),
            Task::new(2, "Phase", 1),
            leaf(3, 2, date(2024, 1, 2), date(2024, 1, 3), 2),
            leaf(4, 1, date(2024, 1, 10), date(2024, 1, 11), 2),
        ];
        tasks[1].wbs_level = 1;
        recalculate_all(&mut tasks);

        let rolled = rollup_summaries(&mut tasks, &Calendar::default(), 0);
        assert_eq!(rolled, 2);
        assert_eq!(tasks[1].start_date, Some(date(2024, 1, 2)));
        assert_eq!(tasks[1].end_date, Some(date(2024, 1, 3)));
        assert_eq!(tasks[0].start_date, Some(date(2024, 1, 2)));
        assert_eq!(tasks[0].end_date, Some(date(2024, 1, 11)));
        assert!(!tasks[0].is_critical);
    }

    #[test]
    fn test_rollup_undated_children_still_roll_progress_and_criticality() {
        let mut tasks = vec![Task::new(1, "Phase", 1), Task::new(2, "Child", 1)];
        tasks[1].wbs_level = 1;
        recalculate_all(&mut tasks);
        tasks[0].start_date = Some(date(2024, 5, 1));
        tasks[1].manual_scheduling = true;
        tasks[1].progress = 40.0;
        tasks[1].is_critical = true;

        assert_eq!(rollup_summaries(&mut tasks, &Calendar::default(), 0), 1);
        // No child date: the summary keeps its own
        assert_eq!(tasks[0].start_date, Some(date(2024, 5, 1)));
        assert_eq!(tasks[0].end_date, None);
        assert!(tasks[0].is_critical);
        assert!((tasks[0].progress - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_rollup_start_and_end_independently() {
        let mut tasks = vec![
            Task::new(1, "Phase", 1),
            Task::new(2, "Starts", 1),
            Task::new(3, "Ends", 1),
        ];
        tasks[1].wbs_level = 1;
        tasks[2].wbs_level = 1;
        recalculate_all(&mut tasks);
        tasks[1].start_date = Some(date(2024, 1, 2));
        tasks[2].end_date = Some(date(2024, 1, 5));

        rollup_summaries(&mut tasks, &Calendar::default(), 0);
        assert_eq!(tasks[0].start_date, Some(date(2024, 1, 2)));
        assert_eq!(tasks[0].end_date, Some(date(2024, 1, 5)));
        assert_eq!(tasks[0].duration, 4);
    }
}
