//! Baseline snapshots and slip against them.

use chrono::NaiveDate;
use pyo3::prelude::*;

use crate::calendar::{is_working_day, Calendar};
use crate::models::{Task, TaskId};

/// Slip of a task against its baseline, in working days (positive = late).
#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaselineVariance {
    #[pyo3(get)]
    pub task_id: TaskId,
    #[pyo3(get)]
    pub start_variance: i64,
    #[pyo3(get)]
    pub finish_variance: i64,
    /// Current duration minus baseline duration; 0 when no baseline duration was saved.
    #[pyo3(get)]
    pub duration_variance: i64,
}

#[pymethods]
impl BaselineVariance {
    pub fn is_late(&self) -> bool {
        self.finish_variance > 0
    }

    fn __repr__(&self) -> String {
        format!(
            "BaselineVariance(task_id={}, start={:+}, finish={:+}, duration={:+})",
            self.task_id, self.start_variance, self.finish_variance, self.duration_variance
        )
    }
}

/// Snapshot current dates and durations into the baseline fields.
pub fn set_baseline(tasks: &mut [Task]) {
    for task in tasks.iter_mut() {
        task.baseline_start = task.start_date;
        task.baseline_end = task.end_date;
        task.baseline_duration = Some(task.duration);
    }
}

/// Working days in `(from, to]`, negated when `to` is before `from`.
fn working_day_offset(from: NaiveDate, to: NaiveDate, calendar: &Calendar) -> i64 {
    let (low, high, sign) = if to >= from {
        (from, to, 1)
    } else {
        (to, from, -1)
    };
    let count = low
        .iter_days()
        .skip(1)
        .take_while(|d| *d <= high)
        .filter(|d| is_working_day(*d, calendar))
        .count() as i64;
    sign * count
}

/// Variance of `task` against its baseline, if both snapshot and current dates exist.
pub fn baseline_variance(task: &Task, calendar: &Calendar) -> Option<BaselineVariance> {
    let (Some(base_start), Some(base_end)) = (task.baseline_start, task.baseline_end) else {
        return None;
    };
    let (Some(start), Some(end)) = (task.start_date, task.end_date) else {
        return None;
    };

    Some(BaselineVariance {
        task_id: task.id,
        start_variance: working_day_offset(base_start, start, calendar),
        finish_variance: working_day_offset(base_end, end, calendar),
        duration_variance: task
            .baseline_duration
            .map_or(0, |base| task.duration - base),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dated_task(start: NaiveDate, end: NaiveDate, duration: i64) -> Task {
        let mut task = Task::new(1, "Build", duration);
        task.start_date = Some(start);
        task.end_date = Some(end);
        task
    }

    #[test]
    fn test_set_baseline_snapshot() {
        let mut tasks = vec![dated_task(date(2024, 1, 1), date(2024, 1, 5), 5)];
        set_baseline(&mut tasks);
        assert_eq!(tasks[0].baseline_start, Some(date(2024, 1, 1)));
        assert_eq!(tasks[0].baseline_end, Some(date(2024, 1, 5)));
        assert_eq!(tasks[0].baseline_duration, Some(5));
    }

    #[test]
    fn test_variance_across_weekend() {
        let calendar = Calendar::default();
        let mut tasks = vec![dated_task(date(2024, 1, 1), date(2024, 1, 5), 5)];
        set_baseline(&mut tasks);

        let task = &mut tasks[0];
        task.start_date = Some(date(2024, 1, 4));
        task.end_date = Some(date(2024, 1, 9));
        task.duration = 4;

        let variance = baseline_variance(task, &calendar).unwrap();
        assert_eq!(variance.start_variance, 3);
        assert_eq!(variance.finish_variance, 2);
        assert_eq!(variance.duration_variance, -1);
        assert!(variance.is_late());
    }

    #[test]
    fn test_variance_early_is_negative() {
        let calendar = Calendar::default();
        let mut task = dated_task(date(2024, 1, 8), date(2024, 1, 8), 1);
        set_baseline(std::slice::from_mut(&mut task));
        task.start_date = Some(date(2024, 1, 5));
        task.end_date = Some(date(2024, 1, 5));

        let variance = baseline_variance(&task, &calendar).unwrap();
        assert_eq!(variance.start_variance, -1);
        assert!(!variance.is_late());
    }

    #[test]
    fn test_variance_requires_baseline() {
        let task = dated_task(date(2024, 1, 1), date(2024, 1, 5), 5);
        assert!(baseline_variance(&task, &Calendar::default()).is_none());
    }
}
