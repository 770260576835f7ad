//! Types for critical path scheduling.

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::models::TaskId;

/// Per-task dates from the forward and backward passes.
#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest possible start (forward pass).
    #[pyo3(get)]
    pub early_start: NaiveDate,
    /// Earliest possible finish (forward pass).
    #[pyo3(get)]
    pub early_finish: NaiveDate,
    /// Latest allowable start (backward pass).
    #[pyo3(get)]
    pub late_start: NaiveDate,
    /// Latest allowable finish (backward pass).
    #[pyo3(get)]
    pub late_finish: NaiveDate,
    /// Calendar days between late and early start.
    #[pyo3(get)]
    pub total_float: i64,
}

#[pymethods]
impl TaskTiming {
    /// Zero or negative float puts the task on the critical path.
    pub fn is_critical(&self) -> bool {
        self.total_float <= 0
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskTiming(es={}, ef={}, ls={}, lf={}, float={})",
            self.early_start, self.early_finish, self.late_start, self.late_finish, self.total_float
        )
    }
}

/// Outcome of a scheduling pass.
///
/// The pass never fails; anything it had to ignore is reported here.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleReport {
    /// Tasks that went through the forward/backward passes.
    #[pyo3(get)]
    pub scheduled_tasks: usize,
    /// Summary tasks whose dates were rolled up from children.
    #[pyo3(get)]
    pub rolled_up_summaries: usize,
    /// Latest early finish over all scheduled tasks.
    #[pyo3(get)]
    pub project_end: Option<NaiveDate>,
    /// Ids of scheduled tasks with zero or negative float, in schedule order.
    #[pyo3(get)]
    pub critical_task_ids: Vec<TaskId>,
    /// Dependencies skipped because an endpoint is not in the task list.
    #[pyo3(get)]
    pub dropped_dependencies: usize,
    /// (predecessor, successor) links ignored because they close a cycle.
    #[pyo3(get)]
    pub cycle_edges: Vec<(TaskId, TaskId)>,
    #[pyo3(get)]
    pub timings: HashMap<TaskId, TaskTiming>,
}

#[pymethods]
impl ScheduleReport {
    pub fn has_cycles(&self) -> bool {
        !self.cycle_edges.is_empty()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleReport(scheduled={}, critical={}, project_end={:?}, dropped={}, cycles={})",
            self.scheduled_tasks,
            self.critical_task_ids.len(),
            self.project_end,
            self.dropped_dependencies,
            self.cycle_edges.len()
        )
    }
}
