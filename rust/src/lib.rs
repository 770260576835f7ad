//! Rust implementation of the Bokmal scheduling engine.
//!
//! Provides working-day calendar arithmetic, WBS outline maintenance and a
//! Critical Path Method scheduler, usable as a Rust library and as the
//! `bokmal.rust` Python extension module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::HashSet;

pub mod baseline;
pub mod calendar;
mod config;
pub mod critical_path;
pub mod index;
pub mod links;
pub mod logging;
mod models;
pub mod validation;
pub mod wbs;

pub use baseline::{baseline_variance, set_baseline, BaselineVariance};
pub use calendar::{
    add_working_days, count_working_days, date_range, is_working_day, shift_working_days,
    subtract_working_days, Calendar,
};
pub use config::{BackwardPassMode, ConfigError, SchedulerConfig};
pub use critical_path::{
    assign_layers, schedule, CriticalPathScheduler, ScheduleReport, TaskTiming,
};
pub use index::{TaskIndex, TaskPos};
pub use links::{
    format_predecessors, link_tasks, parse_predecessors, remove_task_links, unlink_tasks,
};
pub use models::{ConstraintType, Dependency, DependencyType, ModelError, Task, TaskId};
pub use validation::{find_cycle, validate_dependencies, would_create_cycle, ValidationError};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Schedule tasks with the Critical Path Method.
///
/// # Arguments
/// * `tasks` - Ordered task list (WBS order, derived fields up to date)
/// * `dependencies` - Links between tasks; unknown endpoints are ignored
/// * `project_start` - Earliest start for any automatic task
/// * `calendar` - Working calendar (Mon-Fri, no holidays if omitted)
/// * `config` - Backward pass mode and verbosity
///
/// # Returns
/// * Tuple of (scheduled task list, ScheduleReport)
///
/// # Raises
/// * ValueError if the config names an unknown backward pass mode
#[pyfunction]
#[pyo3(name = "schedule", signature = (tasks, dependencies, project_start, calendar=None, config=None))]
fn py_schedule(
    mut tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    project_start: NaiveDate,
    calendar: Option<Calendar>,
    config: Option<SchedulerConfig>,
) -> PyResult<(Vec<Task>, ScheduleReport)> {
    let calendar = calendar.unwrap_or_default();
    let config = config.unwrap_or_default();
    let scheduler = CriticalPathScheduler::new(&calendar, &config).map_err(value_error)?;
    let report = scheduler.schedule(&mut tasks, &dependencies, project_start);
    Ok((tasks, report))
}

/// Recompute WBS numbers, summary flags and parent ids.
#[pyfunction]
fn recalculate_wbs(mut tasks: Vec<Task>) -> Vec<Task> {
    wbs::recalculate_all(&mut tasks);
    tasks
}

/// Indent the task at `index`. Returns (tasks, changed).
#[pyfunction]
fn indent_task(mut tasks: Vec<Task>, index: usize) -> (Vec<Task>, bool) {
    let changed = wbs::indent(&mut tasks, index);
    if changed {
        wbs::recalculate_all(&mut tasks);
    }
    (tasks, changed)
}

/// Outdent the task at `index`. Returns (tasks, changed).
#[pyfunction]
fn outdent_task(mut tasks: Vec<Task>, index: usize) -> (Vec<Task>, bool) {
    let changed = wbs::outdent(&mut tasks, index);
    if changed {
        wbs::recalculate_all(&mut tasks);
    }
    (tasks, changed)
}

/// Move one row to a drop position. Returns (tasks, changed).
#[pyfunction]
#[pyo3(name = "move_task")]
fn py_move_task(mut tasks: Vec<Task>, from_index: usize, to_index: usize) -> (Vec<Task>, bool) {
    let changed = wbs::move_task(&mut tasks, from_index, to_index);
    if changed {
        wbs::recalculate_all(&mut tasks);
    }
    (tasks, changed)
}

#[pyfunction]
#[pyo3(name = "sort_waterfall")]
fn py_sort_waterfall(mut tasks: Vec<Task>) -> Vec<Task> {
    wbs::sort_waterfall(&mut tasks);
    wbs::recalculate_all(&mut tasks);
    tasks
}

#[pyfunction]
#[pyo3(name = "is_working_day", signature = (date, calendar=None))]
fn py_is_working_day(date: NaiveDate, calendar: Option<Calendar>) -> bool {
    is_working_day(date, &calendar.unwrap_or_default())
}

/// End date of a task of `days` working days starting on `start`.
#[pyfunction]
#[pyo3(name = "add_working_days", signature = (start, days, calendar=None))]
fn py_add_working_days(start: NaiveDate, days: i64, calendar: Option<Calendar>) -> NaiveDate {
    add_working_days(start, days, &calendar.unwrap_or_default())
}

/// Start date of a task of `days` working days ending on `end`.
#[pyfunction]
#[pyo3(name = "subtract_working_days", signature = (end, days, calendar=None))]
fn py_subtract_working_days(end: NaiveDate, days: i64, calendar: Option<Calendar>) -> NaiveDate {
    subtract_working_days(end, days, &calendar.unwrap_or_default())
}

/// Working days in `[start, end]`; at least 1 unless `end` precedes `start`.
#[pyfunction]
#[pyo3(name = "count_working_days", signature = (start, end, calendar=None))]
fn py_count_working_days(start: NaiveDate, end: NaiveDate, calendar: Option<Calendar>) -> i64 {
    count_working_days(start, end, &calendar.unwrap_or_default())
}

/// Reject duplicate ids, unknown endpoints, self links and cycles.
///
/// # Raises
/// * ValueError describing the first problem found
#[pyfunction]
#[pyo3(name = "validate_dependencies")]
fn py_validate_dependencies(tasks: Vec<Task>, dependencies: Vec<Dependency>) -> PyResult<()> {
    validate_dependencies(&tasks, &dependencies).map_err(value_error)
}

#[pyfunction]
#[pyo3(name = "would_create_cycle")]
fn py_would_create_cycle(
    dependencies: Vec<Dependency>,
    predecessor_id: TaskId,
    successor_id: TaskId,
) -> bool {
    would_create_cycle(&dependencies, predecessor_id, successor_id)
}

/// Parse predecessor column text such as `"1FS, 2SS+3d"`.
#[pyfunction]
#[pyo3(name = "parse_predecessors")]
fn py_parse_predecessors(
    successor_id: TaskId,
    text: &str,
    valid_ids: HashSet<TaskId>,
) -> Vec<Dependency> {
    let valid_ids: FxHashSet<TaskId> = valid_ids.into_iter().collect();
    parse_predecessors(successor_id, text, &valid_ids)
}

#[pyfunction]
#[pyo3(name = "format_predecessors")]
fn py_format_predecessors(successor_id: TaskId, dependencies: Vec<Dependency>) -> String {
    format_predecessors(successor_id, &dependencies)
}

/// Chain the given task ids with FS links. Returns the updated list.
#[pyfunction]
#[pyo3(name = "link_tasks")]
fn py_link_tasks(mut dependencies: Vec<Dependency>, ids: Vec<TaskId>) -> Vec<Dependency> {
    link_tasks(&mut dependencies, &ids);
    dependencies
}

/// Drop links between the given task ids. Returns the updated list.
#[pyfunction]
#[pyo3(name = "unlink_tasks")]
fn py_unlink_tasks(mut dependencies: Vec<Dependency>, ids: Vec<TaskId>) -> Vec<Dependency> {
    unlink_tasks(&mut dependencies, &ids);
    dependencies
}

#[pyfunction]
#[pyo3(name = "set_baseline")]
fn py_set_baseline(mut tasks: Vec<Task>) -> Vec<Task> {
    set_baseline(&mut tasks);
    tasks
}

#[pyfunction]
#[pyo3(name = "baseline_variance", signature = (task, calendar=None))]
fn py_baseline_variance(task: Task, calendar: Option<Calendar>) -> Option<BaselineVariance> {
    baseline_variance(&task, &calendar.unwrap_or_default())
}

/// The bokmal.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Task>()?;
    m.add_class::<Dependency>()?;
    m.add_class::<Calendar>()?;
    m.add_class::<ScheduleReport>()?;
    m.add_class::<TaskTiming>()?;
    m.add_class::<BaselineVariance>()?;

    // Config types
    m.add_class::<SchedulerConfig>()?;

    // Scheduling
    m.add_function(wrap_pyfunction!(py_schedule, m)?)?;

    // WBS
    m.add_function(wrap_pyfunction!(recalculate_wbs, m)?)?;
    m.add_function(wrap_pyfunction!(indent_task, m)?)?;
    m.add_function(wrap_pyfunction!(outdent_task, m)?)?;
    m.add_function(wrap_pyfunction!(py_move_task, m)?)?;
    m.add_function(wrap_pyfunction!(py_sort_waterfall, m)?)?;

    // Calendar
    m.add_function(wrap_pyfunction!(py_is_working_day, m)?)?;
    m.add_function(wrap_pyfunction!(py_add_working_days, m)?)?;
    m.add_function(wrap_pyfunction!(py_subtract_working_days, m)?)?;
    m.add_function(wrap_pyfunction!(py_count_working_days, m)?)?;

    // Dependencies
    m.add_function(wrap_pyfunction!(py_validate_dependencies, m)?)?;
    m.add_function(wrap_pyfunction!(py_would_create_cycle, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_predecessors, m)?)?;
    m.add_function(wrap_pyfunction!(py_format_predecessors, m)?)?;
    m.add_function(wrap_pyfunction!(py_link_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(py_unlink_tasks, m)?)?;

    // Baseline
    m.add_function(wrap_pyfunction!(py_set_baseline, m)?)?;
    m.add_function(wrap_pyfunction!(py_baseline_variance, m)?)?;

    Ok(())
}
