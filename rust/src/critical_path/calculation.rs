//! Critical path calculation using forward and backward passes.
//!
//! Both passes run over a [`TopoOrder`]; per-task state is kept in vectors
//! indexed by graph position. Edges reported as cycle edges are skipped, and a
//! predecessor without computed dates contributes the project start.

use chrono::{Days, NaiveDate};

use crate::calendar::{
    add_working_days, next_working_day, shift_working_days, subtract_working_days, Calendar,
};
use crate::config::BackwardPassMode;
use crate::index::TaskPos;
use crate::models::{ConstraintType, DependencyType, Task};
use crate::{log_checks, log_debug};

use super::graph::{DependencyGraph, TopoOrder};
use super::types::TaskTiming;

/// (start, finish) pair.
pub type DatePair = (NaiveDate, NaiveDate);

/// Working-day length used by the passes; milestones are zero length.
#[inline]
fn effective_duration(task: &Task) -> i64 {
    if task.is_milestone {
        0
    } else {
        task.duration
    }
}

/// Finish date of a task starting on `start`.
#[inline]
fn finish_from_start(start: NaiveDate, duration: i64, calendar: &Calendar) -> NaiveDate {
    if duration <= 0 {
        start
    } else {
        add_working_days(start, duration, calendar)
    }
}

/// Start date of a task that must finish on `finish`.
#[inline]
fn start_from_finish(finish: NaiveDate, duration: i64, calendar: &Calendar) -> NaiveDate {
    if duration > 1 {
        subtract_working_days(finish, duration, calendar)
    } else {
        finish
    }
}

/// Clamp an early start against the task's date constraint.
fn apply_constraint(
    task: &Task,
    early_start: NaiveDate,
    calendar: &Calendar,
    verbosity: u8,
) -> NaiveDate {
    let (Some(kind), Some(date)) = (task.constraint_type, task.constraint_date) else {
        return early_start;
    };
    let duration = effective_duration(task);

    let clamped = match kind {
        ConstraintType::Snet => early_start.max(date),
        ConstraintType::Mso => date,
        ConstraintType::Fnet => {
            if finish_from_start(early_start, duration, calendar) < date {
                start_from_finish(date, duration, calendar)
            } else {
                early_start
            }
        }
        ConstraintType::Mfo => start_from_finish(date, duration, calendar),
    };

    if clamped != early_start {
        log_checks!(
            verbosity,
            "  task {}: {} {} moves start {} -> {}",
            task.id,
            kind,
            date,
            early_start,
            clamped
        );
    }
    clamped
}

/// Compute early start/finish for every ordered task.
///
/// Manual tasks keep their own start (or the project start when they have
/// none). Automatic tasks start no earlier than `project_start` and no earlier
/// than any predecessor link allows, then get their constraint applied.
pub fn forward_pass(
    tasks: &[Task],
    graph: &DependencyGraph,
    topo: &TopoOrder,
    project_start: NaiveDate,
    calendar: &Calendar,
    verbosity: u8,
) -> Vec<Option<DatePair>> {
    let mut early: Vec<Option<DatePair>> = vec![None; graph.len()];

    for &pos in &topo.order {
        let task = &tasks[graph.slot(pos)];
        let duration = effective_duration(task);

        if task.manual_scheduling {
            early[pos as usize] = Some(match task.start_date {
                Some(start) => (start, finish_from_start(start, duration, calendar)),
                None => (project_start, project_start),
            });
            continue;
        }

        let mut early_start = project_start;
        for edge in &graph.preds[pos as usize] {
            if topo.is_cycle_edge(edge.other, pos) {
                continue;
            }
            let (pred_start, pred_finish) =
                early[edge.other as usize].unwrap_or((project_start, project_start));

            let candidate = match edge.dep_type {
                // The successor starts the working day after the predecessor finishes
                DependencyType::FS => {
                    shift_working_days(pred_finish, edge.lag.saturating_add(1), calendar)
                }
                DependencyType::SS => shift_working_days(pred_start, edge.lag, calendar),
                DependencyType::FF => {
                    let finish = shift_working_days(pred_finish, edge.lag, calendar);
                    start_from_finish(finish, duration, calendar)
                }
                // Start-to-finish ties the successor's start to the predecessor's start
                DependencyType::SF => shift_working_days(pred_start, edge.lag, calendar),
            };

            if candidate > early_start {
                early_start = candidate;
            }
        }

        let early_start = apply_constraint(task, early_start, calendar, verbosity);
        let early_finish = finish_from_start(early_start, duration, calendar);
        log_debug!(
            verbosity,
            "  forward {}: ES={} EF={}",
            task.id,
            early_start,
            early_finish
        );
        early[pos as usize] = Some((early_start, early_finish));
    }

    early
}

/// Latest early finish over all computed tasks.
pub fn project_end(early: &[Option<DatePair>]) -> Option<NaiveDate> {
    early.iter().flatten().map(|&(_, finish)| finish).max()
}

fn minus_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_days(Days::new(days.max(0) as u64))
        .unwrap_or(date)
}

/// Compute late start/finish for every ordered task, walking the order backwards.
///
/// Tasks without successors finish no later than `project_end`.
pub fn backward_pass(
    tasks: &[Task],
    graph: &DependencyGraph,
    topo: &TopoOrder,
    early: &[Option<DatePair>],
    project_end: NaiveDate,
    mode: BackwardPassMode,
    calendar: &Calendar,
) -> Vec<Option<DatePair>> {
    let mut late: Vec<Option<DatePair>> = vec![None; graph.len()];

    for &pos in topo.order.iter().rev() {
        let Some((early_start, early_finish)) = early[pos as usize] else {
            continue;
        };
        let duration = effective_duration(&tasks[graph.slot(pos)]);

        let mut late_finish = project_end;
        for edge in &graph.succs[pos as usize] {
            if topo.is_cycle_edge(pos, edge.other) {
                continue;
            }
            let (succ_start, succ_finish) =
                late[edge.other as usize].unwrap_or((project_end, project_end));

            let candidate = match mode {
                BackwardPassMode::CalendarDays => match edge.dep_type {
                    DependencyType::FS => minus_days(succ_start, edge.lag),
                    DependencyType::SS => succ_start,
                    DependencyType::FF | DependencyType::SF => succ_finish,
                },
                BackwardPassMode::WorkingDays => match edge.dep_type {
                    DependencyType::FS => shift_working_days(
                        succ_start,
                        edge.lag.saturating_add(1).saturating_neg(),
                        calendar,
                    ),
                    DependencyType::FF => {
                        shift_working_days(succ_finish, edge.lag.saturating_neg(), calendar)
                    }
                    DependencyType::SS | DependencyType::SF => finish_from_start(
                        shift_working_days(succ_start, edge.lag.saturating_neg(), calendar),
                        duration,
                        calendar,
                    ),
                },
            };

            if candidate < late_finish {
                late_finish = candidate;
            }
        }

        let late_start = match mode {
            BackwardPassMode::CalendarDays => {
                let span = (early_finish - early_start).num_days().max(1);
                minus_days(late_finish, span)
            }
            BackwardPassMode::WorkingDays => {
                if duration <= 0 {
                    late_finish
                } else {
                    subtract_working_days(late_finish, duration, calendar)
                }
            }
        };

        late[pos as usize] = Some((late_start, late_finish));
    }

    late
}

/// Combine early and late dates into per-task timings.
///
/// In working-day mode float is measured from the first working day on or
/// after the early start, since a non-working early start is where the
/// forward pass began counting.
pub fn compute_timings(
    topo: &TopoOrder,
    early: &[Option<DatePair>],
    late: &[Option<DatePair>],
    mode: BackwardPassMode,
    calendar: &Calendar,
) -> Vec<(TaskPos, TaskTiming)> {
    topo.order
        .iter()
        .filter_map(|&pos| {
            let (early_start, early_finish) = early[pos as usize]?;
            let (late_start, late_finish) = late[pos as usize]?;
            let float_base = match mode {
                BackwardPassMode::WorkingDays => next_working_day(early_start, calendar),
                BackwardPassMode::CalendarDays => early_start,
            };
            Some((
                pos,
                TaskTiming {
                    early_start,
                    early_finish,
                    late_start,
                    late_finish,
                    total_float: (late_start - float_base).num_days(),
                },
            ))
        })
        .collect()
}
