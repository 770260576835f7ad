//! Critical path scheduler implementation.

use chrono::NaiveDate;

use crate::calendar::Calendar;
use crate::config::{BackwardPassMode, ConfigError, SchedulerConfig};
use crate::index::TaskPos;
use crate::models::{Dependency, Task};
use crate::{log_changes, log_checks, log_debug};

use super::calculation::{backward_pass, compute_timings, forward_pass, project_end};
use super::graph::DependencyGraph;
use super::rollup::rollup_summaries;
use super::types::ScheduleReport;

/// CPM scheduler bound to a calendar and a validated configuration.
pub struct CriticalPathScheduler<'a> {
    calendar: &'a Calendar,
    mode: BackwardPassMode,
    verbosity: u8,
}

impl<'a> CriticalPathScheduler<'a> {
    /// Create a scheduler, rejecting an unknown backward pass mode.
    pub fn new(calendar: &'a Calendar, config: &SchedulerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            calendar,
            mode: config.backward_pass_mode()?,
            verbosity: config.verbosity,
        })
    }

    /// Compute dates for every task in place.
    ///
    /// Runs graph build, ordering, forward pass, date commit, backward pass,
    /// critical marking and summary rollup. Never fails: anything ignored
    /// along the way is counted in the returned report.
    pub fn schedule(
        &self,
        tasks: &mut [Task],
        dependencies: &[Dependency],
        project_start: NaiveDate,
    ) -> ScheduleReport {
        run_schedule(
            tasks,
            dependencies,
            project_start,
            self.calendar,
            self.mode,
            self.verbosity,
        )
    }
}

/// Schedule with the default configuration.
pub fn schedule(
    tasks: &mut [Task],
    dependencies: &[Dependency],
    project_start: NaiveDate,
    calendar: &Calendar,
) -> ScheduleReport {
    run_schedule(
        tasks,
        dependencies,
        project_start,
        calendar,
        BackwardPassMode::default(),
        0,
    )
}

fn run_schedule(
    tasks: &mut [Task],
    dependencies: &[Dependency],
    project_start: NaiveDate,
    calendar: &Calendar,
    mode: BackwardPassMode,
    verbosity: u8,
) -> ScheduleReport {
    let mut report = ScheduleReport::default();
    if tasks.is_empty() {
        return report;
    }

    // Phase 1: graph and order
    let graph = DependencyGraph::build(tasks, dependencies);
    report.dropped_dependencies = graph.dropped;
    if graph.dropped > 0 {
        log_checks!(
            verbosity,
            "Dropped {} dependencies with unknown endpoints",
            graph.dropped
        );
    }

    let roots: Vec<TaskPos> = (0..graph.len() as TaskPos)
        .filter(|&pos| !tasks[graph.slot(pos)].is_summary)
        .collect();
    let topo = graph.topological_order(roots);

    for &(pred, succ) in &topo.cycle_edges {
        let edge = (graph.task_id(pred), graph.task_id(succ));
        log_checks!(
            verbosity,
            "Ignoring dependency {} -> {}: closes a cycle",
            edge.0,
            edge.1
        );
        report.cycle_edges.push(edge);
    }

    // Phase 2: forward pass and commit
    let early = forward_pass(tasks, &graph, &topo, project_start, calendar, verbosity);

    for &pos in &topo.order {
        let Some((early_start, early_finish)) = early[pos as usize] else {
            continue;
        };
        let task = &mut tasks[graph.slot(pos)];
        if task.manual_scheduling {
            if task.is_milestone {
                task.duration = 0;
                if task.start_date.is_some() {
                    task.end_date = task.start_date;
                }
            }
            continue;
        }
        task.start_date = Some(early_start);
        task.end_date = Some(early_finish);
        if task.is_milestone {
            task.duration = 0;
        }
        log_changes!(
            verbosity,
            "  task {} ({}): {} -> {}",
            task.id,
            task.name,
            early_start,
            early_finish
        );
    }

    // Phase 3: backward pass and float
    let Some(end) = project_end(&early) else {
        return report;
    };
    report.project_end = Some(end);

    let late = backward_pass(tasks, &graph, &topo, &early, end, mode, calendar);
    for (pos, timing) in compute_timings(&topo, &early, &late, mode, calendar) {
        let task = &mut tasks[graph.slot(pos)];
        task.is_critical = timing.is_critical();
        log_debug!(
            verbosity,
            "  backward {}: LS={} LF={} float={}",
            task.id,
            timing.late_start,
            timing.late_finish,
            timing.total_float
        );
        if task.is_critical {
            report.critical_task_ids.push(task.id);
        }
        report.timings.insert(task.id, timing);
    }
    report.scheduled_tasks = report.timings.len();

    // Phase 4: summaries
    report.rolled_up_summaries = rollup_summaries(tasks, calendar, verbosity);

    log_changes!(
        verbosity,
        "Scheduled {} tasks, {} critical, project end {}",
        report.scheduled_tasks,
        report.critical_task_ids.len(),
        end
    );
    report
}
