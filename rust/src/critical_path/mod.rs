//! Critical path scheduling.
//!
//! Builds the dependency network, orders it, runs the CPM forward and backward
//! passes over working days and rolls dates up into summary tasks.

mod calculation;
pub mod graph;
mod rollup;
mod scheduler;
mod types;

pub use calculation::{backward_pass, compute_timings, forward_pass, project_end, DatePair};
pub use graph::{assign_layers, DependencyGraph, Edge, TopoOrder};
pub use rollup::rollup_summaries;
pub use scheduler::{schedule, CriticalPathScheduler};
pub use types::{ScheduleReport, TaskTiming};
