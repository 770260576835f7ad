//! Core data types for the scheduling engine.

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::calendar::{add_working_days, Calendar};

/// Caller-assigned task identity.
pub type TaskId = i64;

/// Errors raised while decoding model codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown dependency type: {0}")]
    UnknownDependencyType(String),
    #[error("Unknown constraint type: {0}")]
    UnknownConstraintType(String),
}

/// Relationship between a predecessor and a successor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DependencyType {
    /// Finish-to-start.
    #[default]
    FS,
    /// Start-to-start.
    SS,
    /// Finish-to-finish.
    FF,
    /// Start-to-finish.
    SF,
}

impl DependencyType {
    pub const ALL: [DependencyType; 4] = [Self::FS, Self::SS, Self::FF, Self::SF];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FS => "FS",
            Self::SS => "SS",
            Self::FF => "FF",
            Self::SF => "SF",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FS" => Ok(Self::FS),
            "SS" => Ok(Self::SS),
            "FF" => Ok(Self::FF),
            "SF" => Ok(Self::SF),
            _ => Err(ModelError::UnknownDependencyType(s.to_string())),
        }
    }
}

/// Date constraint pinned to a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    /// Start no earlier than.
    Snet,
    /// Must start on.
    Mso,
    /// Finish no earlier than.
    Fnet,
    /// Must finish on.
    Mfo,
}

impl ConstraintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snet => "SNET",
            Self::Mso => "MSO",
            Self::Fnet => "FNET",
            Self::Mfo => "MFO",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SNET" => Ok(Self::Snet),
            "MSO" => Ok(Self::Mso),
            "FNET" => Ok(Self::Fnet),
            "MFO" => Ok(Self::Mfo),
            _ => Err(ModelError::UnknownConstraintType(s.to_string())),
        }
    }
}

// Both enums cross the Python boundary as their short string codes.

impl ToPyObject for DependencyType {
    fn to_object(&self, py: Python<'_>) -> PyObject {
        self.as_str().to_object(py)
    }
}

impl IntoPy<PyObject> for DependencyType {
    fn into_py(self, py: Python<'_>) -> PyObject {
        self.as_str().into_py(py)
    }
}

impl<'py> FromPyObject<'py> for DependencyType {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        let code: String = ob.extract()?;
        code.parse()
            .map_err(|e: ModelError| PyValueError::new_err(e.to_string()))
    }
}

impl ToPyObject for ConstraintType {
    fn to_object(&self, py: Python<'_>) -> PyObject {
        self.as_str().to_object(py)
    }
}

impl IntoPy<PyObject> for ConstraintType {
    fn into_py(self, py: Python<'_>) -> PyObject {
        self.as_str().into_py(py)
    }
}

impl<'py> FromPyObject<'py> for ConstraintType {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        let code: String = ob.extract()?;
        code.parse()
            .map_err(|e: ModelError| PyValueError::new_err(e.to_string()))
    }
}

/// A dependency between two tasks with an optional lag (negative = lead).
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    #[pyo3(get, set)]
    pub predecessor_id: TaskId,
    #[pyo3(get, set)]
    pub successor_id: TaskId,
    #[pyo3(get, set)]
    pub dep_type: DependencyType,
    #[pyo3(get, set)]
    pub lag: i64,
}

impl Dependency {
    pub fn new(
        predecessor_id: TaskId,
        successor_id: TaskId,
        dep_type: DependencyType,
        lag: i64,
    ) -> Self {
        Self {
            predecessor_id,
            successor_id,
            dep_type,
            lag,
        }
    }

    /// Finish-to-start dependency without lag.
    pub fn finish_to_start(predecessor_id: TaskId, successor_id: TaskId) -> Self {
        Self::new(predecessor_id, successor_id, DependencyType::FS, 0)
    }
}

#[pymethods]
impl Dependency {
    #[new]
    #[pyo3(signature = (predecessor_id, successor_id, dep_type=DependencyType::FS, lag=0))]
    fn py_new(
        predecessor_id: TaskId,
        successor_id: TaskId,
        dep_type: DependencyType,
        lag: i64,
    ) -> Self {
        Self::new(predecessor_id, successor_id, dep_type, lag)
    }

    /// Compact label such as `3FS`, `3SS+2d` or `3FF-1d`.
    pub fn label(&self) -> String {
        let lag = match self.lag {
            0 => String::new(),
            l if l > 0 => format!("+{}d", l),
            l => format!("{}d", l),
        };
        format!("{}{}{}", self.predecessor_id, self.dep_type, lag)
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency({} -> {}, {}, lag={})",
            self.predecessor_id, self.successor_id, self.dep_type, self.lag
        )
    }
}

/// A task in the ordered outline.
///
/// `wbs`, `parent_id`, `is_summary` and `is_critical` are derived and get
/// overwritten by the WBS manager and the scheduler.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: TaskId,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub start_date: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub end_date: Option<NaiveDate>,
    /// Working days; 0 only for milestones.
    #[pyo3(get, set)]
    pub duration: i64,
    /// Percent complete, 0-100.
    #[pyo3(get, set)]
    pub progress: f64,
    #[pyo3(get, set)]
    pub wbs_level: usize,
    #[pyo3(get, set)]
    pub wbs: String,
    #[pyo3(get, set)]
    pub parent_id: Option<TaskId>,
    #[pyo3(get, set)]
    pub is_summary: bool,
    #[pyo3(get, set)]
    pub is_milestone: bool,
    #[pyo3(get, set)]
    pub is_critical: bool,
    #[pyo3(get, set)]
    pub manual_scheduling: bool,
    #[pyo3(get, set)]
    pub constraint_type: Option<ConstraintType>,
    #[pyo3(get, set)]
    pub constraint_date: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub baseline_start: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub baseline_end: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub baseline_duration: Option<i64>,
    #[pyo3(get, set)]
    pub notes: Option<String>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: 0,
            name: "New Task".to_string(),
            start_date: None,
            end_date: None,
            duration: 1,
            progress: 0.0,
            wbs_level: 0,
            wbs: String::new(),
            parent_id: None,
            is_summary: false,
            is_milestone: false,
            is_critical: false,
            manual_scheduling: false,
            constraint_type: None,
            constraint_date: None,
            baseline_start: None,
            baseline_end: None,
            baseline_duration: None,
            notes: None,
        }
    }
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, duration: i64) -> Self {
        Self {
            id,
            name: name.into(),
            duration,
            ..Default::default()
        }
    }

    /// Set start and end dates from the task's duration.
    pub fn set_dates_from_duration(&mut self, start: NaiveDate, calendar: &Calendar) {
        self.start_date = Some(start);
        if self.is_milestone {
            self.end_date = Some(start);
            self.duration = 0;
        } else {
            self.end_date = Some(add_working_days(start, self.duration, calendar));
        }
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (
        id,
        name="New Task".to_string(),
        duration=1,
        start_date=None,
        end_date=None,
        progress=0.0,
        wbs_level=0,
        is_milestone=false,
        manual_scheduling=false,
        constraint_type=None,
        constraint_date=None,
        notes=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        id: TaskId,
        name: String,
        duration: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        progress: f64,
        wbs_level: usize,
        is_milestone: bool,
        manual_scheduling: bool,
        constraint_type: Option<ConstraintType>,
        constraint_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Self {
        let mut task = Self {
            id,
            name,
            start_date,
            end_date,
            duration,
            progress,
            wbs_level,
            manual_scheduling,
            constraint_type,
            constraint_date,
            notes,
            ..Default::default()
        };
        if is_milestone {
            task.set_milestone(true);
        }
        task
    }

    /// Toggle milestone mode. Milestones have zero duration and end on their start.
    pub fn set_milestone(&mut self, milestone: bool) {
        self.is_milestone = milestone;
        if milestone {
            self.duration = 0;
            self.end_date = self.start_date;
        } else {
            self.duration = 1;
        }
    }

    /// Calendar-day span of the task, or its duration when undated.
    pub fn work_days(&self) -> i64 {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (end - start).num_days().max(1),
            _ => self.duration,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, name={:?}, wbs={:?}, start={:?}, end={:?})",
            self.id, self.name, self.wbs, self.start_date, self.end_date
        )
    }
}
