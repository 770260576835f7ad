//! Configuration types for the scheduling engine.

use pyo3::prelude::*;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a configuration value cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown backward pass mode: {0} (expected \"working_days\" or \"calendar_days\")")]
    UnknownBackwardPassMode(String),
}

/// Arithmetic used when computing late dates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackwardPassMode {
    /// Mirror of the forward pass: lags and spans are counted in working days.
    #[default]
    WorkingDays,
    /// Compatibility mode: lags and spans are subtracted as calendar days,
    /// matching the dates produced by earlier releases of the editor.
    CalendarDays,
}

impl BackwardPassMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkingDays => "working_days",
            Self::CalendarDays => "calendar_days",
        }
    }
}

impl FromStr for BackwardPassMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "working_days" => Ok(Self::WorkingDays),
            "calendar_days" => Ok(Self::CalendarDays),
            other => Err(ConfigError::UnknownBackwardPassMode(other.to_string())),
        }
    }
}

/// Configuration for a scheduling pass.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Backward pass arithmetic: "working_days" or "calendar_days"
    #[pyo3(get, set)]
    pub backward_pass: String,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            backward_pass: BackwardPassMode::default().as_str().to_string(),
            verbosity: 0,
        }
    }
}

impl SchedulerConfig {
    /// Validate the backward pass setting.
    pub fn backward_pass_mode(&self) -> Result<BackwardPassMode, ConfigError> {
        self.backward_pass.parse()
    }
}

#[pymethods]
impl SchedulerConfig {
    #[new]
    #[pyo3(signature = (backward_pass=None, verbosity=None))]
    fn new(backward_pass: Option<String>, verbosity: Option<u8>) -> Self {
        let defaults = Self::default();
        Self {
            backward_pass: backward_pass.unwrap_or(defaults.backward_pass),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SchedulerConfig(backward_pass={:?}, verbosity={})",
            self.backward_pass, self.verbosity
        )
    }
}
