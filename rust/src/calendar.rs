//! Working-day calendar arithmetic.
//!
//! Every function counts the start day as day 1: adding one working day to a
//! working day returns that same day. Dates are walked one calendar day at a
//! time, which is fine for the project-sized ranges the engine handles.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use pyo3::prelude::*;
use std::collections::HashSet;

use crate::models::Task;

/// Monday to Friday, numbered from Monday = 0.
pub const DEFAULT_WORKING_DAYS: [u32; 5] = [0, 1, 2, 3, 4];

/// Width of the fallback window returned by [`date_range`] for undated plans.
pub const DEFAULT_RANGE_DAYS: u64 = 30;

/// Working weekdays plus a holiday set.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    /// Weekday numbers (0 = Monday .. 6 = Sunday); out-of-range values are ignored.
    #[pyo3(get, set)]
    pub working_days: Vec<u32>,
    #[pyo3(get, set)]
    pub holidays: HashSet<NaiveDate>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            working_days: DEFAULT_WORKING_DAYS.to_vec(),
            holidays: HashSet::new(),
        }
    }
}

impl Calendar {
    pub fn new(working_days: Vec<u32>, holidays: HashSet<NaiveDate>) -> Self {
        Self {
            working_days,
            holidays,
        }
    }

    /// Default week with the given holidays.
    pub fn with_holidays(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_working_weekday(&self, weekday: Weekday) -> bool {
        self.working_days
            .contains(&weekday.num_days_from_monday())
    }

    /// False when no weekday is marked working; date walks are skipped then.
    pub fn has_working_days(&self) -> bool {
        self.working_days.iter().any(|&d| d < 7)
    }
}

#[pymethods]
impl Calendar {
    #[new]
    #[pyo3(signature = (working_days=None, holidays=None))]
    fn py_new(working_days: Option<Vec<u32>>, holidays: Option<HashSet<NaiveDate>>) -> Self {
        Self {
            working_days: working_days.unwrap_or_else(|| DEFAULT_WORKING_DAYS.to_vec()),
            holidays: holidays.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Calendar(working_days={:?}, holidays={})",
            self.working_days,
            self.holidays.len()
        )
    }
}

/// True iff the weekday is a working weekday and the date is not a holiday.
pub fn is_working_day(date: NaiveDate, calendar: &Calendar) -> bool {
    calendar.is_working_weekday(date.weekday()) && !calendar.holidays.contains(&date)
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

fn prev_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}

/// First working day on or after `date`.
fn roll_forward(date: NaiveDate, calendar: &Calendar) -> NaiveDate {
    let mut current = date;
    while !is_working_day(current, calendar) {
        match next_day(current) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Last working day on or before `date`.
fn roll_backward(date: NaiveDate, calendar: &Calendar) -> NaiveDate {
    let mut current = date;
    while !is_working_day(current, calendar) {
        match prev_day(current) {
            Some(prev) => current = prev,
            None => break,
        }
    }
    current
}

/// Date of the `days`-th working day counted from `start` inclusive.
///
/// A non-working `start` is first moved to the next working day, which then
/// counts as day 1. Returns `start` unchanged for `days <= 0`.
pub fn add_working_days(start: NaiveDate, days: i64, calendar: &Calendar) -> NaiveDate {
    if days <= 0 || !calendar.has_working_days() {
        return start;
    }
    let mut current = roll_forward(start, calendar);
    let mut remaining = days - 1;
    while remaining > 0 {
        match next_day(current) {
            Some(next) => current = next,
            None => break,
        }
        if is_working_day(current, calendar) {
            remaining -= 1;
        }
    }
    current
}

/// Backward counterpart of [`add_working_days`]: `end` counts as day 1.
pub fn subtract_working_days(end: NaiveDate, days: i64, calendar: &Calendar) -> NaiveDate {
    if days <= 0 || !calendar.has_working_days() {
        return end;
    }
    let mut current = roll_backward(end, calendar);
    let mut remaining = days - 1;
    while remaining > 0 {
        match prev_day(current) {
            Some(prev) => current = prev,
            None => break,
        }
        if is_working_day(current, calendar) {
            remaining -= 1;
        }
    }
    current
}

/// Inclusive number of working days in `[start, end]`.
///
/// Returns 0 for an inverted range and at least 1 otherwise, so an all-holiday
/// range never collapses a summary to zero length.
pub fn count_working_days(start: NaiveDate, end: NaiveDate, calendar: &Calendar) -> i64 {
    if start > end {
        return 0;
    }
    let count = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_working_day(*d, calendar))
        .count() as i64;
    count.max(1)
}

/// First working day on or after `date`; `date` itself for an empty week.
pub fn next_working_day(date: NaiveDate, calendar: &Calendar) -> NaiveDate {
    if !calendar.has_working_days() {
        return date;
    }
    roll_forward(date, calendar)
}

/// Move `days` whole working days away from `date` (backward when negative).
///
/// Each step lands on the next (or previous) working day, so shifting a Friday
/// by one on a Mon-Fri week gives the following Monday.
pub fn shift_working_days(date: NaiveDate, days: i64, calendar: &Calendar) -> NaiveDate {
    if days == 0 || !calendar.has_working_days() {
        return date;
    }
    let mut current = date;
    for _ in 0..days.unsigned_abs() {
        let stepped = if days > 0 {
            next_day(current).map(|d| roll_forward(d, calendar))
        } else {
            prev_day(current).map(|d| roll_backward(d, calendar))
        };
        match stepped {
            Some(d) => current = d,
            None => break,
        }
    }
    current
}

/// Earliest start and latest end over the dated tasks.
///
/// Falls back to a [`DEFAULT_RANGE_DAYS`] window starting at `fallback` when
/// no task carries a start or no task carries an end.
pub fn date_range(tasks: &[Task], fallback: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = tasks.iter().filter_map(|t| t.start_date).min();
    let end = tasks.iter().filter_map(|t| t.end_date).max();
    match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => (
            fallback,
            fallback
                .checked_add_days(Days::new(DEFAULT_RANGE_DAYS))
                .unwrap_or(fallback),
        ),
    }
}
