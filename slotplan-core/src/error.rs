//! Boundary validation errors.
//!
//! Unschedulable tasks are never errors; they are reported on the task outcome.
//! `ConfigError` only covers inputs that would make a run meaningless.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("working day must end after it starts (start {start}h, end {end}h)")]
    InvalidWorkingHours { start: u32, end: u32 },

    #[error("working day must end by 23h (got {0}h)")]
    EndHourOutOfRange(u32),

    #[error("max hours per day must be a positive number (got {0})")]
    InvalidDailyCap(f64),

    #[error("task '{title}' has an invalid duration ({hours}h)")]
    InvalidDuration { title: String, hours: f64 },

    #[error("{what} on {date} must end after it starts ({start}-{end})")]
    EmptyInterval {
        what: String,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("pinned task '{title}' is due {deadline} but pinned on {pinned}")]
    PinnedDeadlineMismatch {
        title: String,
        deadline: NaiveDate,
        pinned: NaiveDate,
    },

    #[error("unknown priority '{0}' (expected High, Normal or Low)")]
    UnknownPriority(String),

    #[error("unknown slot category '{0}'")]
    UnknownCategory(String),

    #[error("invalid recurring series: {0}")]
    InvalidSeries(String),
}
