//! Expansion of a repeating task into one task per occurrence.

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::task::{Priority, Task};

/// Series never extend more than this many days past their first occurrence.
pub const MAX_SERIES_DAYS: u64 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceRule {
    Daily,
    Weekly,
}

impl RecurrenceRule {
    fn step(self) -> Days {
        match self {
            RecurrenceRule::Daily => Days::new(1),
            RecurrenceRule::Weekly => Days::new(7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub title: String,
    /// Hours per occurrence.
    pub duration_hours: f64,
    pub priority: Priority,
    pub rule: RecurrenceRule,
    pub from: NaiveDate,
    pub until: NaiveDate,
    /// Fixed start for every occurrence; occurrences are placed flexibly otherwise.
    pub at: Option<NaiveTime>,
    #[serde(default)]
    pub notes: String,
}

/// One task per occurrence, each due on its own date.
pub fn expand_series(spec: &SeriesSpec) -> Result<Vec<Task>, ConfigError> {
    let title = spec.title.trim();
    if title.is_empty() {
        return Err(ConfigError::InvalidSeries("title is required".into()));
    }
    if spec.until < spec.from {
        return Err(ConfigError::InvalidSeries(format!(
            "end date {} is before start date {}",
            spec.until, spec.from
        )));
    }

    let last = spec
        .from
        .checked_add_days(Days::new(MAX_SERIES_DAYS))
        .map_or(spec.until, |cap| cap.min(spec.until));

    let mut tasks = Vec::new();
    let mut current = Some(spec.from);
    while let Some(day) = current.filter(|d| *d <= last) {
        let mut task = Task::new(title, spec.duration_hours, day)
            .with_priority(spec.priority)
            .with_notes(spec.notes.clone())
            .recurring(title);
        if let Some(at) = spec.at {
            task = task.pinned_at(day.and_time(at));
        }
        task.validate()?;
        tasks.push(task);
        current = day.checked_add_days(spec.rule.step());
    }
    Ok(tasks)
}
