//! Working-day configuration for a run.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::time::{Interval, at_hour};

/// Fixed midday exclusion when `lunch_break` is on.
pub const LUNCH: (u32, u32) = (12, 13);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub max_hours_per_day: f64,
    /// No work before this hour.
    pub start_hour: u32,
    /// No work after this hour.
    pub end_hour: u32,
    pub no_sunday: bool,
    pub lunch_break: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_hours_per_day: 8.0,
            start_hour: 8,
            end_hour: 22,
            no_sunday: true,
            lunch_break: true,
        }
    }
}

impl Constraints {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_hour <= self.start_hour {
            return Err(ConfigError::InvalidWorkingHours {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        if self.end_hour > 23 {
            return Err(ConfigError::EndHourOutOfRange(self.end_hour));
        }
        if !self.max_hours_per_day.is_finite() || self.max_hours_per_day <= 0.0 {
            return Err(ConfigError::InvalidDailyCap(self.max_hours_per_day));
        }
        Ok(())
    }

    pub fn day_start(&self) -> NaiveTime {
        at_hour(self.start_hour)
    }

    pub fn day_end(&self) -> NaiveTime {
        at_hour(self.end_hour)
    }

    pub fn working_window(&self) -> Interval {
        (self.day_start(), self.day_end())
    }

    pub fn lunch_window(&self) -> Option<Interval> {
        self.lunch_break.then(|| (at_hour(LUNCH.0), at_hour(LUNCH.1)))
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !(self.no_sunday && date.weekday() == Weekday::Sun)
    }
}
