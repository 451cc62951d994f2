//! Pre-occupied intervals the engine must work around.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::task::new_task_id;
use crate::time::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCategory {
    #[serde(alias = "Cours")]
    Course,
    #[serde(alias = "Travail")]
    Work,
    #[serde(alias = "Rendez-vous")]
    Appointment,
    Sport,
    #[serde(alias = "Autre")]
    Other,
    /// Reserved: imported from an external calendar.
    #[serde(alias = "Google Calendar")]
    CalendarImport,
    /// Reserved: re-derived from task blocks already exported to a calendar.
    #[serde(alias = "Exporté")]
    Exported,
}

impl SlotCategory {
    pub fn label(self) -> &'static str {
        match self {
            SlotCategory::Course => "Course",
            SlotCategory::Work => "Work",
            SlotCategory::Appointment => "Appointment",
            SlotCategory::Sport => "Sport",
            SlotCategory::Other => "Other",
            SlotCategory::CalendarImport => "Calendar",
            SlotCategory::Exported => "Exported",
        }
    }

    /// Categories written by the calendar collaborators rather than the user.
    pub fn is_reserved(self) -> bool {
        matches!(self, SlotCategory::CalendarImport | SlotCategory::Exported)
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SlotCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase();
        let cat = match norm.as_str() {
            "course" | "cours" | "class" => SlotCategory::Course,
            "work" | "travail" => SlotCategory::Work,
            "appointment" | "rendez-vous" => SlotCategory::Appointment,
            "sport" => SlotCategory::Sport,
            "other" | "autre" | "" => SlotCategory::Other,
            "calendar" | "calendar_import" | "google calendar" => SlotCategory::CalendarImport,
            "exported" | "exporté" => SlotCategory::Exported,
            _ => return Err(ConfigError::UnknownCategory(s.to_string())),
        };
        Ok(cat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupiedSlot {
    #[serde(default = "new_task_id")]
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub category: SlotCategory,
    #[serde(default)]
    pub title: String,
}

impl OccupiedSlot {
    pub fn new(
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        category: SlotCategory,
        title: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let slot = Self {
            id: new_task_id(),
            date,
            start_time,
            end_time,
            category,
            title: title.into(),
        };
        slot.validate()?;
        Ok(slot)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_time <= self.start_time {
            return Err(ConfigError::EmptyInterval {
                what: format!("occupied slot '{}'", self.display_title()),
                date: self.date,
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Interval {
        (self.start_time, self.end_time)
    }

    /// Title, or the category label when no title was given.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.category.label()
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn rejects_empty_interval() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert!(OccupiedSlot::new(d, t(10, 0), t(10, 0), SlotCategory::Work, "x").is_err());
        assert!(OccupiedSlot::new(d, t(11, 0), t(10, 0), SlotCategory::Work, "x").is_err());
        assert!(OccupiedSlot::new(d, t(9, 0), t(10, 0), SlotCategory::Work, "x").is_ok());
    }

    #[test]
    fn blank_title_falls_back_to_category() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let s = OccupiedSlot::new(d, t(9, 0), t(10, 0), SlotCategory::Sport, " ").unwrap();
        assert_eq!(s.display_title(), "Sport");
    }

    #[test]
    fn category_parses_legacy_labels() {
        assert_eq!("Cours".parse::<SlotCategory>().unwrap(), SlotCategory::Course);
        assert_eq!(
            "Google Calendar".parse::<SlotCategory>().unwrap(),
            SlotCategory::CalendarImport
        );
        assert!(SlotCategory::Exported.is_reserved());
        assert!(!SlotCategory::Work.is_reserved());
        assert!("meeting-ish".parse::<SlotCategory>().is_err());
    }
}
