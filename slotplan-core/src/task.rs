//! Task model: immutable caller input plus a run-scoped outcome.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::time::{self, HOURS_EPSILON};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "high", alias = "Haute")]
    High,
    #[default]
    #[serde(alias = "normal", alias = "Normale")]
    Normal,
    #[serde(alias = "low", alias = "Basse")]
    Low,
}

impl Priority {
    /// Ordering weight; higher is placed first among equally urgent tasks.
    pub fn weight(self) -> i32 {
        match self {
            Priority::High => 3,
            Priority::Normal => 2,
            Priority::Low => 1,
        }
    }

    /// Display color for agenda blocks.
    pub fn color(self) -> &'static str {
        match self {
            Priority::High => "#1a5276",
            Priority::Normal => "#2980b9",
            Priority::Low => "#aed6f1",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Normal => "Normal",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "haute" => Ok(Priority::High),
            "normal" | "normale" => Ok(Priority::Normal),
            "low" | "basse" => Ok(Priority::Low),
            _ => Err(ConfigError::UnknownPriority(s.to_string())),
        }
    }
}

pub fn new_task_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Caller-owned task description. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default = "new_task_id")]
    pub id: String,
    pub title: String,

    /// Total hours of work required.
    pub duration_hours: f64,

    /// Last day work may be placed on. Equals the pinned date for pinned tasks.
    pub deadline: NaiveDate,

    #[serde(default)]
    pub priority: Priority,

    /// Fixed start; the task is placed exactly here or not at all.
    #[serde(default)]
    pub pinned_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurrence_label: String,

    #[serde(default)]
    pub notes: String,
}

impl Task {
    pub fn new(title: impl Into<String>, duration_hours: f64, deadline: NaiveDate) -> Self {
        Self {
            id: new_task_id(),
            title: title.into(),
            duration_hours,
            deadline,
            priority: Priority::Normal,
            pinned_at: None,
            recurring: false,
            recurrence_label: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Pin the start; the deadline follows the pinned date.
    pub fn pinned_at(mut self, at: NaiveDateTime) -> Self {
        self.pinned_at = Some(at);
        self.deadline = at.date();
        self
    }

    pub fn recurring(mut self, label: impl Into<String>) -> Self {
        self.recurring = true;
        self.recurrence_label = label.into();
        self
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_at.is_some()
    }

    /// Pinned `[start, end)` on the pinned date.
    pub fn pinned_interval(&self) -> Option<(NaiveDate, NaiveTime, NaiveTime)> {
        self.pinned_at.map(|at| {
            let start = at.time();
            (at.date(), start, time::advance(start, self.duration_hours))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration_hours.is_finite() || self.duration_hours <= 0.0 {
            return Err(ConfigError::InvalidDuration {
                title: self.title.clone(),
                hours: self.duration_hours,
            });
        }
        if let Some((date, start, end)) = self.pinned_interval() {
            if self.deadline != date {
                return Err(ConfigError::PinnedDeadlineMismatch {
                    title: self.title.clone(),
                    deadline: self.deadline,
                    pinned: date,
                });
            }
            if end <= start {
                return Err(ConfigError::EmptyInterval {
                    what: format!("pinned task '{}'", self.title),
                    date,
                    start,
                    end,
                });
            }
        }
        Ok(())
    }
}

/// One contiguous piece of work placed on the agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedBlock {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_hours: f64,
}

/// Why a task could not be (fully) placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unschedulable {
    PinnedOutsideWorkingHours {
        start: NaiveTime,
        end: NaiveTime,
        day_start: NaiveTime,
        day_end: NaiveTime,
    },
    PinnedConflictsOccupied {
        title: String,
        start: NaiveTime,
        end: NaiveTime,
    },
    PinnedConflictsPinned {
        title: String,
        start: NaiveTime,
        end: NaiveTime,
    },
    Partial {
        placed: f64,
        required: f64,
        deadline: NaiveDate,
    },
    DeadlinePassed {
        deadline: NaiveDate,
    },
    InsufficientCapacity {
        available: f64,
        required: f64,
        deadline: NaiveDate,
    },
    Overloaded {
        deadline: NaiveDate,
    },
}

impl fmt::Display for Unschedulable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hm = |t: &NaiveTime| t.format("%H:%M").to_string();
        let dmy = |d: &NaiveDate| d.format("%d/%m/%Y").to_string();
        match self {
            Unschedulable::PinnedOutsideWorkingHours {
                start,
                end,
                day_start,
                day_end,
            } => write!(
                f,
                "pinned window {}-{} falls outside working hours {}-{}.",
                hm(start),
                hm(end),
                hm(day_start),
                hm(day_end)
            ),
            Unschedulable::PinnedConflictsOccupied { title, start, end } => write!(
                f,
                "pinned window conflicts with occupied slot '{}' ({}-{}).",
                title,
                hm(start),
                hm(end)
            ),
            Unschedulable::PinnedConflictsPinned { title, start, end } => write!(
                f,
                "pinned window conflicts with pinned task '{}' ({}-{}).",
                title,
                hm(start),
                hm(end)
            ),
            Unschedulable::Partial {
                placed,
                required,
                deadline,
            } => write!(
                f,
                "only {:.1}h of {:.1}h placed before the deadline of {}.",
                placed,
                required,
                dmy(deadline)
            ),
            Unschedulable::DeadlinePassed { deadline } => {
                write!(f, "deadline {} has already passed.", dmy(deadline))
            }
            Unschedulable::InsufficientCapacity {
                available,
                required,
                deadline,
            } => write!(
                f,
                "not enough free time before {} ({:.1}h available, {:.1}h required).",
                dmy(deadline),
                available,
                required
            ),
            Unschedulable::Overloaded { deadline } => write!(
                f,
                "deadline too close or schedule overloaded before {}.",
                dmy(deadline)
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OutcomeStatus {
    #[default]
    Pending,
    Scheduled,
    Impossible(Unschedulable),
}

/// Run-scoped state the engine accumulates for one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub blocks: Vec<AllocatedBlock>,
    pub status: OutcomeStatus,
}

impl TaskOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self.status, OutcomeStatus::Scheduled)
    }

    pub fn is_impossible(&self) -> bool {
        matches!(self.status, OutcomeStatus::Impossible(_))
    }

    pub fn reason(&self) -> Option<&Unschedulable> {
        match &self.status {
            OutcomeStatus::Impossible(r) => Some(r),
            _ => None,
        }
    }
}

/// The engine's working copy of a task, paired with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub task: Task,
    pub outcome: TaskOutcome,
}

impl PlannedTask {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            outcome: TaskOutcome::default(),
        }
    }

    pub fn scheduled_hours(&self) -> f64 {
        self.outcome.blocks.iter().map(|b| b.duration_hours).sum()
    }

    pub fn remaining_hours(&self) -> f64 {
        (self.task.duration_hours - self.scheduled_hours()).max(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_hours() < HOURS_EPSILON
    }

    pub fn mark_scheduled(&mut self) {
        self.outcome.status = OutcomeStatus::Scheduled;
    }

    pub fn mark_impossible(&mut self, reason: Unschedulable) {
        self.outcome.status = OutcomeStatus::Impossible(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn ids_are_short_and_unique() {
        let a = Task::new("a", 1.0, day(2));
        let b = Task::new("b", 1.0, day(2));
        assert_eq!(a.id.len(), 8);
        assert_ne!(a.id, b.id);
        assert_eq!(a.clone().id, a.id);
    }

    #[test]
    fn pinning_moves_deadline_to_pinned_date() {
        let at = day(5).and_hms_opt(9, 0, 0).unwrap();
        let t = Task::new("standup", 0.5, day(20)).pinned_at(at);
        assert_eq!(t.deadline, day(5));
        let (d, s, e) = t.pinned_interval().unwrap();
        assert_eq!(d, day(5));
        assert_eq!(s, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(e, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn validate_rejects_bad_durations() {
        assert!(Task::new("zero", 0.0, day(2)).validate().is_err());
        assert!(Task::new("nan", f64::NAN, day(2)).validate().is_err());
        assert!(Task::new("ok", 0.5, day(2)).validate().is_ok());

        // rounds to a zero-minute pinned window
        let at = day(2).and_hms_opt(9, 0, 0).unwrap();
        assert!(Task::new("blip", 0.001, day(2)).pinned_at(at).validate().is_err());
    }

    #[test]
    fn validate_rejects_pin_on_another_day_than_deadline() {
        let t: Task = serde_json::from_str(
            r#"{"title":"Demo","duration_hours":1.0,"deadline":"2026-03-20",
                "pinned_at":"2026-03-02T09:00:00"}"#,
        )
        .unwrap();
        assert!(matches!(
            t.validate(),
            Err(ConfigError::PinnedDeadlineMismatch { deadline, pinned, .. })
                if deadline == day(20) && pinned == day(2)
        ));

        let at = day(2).and_hms_opt(9, 0, 0).unwrap();
        assert!(Task::new("Demo", 1.0, day(20)).pinned_at(at).validate().is_ok());
    }

    #[test]
    fn priority_parses_legacy_labels() {
        assert_eq!("Haute".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("normal".parse::<Priority>().unwrap(), Priority::Normal);
        assert_eq!(" Basse ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::High.weight() > Priority::Normal.weight());
    }

    #[test]
    fn task_deserializes_with_defaults() {
        let t: Task = serde_json::from_str(
            r#"{"title":"Report","duration_hours":3.0,"deadline":"2026-03-06","priority":"Haute"}"#,
        )
        .unwrap();
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.id.len(), 8);
        assert!(!t.is_pinned());
    }

    #[test]
    fn outcome_status_is_exclusive() {
        let mut p = PlannedTask::new(Task::new("x", 1.0, day(2)));
        p.mark_impossible(Unschedulable::DeadlinePassed { deadline: day(2) });
        assert!(p.outcome.is_impossible());
        assert!(!p.outcome.is_scheduled());
        p.mark_scheduled();
        assert!(p.outcome.is_scheduled());
        assert!(!p.outcome.is_impossible());
    }
}
