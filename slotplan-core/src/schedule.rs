//! Run output: the per-day agenda plus classification lists and trace.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::slot::{OccupiedSlot, SlotCategory};
use crate::task::{PlannedTask, Priority};

/// Display color for occupied agenda items.
pub const OCCUPIED_COLOR: &str = "#e74c3c";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AgendaItem {
    Occupied {
        title: String,
        category: SlotCategory,
        start_time: NaiveTime,
        end_time: NaiveTime,
        color: String,
    },
    Task {
        task_id: String,
        title: String,
        start_time: NaiveTime,
        end_time: NaiveTime,
        duration_hours: f64,
        priority: Priority,
        color: String,
        reason: String,
    },
}

impl AgendaItem {
    pub fn occupied(slot: &OccupiedSlot) -> Self {
        AgendaItem::Occupied {
            title: slot.display_title().to_string(),
            category: slot.category,
            start_time: slot.start_time,
            end_time: slot.end_time,
            color: OCCUPIED_COLOR.to_string(),
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        match self {
            AgendaItem::Occupied { start_time, .. } | AgendaItem::Task { start_time, .. } => {
                *start_time
            }
        }
    }

    pub fn end_time(&self) -> NaiveTime {
        match self {
            AgendaItem::Occupied { end_time, .. } | AgendaItem::Task { end_time, .. } => *end_time,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            AgendaItem::Occupied { title, .. } | AgendaItem::Task { title, .. } => title,
        }
    }

    pub fn is_task(&self) -> bool {
        matches!(self, AgendaItem::Task { .. })
    }

    /// Hours of task work this item represents (0 for occupied items).
    pub fn task_hours(&self) -> f64 {
        match self {
            AgendaItem::Task { duration_hours, .. } => *duration_hours,
            AgendaItem::Occupied { .. } => 0.0,
        }
    }
}

pub type Calendar = BTreeMap<NaiveDate, Vec<AgendaItem>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub calendar: Calendar,
    pub scheduled: Vec<PlannedTask>,
    /// Includes partially placed tasks.
    pub impossible: Vec<PlannedTask>,
    /// Human-readable decisions in the order they were made.
    pub messages: Vec<String>,
}

impl ScheduleResult {
    pub fn day(&self, date: NaiveDate) -> &[AgendaItem] {
        self.calendar.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Hours already given to tasks on `date`.
    pub fn task_hours_on(&self, date: NaiveDate) -> f64 {
        self.day(date).iter().map(AgendaItem::task_hours).sum()
    }

    pub(crate) fn push_item(&mut self, date: NaiveDate, item: AgendaItem) {
        self.calendar.entry(date).or_default().push(item);
    }

    /// Project every occupied slot into the agenda, then order each day by start.
    pub(crate) fn assemble(&mut self, occupied: &[OccupiedSlot]) {
        for slot in occupied {
            self.push_item(slot.date, AgendaItem::occupied(slot));
        }
        for items in self.calendar.values_mut() {
            items.sort_by_key(AgendaItem::start_time);
        }
    }

    pub fn find(&self, task_id: &str) -> Option<&PlannedTask> {
        self.scheduled
            .iter()
            .chain(self.impossible.iter())
            .find(|p| p.task.id == task_id)
    }
}
