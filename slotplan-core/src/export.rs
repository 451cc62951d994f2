//! Bookkeeping for pushing scheduled blocks to an external calendar.
//!
//! A block is exported once. Blocks already exported come back on later runs
//! as `Exported` occupied slots so their time is not handed out again.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::schedule::ScheduleResult;
use crate::slot::{OccupiedSlot, SlotCategory};
use crate::task::{AllocatedBlock, Task};
use crate::time::{HOURS_EPSILON, duration_hours};

/// Stable identity of an exported block: `<task_id>_<date>_<start>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(pub String);

impl BlockKey {
    pub fn new(task_id: &str, block: &AllocatedBlock) -> Self {
        BlockKey(format!(
            "{}_{}_{}",
            task_id,
            block.date.format("%Y-%m-%d"),
            block.start_time.format("%H:%M:%S")
        ))
    }

    /// The task id part. Ids may contain underscores; date and time never do.
    pub fn task_id(&self) -> &str {
        self.0.rsplitn(3, '_').nth(2).unwrap_or(&self.0)
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event-creation request for the calendar collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub key: BlockKey,
    pub title: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub description: String,
}

impl ExportRequest {
    fn new(task: &Task, block: &AllocatedBlock) -> Self {
        let mut description = format!(
            "Priority: {}\nDeadline: {}\n",
            task.priority,
            task.deadline.format("%d/%m/%Y")
        );
        description.push_str(&task.notes);
        Self {
            key: BlockKey::new(&task.id, block),
            title: format!("[Planner] {}", task.title),
            date: block.date,
            start: block.start_time,
            end: block.end_time,
            description,
        }
    }

    /// Ledger entry to record once the event was created.
    pub fn to_exported(&self, task_title: &str) -> ExportedBlock {
        ExportedBlock {
            key: self.key.clone(),
            date: self.date,
            start: self.start,
            end: self.end,
            title: task_title.to_string(),
        }
    }
}

/// Blocks of fully scheduled tasks that have not been exported yet.
pub fn pending_exports(result: &ScheduleResult, exported: &HashSet<BlockKey>) -> Vec<ExportRequest> {
    result
        .scheduled
        .iter()
        .flat_map(|p| p.outcome.blocks.iter().map(move |b| (&p.task, b)))
        .map(|(task, block)| ExportRequest::new(task, block))
        .filter(|req| !exported.contains(&req.key))
        .collect()
}

/// A block that now lives in the external calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedBlock {
    pub key: BlockKey,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub title: String,
}

impl ExportedBlock {
    pub fn hours(&self) -> f64 {
        duration_hours(self.start, self.end)
    }

    pub fn to_occupied(&self) -> Result<OccupiedSlot, ConfigError> {
        OccupiedSlot::new(
            self.date,
            self.start,
            self.end,
            SlotCategory::Exported,
            format!("[Exported] {}", self.title),
        )
    }
}

/// Tasks with their already exported work taken out.
///
/// Exported hours are subtracted per task. Fully exported tasks are dropped,
/// as are pinned tasks with any exported block. The exported time itself comes
/// back through `ExportedBlock::to_occupied`.
pub fn outstanding_tasks(tasks: &[Task], ledger: &[ExportedBlock]) -> Vec<Task> {
    let mut exported: HashMap<&str, f64> = HashMap::new();
    for block in ledger {
        *exported.entry(block.key.task_id()).or_default() += block.hours();
    }

    tasks
        .iter()
        .filter_map(|task| {
            let Some(&done) = exported.get(task.id.as_str()) else {
                return Some(task.clone());
            };
            let remaining = task.duration_hours - done;
            if task.is_pinned() || remaining <= HOURS_EPSILON {
                debug!(task = %task.id, exported_hours = done, "task already exported");
                return None;
            }
            let mut rest = task.clone();
            rest.duration_hours = remaining;
            Some(rest)
        })
        .collect()
}
