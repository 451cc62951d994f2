//! slotplan-core: deadline-driven task allocation over a multi-day horizon.
//!
//! The engine takes tasks, pre-occupied intervals and working constraints and
//! produces a per-day agenda. Pinned tasks are reserved first; everything else
//! is placed greedily, day by day, up to its deadline.

pub mod constraints;
pub mod error;
pub mod export;
pub mod free_slots;
pub mod ordering;
pub mod outcome;
pub mod pinned;
pub mod planner;
pub mod recurrence;
pub mod schedule;
pub mod scheduler;
pub mod slot;
pub mod task;
pub mod time;

pub use constraints::Constraints;
pub use error::ConfigError;
pub use export::{BlockKey, ExportRequest, ExportedBlock, outstanding_tasks, pending_exports};
pub use recurrence::{RecurrenceRule, SeriesSpec, expand_series};
pub use schedule::{AgendaItem, Calendar, ScheduleResult, OCCUPIED_COLOR};
pub use scheduler::{Scheduler, DEFAULT_HORIZON_DAYS};
pub use slot::{OccupiedSlot, SlotCategory};
pub use task::{
    AllocatedBlock, OutcomeStatus, PlannedTask, Priority, Task, TaskOutcome, Unschedulable,
};
pub use time::{Interval, MIN_BLOCK_HOURS};
