//! Scheduler: validates inputs and drives one allocation run.
//!
//! Control flow: pinned pass, free-slot precomputation, ordered greedy pass
//! (each task classified right after its allocation), agenda assembly.

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::constraints::Constraints;
use crate::error::ConfigError;
use crate::free_slots::free_map;
use crate::ordering::greedy_order;
use crate::outcome::classify;
use crate::pinned::reserve_pinned;
use crate::planner::allocate;
use crate::schedule::ScheduleResult;
use crate::slot::OccupiedSlot;
use crate::task::{PlannedTask, Task};

pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// A validated scheduling problem.
///
/// `run` borrows immutably and works on private copies of the tasks, so the
/// same scheduler always yields the same result.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tasks: Vec<Task>,
    occupied: Vec<OccupiedSlot>,
    constraints: Constraints,
    today: NaiveDate,
    horizon_days: u32,
}

impl Scheduler {
    pub fn new(
        tasks: Vec<Task>,
        occupied: Vec<OccupiedSlot>,
        constraints: Constraints,
    ) -> Result<Self, ConfigError> {
        constraints.validate()?;
        for t in &tasks {
            t.validate()?;
        }
        for s in &occupied {
            s.validate()?;
        }
        Ok(Self {
            tasks,
            occupied,
            constraints,
            today: Local::now().date_naive(),
            horizon_days: DEFAULT_HORIZON_DAYS,
        })
    }

    /// Override the reference date (defaults to the host's local date).
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn run(&self) -> ScheduleResult {
        let mut result = ScheduleResult::default();
        let mut planned: Vec<PlannedTask> = self.tasks.iter().cloned().map(PlannedTask::new).collect();

        let (reservations, mut decided) =
            reserve_pinned(&mut planned, &self.constraints, &self.occupied, &mut result);

        let mut free = free_map(
            self.today,
            self.horizon_days,
            &self.constraints,
            &self.occupied,
            &reservations,
        );

        for idx in greedy_order(&planned, self.today) {
            let task = &mut planned[idx];
            allocate(task, &mut free, &self.constraints, &mut result);
            if let Some(message) = classify(task, self.today, &free) {
                result.messages.push(message);
            }
            decided.push(idx);
        }

        let mut slots: Vec<Option<PlannedTask>> = planned.into_iter().map(Some).collect();
        for idx in decided {
            if let Some(p) = slots[idx].take() {
                if p.outcome.is_scheduled() {
                    result.scheduled.push(p);
                } else {
                    result.impossible.push(p);
                }
            }
        }

        result.assemble(&self.occupied);

        info!(
            today = %self.today,
            horizon_days = self.horizon_days,
            scheduled = result.scheduled.len(),
            impossible = result.impossible.len(),
            "schedule generated"
        );
        result
    }
}
