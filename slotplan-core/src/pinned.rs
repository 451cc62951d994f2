//! Pinned-task reservation pass.
//!
//! Runs before greedy allocation. Pinned tasks are atomic: they get exactly
//! their requested window or nothing.

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::constraints::Constraints;
use crate::schedule::{AgendaItem, ScheduleResult};
use crate::slot::OccupiedSlot;
use crate::task::{AllocatedBlock, PlannedTask, Unschedulable};
use crate::time::overlaps;

/// A pinned window that was accepted; treated as occupied by the greedy pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub title: String,
}

/// Reserve every pinned task in `tasks`, earliest start first.
///
/// Returns the accepted reservations and the indices of pinned tasks in the
/// order they were decided.
pub(crate) fn reserve_pinned(
    tasks: &mut [PlannedTask],
    constraints: &Constraints,
    occupied: &[OccupiedSlot],
    result: &mut ScheduleResult,
) -> (Vec<Reservation>, Vec<usize>) {
    let mut order: Vec<usize> = (0..tasks.len())
        .filter(|&i| tasks[i].task.is_pinned())
        .collect();
    // stable: equal starts keep input order
    order.sort_by_key(|&i| tasks[i].task.pinned_at);

    let mut reservations: Vec<Reservation> = Vec::new();

    for &idx in &order {
        let planned = &mut tasks[idx];
        let Some((date, start, end)) = planned.task.pinned_interval() else {
            continue;
        };

        match check_window(date, start, end, constraints, occupied, &reservations) {
            Err(reason) => {
                debug!(task = %planned.task.id, %date, %reason, "pinned task rejected");
                result.messages.push(format!(
                    "'{}' not schedulable: {}",
                    planned.task.title, reason
                ));
                planned.mark_impossible(reason);
            }
            Ok(()) => {
                let task = &planned.task;
                let reason = format!("pinned, priority {}", task.priority);
                result.push_item(
                    date,
                    AgendaItem::Task {
                        task_id: task.id.clone(),
                        title: task.title.clone(),
                        start_time: start,
                        end_time: end,
                        duration_hours: task.duration_hours,
                        priority: task.priority,
                        color: task.priority.color().to_string(),
                        reason: reason.clone(),
                    },
                );
                result.messages.push(format!(
                    "'{}' pinned -> {} {}-{} ({})",
                    task.title,
                    date.format("%d/%m"),
                    start.format("%H:%M"),
                    end.format("%H:%M"),
                    reason
                ));
                debug!(task = %task.id, %date, %start, %end, "pinned task reserved");

                reservations.push(Reservation {
                    date,
                    start,
                    end,
                    title: task.title.clone(),
                });
                let duration_hours = task.duration_hours;
                planned.outcome.blocks.push(AllocatedBlock {
                    date,
                    start_time: start,
                    end_time: end,
                    duration_hours,
                });
                planned.mark_scheduled();
            }
        }
    }

    (reservations, order)
}

fn check_window(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    constraints: &Constraints,
    occupied: &[OccupiedSlot],
    reservations: &[Reservation],
) -> Result<(), Unschedulable> {
    let (day_start, day_end) = constraints.working_window();
    if start < day_start || end > day_end {
        return Err(Unschedulable::PinnedOutsideWorkingHours {
            start,
            end,
            day_start,
            day_end,
        });
    }

    if let Some(occ) = occupied
        .iter()
        .find(|o| o.date == date && overlaps((start, end), o.interval()))
    {
        return Err(Unschedulable::PinnedConflictsOccupied {
            title: occ.display_title().to_string(),
            start: occ.start_time,
            end: occ.end_time,
        });
    }

    if let Some(other) = reservations
        .iter()
        .find(|r| r.date == date && overlaps((start, end), (r.start, r.end)))
    {
        return Err(Unschedulable::PinnedConflictsPinned {
            title: other.title.clone(),
            start: other.start,
            end: other.end,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotCategory;
    use crate::task::Task;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn pinned(title: &str, hours: f64, h: u32, m: u32) -> PlannedTask {
        PlannedTask::new(
            Task::new(title, hours, day())
                .with_id(title)
                .pinned_at(day().and_time(t(h, m))),
        )
    }

    #[test]
    fn earlier_pin_wins_conflict() {
        // later one listed first; start order decides
        let mut tasks = vec![pinned("review", 1.0, 10, 0), pinned("call", 1.5, 9, 0)];
        let mut result = ScheduleResult::default();
        let (res, order) =
            reserve_pinned(&mut tasks, &Constraints::default(), &[], &mut result);

        assert_eq!(order, vec![1, 0]);
        assert_eq!(res.len(), 1);
        assert!(tasks[1].outcome.is_scheduled());
        assert_eq!(tasks[1].scheduled_hours(), 1.5);

        let reason = tasks[0].outcome.reason().unwrap();
        assert!(matches!(reason, Unschedulable::PinnedConflictsPinned { title, .. } if title == "call"));
        assert!(reason.to_string().contains("09:00-10:30"));
        assert!(tasks[0].outcome.blocks.is_empty());
    }

    #[test]
    fn outside_working_hours_is_rejected() {
        let mut tasks = vec![pinned("late", 1.0, 21, 30), pinned("early", 1.0, 7, 0)];
        let mut result = ScheduleResult::default();
        let (res, _) = reserve_pinned(&mut tasks, &Constraints::default(), &[], &mut result);
        assert!(res.is_empty());
        for t in &tasks {
            assert!(matches!(
                t.outcome.reason(),
                Some(Unschedulable::PinnedOutsideWorkingHours { .. })
            ));
        }
    }

    #[test]
    fn pin_ending_at_closing_hour_is_accepted() {
        let mut tasks = vec![pinned("wrapup", 1.0, 21, 0)];
        let mut result = ScheduleResult::default();
        let (res, _) = reserve_pinned(&mut tasks, &Constraints::default(), &[], &mut result);

        assert_eq!(
            res,
            vec![Reservation {
                date: day(),
                start: t(21, 0),
                end: t(22, 0),
                title: "wrapup".into(),
            }]
        );
        assert!(tasks[0].outcome.is_scheduled());
        assert_eq!(tasks[0].scheduled_hours(), 1.0);
    }

    #[test]
    fn occupied_overlap_is_rejected_touching_is_fine() {
        let occ =
            vec![OccupiedSlot::new(day(), t(9, 0), t(10, 0), SlotCategory::Course, "Physics").unwrap()];
        let mut tasks = vec![pinned("overlap", 1.0, 9, 30), pinned("after", 1.0, 10, 0)];
        let mut result = ScheduleResult::default();
        reserve_pinned(&mut tasks, &Constraints::default(), &occ, &mut result);

        assert!(matches!(
            tasks[0].outcome.reason(),
            Some(Unschedulable::PinnedConflictsOccupied { title, .. }) if title == "Physics"
        ));
        assert!(tasks[1].outcome.is_scheduled());
        assert_eq!(result.day(day()).len(), 1);
        assert_eq!(result.messages.len(), 2);
    }
}
