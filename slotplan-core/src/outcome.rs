//! Final verdict for a greedily allocated task.

use chrono::NaiveDate;

use crate::free_slots::{FreeMap, free_hours_until};
use crate::task::{PlannedTask, Unschedulable};

/// Classify `planned` after allocation and return the trace message for a failure.
///
/// Partial placement counts as a failure. A task with nothing placed is
/// explained by comparing its duration with the free time still left before
/// its deadline.
pub(crate) fn classify(planned: &mut PlannedTask, today: NaiveDate, free: &FreeMap) -> Option<String> {
    if planned.is_complete() {
        planned.mark_scheduled();
        return None;
    }

    let task = &planned.task;
    let placed = planned.scheduled_hours();

    if placed > 0.0 {
        let message = format!(
            "'{}' partially scheduled ({:.1}h/{:.1}h), not schedulable in full",
            task.title, placed, task.duration_hours
        );
        let reason = Unschedulable::Partial {
            placed,
            required: task.duration_hours,
            deadline: task.deadline,
        };
        planned.mark_impossible(reason);
        return Some(message);
    }

    let reason = if task.deadline < today {
        Unschedulable::DeadlinePassed {
            deadline: task.deadline,
        }
    } else {
        let available = free_hours_until(free, task.deadline);
        if available < task.duration_hours {
            Unschedulable::InsufficientCapacity {
                available,
                required: task.duration_hours,
                deadline: task.deadline,
            }
        } else {
            Unschedulable::Overloaded {
                deadline: task.deadline,
            }
        }
    };

    let message = format!("'{}' not schedulable: {}", task.title, reason);
    planned.mark_impossible(reason);
    Some(message)
}
