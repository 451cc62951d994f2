//! Greedy multi-day allocation of a single task.

use chrono::NaiveDate;
use tracing::debug;

use crate::constraints::Constraints;
use crate::free_slots::FreeMap;
use crate::schedule::{AgendaItem, ScheduleResult};
use crate::task::{AllocatedBlock, PlannedTask, Task};
use crate::time::{Interval, MIN_BLOCK_HOURS, advance, duration_hours};

/// Place as much of `planned` as fits, walking days up to its deadline.
///
/// Consumes the used part of each free interval in `free`. Blocks are never
/// merged; one task may end up with many blocks across many days.
pub(crate) fn allocate(
    planned: &mut PlannedTask,
    free: &mut FreeMap,
    constraints: &Constraints,
    result: &mut ScheduleResult,
) {
    let deadline = planned.task.deadline;

    for (&day, slots) in free.range_mut(..=deadline) {
        if planned.is_complete() {
            break;
        }

        let mut available = constraints.max_hours_per_day - result.task_hours_on(day);
        if available < MIN_BLOCK_HOURS {
            continue;
        }

        let mut kept: Vec<Interval> = Vec::with_capacity(slots.len());
        for &(slot_start, slot_end) in slots.iter() {
            if planned.is_complete() || available < MIN_BLOCK_HOURS {
                kept.push((slot_start, slot_end));
                continue;
            }

            let slot_hours = duration_hours(slot_start, slot_end);
            let take = planned.remaining_hours().min(slot_hours).min(available);
            if slot_hours < MIN_BLOCK_HOURS || take < MIN_BLOCK_HOURS {
                kept.push((slot_start, slot_end));
                continue;
            }

            let block_end = advance(slot_start, take);
            let reason = placement_reason(&planned.task, day);

            result.push_item(
                day,
                AgendaItem::Task {
                    task_id: planned.task.id.clone(),
                    title: planned.task.title.clone(),
                    start_time: slot_start,
                    end_time: block_end,
                    duration_hours: take,
                    priority: planned.task.priority,
                    color: planned.task.priority.color().to_string(),
                    reason: reason.clone(),
                },
            );
            result.messages.push(format!(
                "'{}' -> {} {}-{} ({})",
                planned.task.title,
                day.format("%d/%m"),
                slot_start.format("%H:%M"),
                block_end.format("%H:%M"),
                reason
            ));
            debug!(task = %planned.task.id, %day, start = %slot_start, end = %block_end, hours = take, "block placed");

            planned.outcome.blocks.push(AllocatedBlock {
                date: day,
                start_time: slot_start,
                end_time: block_end,
                duration_hours: take,
            });
            available -= take;

            if block_end < slot_end {
                kept.push((block_end, slot_end));
            }
        }
        *slots = kept;
    }
}

/// Short explanation attached to each placed block.
pub fn placement_reason(task: &Task, day: NaiveDate) -> String {
    let days_left = (task.deadline - day).num_days();
    let urgency = match days_left {
        i64::MIN..=0 => "deadline today".to_string(),
        1 => "deadline tomorrow".to_string(),
        2..=3 => format!("deadline in {days_left}d"),
        _ => format!("deadline on {}", task.deadline.format("%d/%m")),
    };
    format!("priority {}, {}", task.priority, urgency)
}
