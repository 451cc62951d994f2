//! Greedy placement order for non-pinned tasks.
//!
//! Ascending by (days until deadline, -priority weight, duration). The sort is
//! stable, so fully tied tasks keep their input order.

use chrono::NaiveDate;

use crate::task::PlannedTask;

/// Indices of the non-pinned tasks in `tasks`, in placement order.
pub fn greedy_order(tasks: &[PlannedTask], today: NaiveDate) -> Vec<usize> {
    let mut order: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.task.is_pinned())
        .map(|(i, _)| i)
        .collect();

    order.sort_by(|&a, &b| {
        let (ta, tb) = (&tasks[a].task, &tasks[b].task);
        let days_a = (ta.deadline - today).num_days();
        let days_b = (tb.deadline - today).num_days();
        days_a
            .cmp(&days_b)
            .then_with(|| tb.priority.weight().cmp(&ta.priority.weight()))
            .then_with(|| ta.duration_hours.total_cmp(&tb.duration_hours))
    });
    order
}
