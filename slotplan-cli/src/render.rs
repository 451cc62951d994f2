//! Plain-text rendering of a schedule for the terminal and for LLM prompts.

use slotplan_core::{AgendaItem, PlannedTask, ScheduleResult, Task};
use std::fmt::Write;

fn item_line(item: &AgendaItem) -> String {
    let span = format!(
        "{}-{}",
        item.start_time().format("%H:%M"),
        item.end_time().format("%H:%M")
    );
    match item {
        AgendaItem::Occupied { title, category, .. } => {
            format!("  {span}  # {title} ({category})")
        }
        AgendaItem::Task {
            title,
            duration_hours,
            reason,
            ..
        } => format!("  {span}  * {title} [{duration_hours:.1}h] {reason}"),
    }
}

pub fn render_agenda(result: &ScheduleResult) -> String {
    let mut out = String::new();

    if result.calendar.is_empty() {
        out.push_str("Nothing scheduled.\n");
    }
    for (date, items) in &result.calendar {
        let _ = writeln!(
            out,
            "{}  ({:.1}h of tasks)",
            date.format("%a %d/%m/%Y"),
            result.task_hours_on(*date)
        );
        for item in items {
            out.push_str(&item_line(item));
            out.push('\n');
        }
        out.push('\n');
    }

    if !result.impossible.is_empty() {
        out.push_str("Not schedulable:\n");
        for p in &result.impossible {
            let _ = writeln!(out, "  - {}", impossible_line(p));
        }
        out.push('\n');
    }

    out
}

fn impossible_line(p: &PlannedTask) -> String {
    let reason = p
        .outcome
        .reason()
        .map(|r| r.to_string())
        .unwrap_or_default();
    format!(
        "{} ({:.1}h/{:.1}h placed): {}",
        p.task.title,
        p.scheduled_hours(),
        p.task.duration_hours,
        reason
    )
}

pub fn render_trace(result: &ScheduleResult) -> String {
    let mut out = String::from("Decisions:\n");
    for m in &result.messages {
        let _ = writeln!(out, "  {m}");
    }
    out
}

pub fn summarize_tasks(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| {
            format!(
                "- {} ({:.1}h, priority {}, due {})",
                t.title,
                t.duration_hours,
                t.priority,
                t.deadline.format("%d/%m/%Y")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Task blocks only, one line per block, plus the unschedulable list.
pub fn summarize_schedule(result: &ScheduleResult) -> String {
    let mut lines = Vec::new();
    for (date, items) in &result.calendar {
        for item in items.iter().filter(|i| i.is_task()) {
            lines.push(format!(
                "{} {}-{}: {}",
                date.format("%a %d/%m"),
                item.start_time().format("%H:%M"),
                item.end_time().format("%H:%M"),
                item.title()
            ));
        }
    }
    for p in &result.impossible {
        lines.push(format!("NOT SCHEDULED: {}", impossible_line(p)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use slotplan_core::{Constraints, OccupiedSlot, Priority, Scheduler, SlotCategory};

    fn sample() -> ScheduleResult {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let slot = OccupiedSlot::new(
            today,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            SlotCategory::Course,
            "Algebra",
        )
        .unwrap();
        let tasks = vec![
            Task::new("Essay", 2.0, today).with_priority(Priority::High),
            Task::new("Thesis", 40.0, today),
        ];
        Scheduler::new(tasks, vec![slot], Constraints::default())
            .unwrap()
            .today(today)
            .horizon_days(0)
            .run()
    }

    #[test]
    fn agenda_lists_days_items_and_failures() {
        let text = render_agenda(&sample());
        assert!(text.contains("Mon 02/03/2026"));
        assert!(text.contains("08:00-09:00  # Algebra (Course)"));
        assert!(text.contains("09:00-11:00  * Essay [2.0h] priority High, deadline today"));
        assert!(text.contains("Not schedulable:"));
        assert!(text.contains("Thesis"));
    }

    #[test]
    fn schedule_summary_skips_occupied_items() {
        let summary = summarize_schedule(&sample());
        assert!(summary.contains("Mon 02/03 09:00-11:00: Essay"));
        assert!(!summary.contains("Algebra"));
        assert!(summary.contains("NOT SCHEDULED: Thesis"));
    }
}
