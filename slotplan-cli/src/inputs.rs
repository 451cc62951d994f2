use anyhow::{Context, Result};
use slotplan_core::{ExportedBlock, OccupiedSlot, Task};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    if !path.exists() {
        warn!(path = %path.display(), "tasks file not found, planning with no tasks");
        return Ok(Vec::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    let json = serde_json::to_string_pretty(tasks)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Append `new` to the task list stored at `path`; returns the new total.
pub fn append_tasks(path: &Path, new: Vec<Task>) -> Result<usize> {
    let mut tasks = if path.exists() { read_tasks(path)? } else { Vec::new() };
    tasks.extend(new);
    write_tasks(path, &tasks)?;
    Ok(tasks.len())
}

/// Gather every occupied interval: manual slots, imported events and
/// blocks already exported to the calendar.
pub fn load_occupied(
    slots_csv: Option<&Path>,
    events_json: Option<&Path>,
    ledger: &[ExportedBlock],
) -> Result<Vec<OccupiedSlot>> {
    let mut occupied = Vec::new();

    if let Some(p) = slots_csv {
        let slots = slotplan_ingest::parse_slot_csv(p)
            .with_context(|| format!("parsing {}", p.display()))?;
        info!(count = slots.len(), path = %p.display(), "manual slots loaded");
        occupied.extend(slots);
    }

    if let Some(p) = events_json {
        let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        let slots = slotplan_ingest::parse_events_json(&s)
            .with_context(|| format!("parsing {}", p.display()))?;
        info!(count = slots.len(), path = %p.display(), "calendar events loaded");
        occupied.extend(slots);
    }

    for block in ledger {
        match block.to_occupied() {
            Ok(slot) => occupied.push(slot),
            Err(e) => warn!(key = %block.key, error = %e, "skipping ledger entry"),
        }
    }

    Ok(occupied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use slotplan_core::{BlockKey, SlotCategory};

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("slotplan-{}-{}", std::process::id(), name))
    }

    #[test]
    fn append_creates_then_extends() {
        let path = scratch("tasks.json");
        let d = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(append_tasks(&path, vec![Task::new("a", 1.0, d)]).unwrap(), 1);
        assert_eq!(append_tasks(&path, vec![Task::new("b", 2.0, d)]).unwrap(), 2);
        let back = read_tasks(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(back[1].title, "b");
    }

    #[test]
    fn ledger_blocks_become_exported_slots() {
        let csv_path = scratch("slots.csv");
        fs::write(
            &csv_path,
            "date,start,end,category,title\n2026-03-02,09:00,10:00,work,Shift\n",
        )
        .unwrap();
        let ledger = vec![ExportedBlock {
            key: BlockKey("x_2026-03-02_13:00:00".into()),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            start: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            title: "Essay".into(),
        }];

        let occupied = load_occupied(Some(&csv_path), None, &ledger).unwrap();
        fs::remove_file(&csv_path).ok();

        assert_eq!(occupied.len(), 2);
        assert_eq!(occupied[0].category, SlotCategory::Work);
        assert_eq!(occupied[1].category, SlotCategory::Exported);
        assert_eq!(occupied[1].title, "[Exported] Essay");
    }
}
