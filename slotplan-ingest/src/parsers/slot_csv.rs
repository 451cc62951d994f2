//! Manually maintained occupied slots, as CSV.
//!
//! Expected header:
//!   date,start,end,category,title
//!   2026-03-02,09:00,11:00,course,Algebra

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use slotplan_core::{OccupiedSlot, SlotCategory};
use tracing::warn;

use crate::error::IngestError;

#[derive(Debug, Deserialize)]
struct SlotRow {
    date: String,
    start: String,
    end: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    title: String,
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

fn row_to_slot(row: &SlotRow) -> Result<OccupiedSlot, String> {
    let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("bad date '{}'", row.date))?;
    let start = parse_time(&row.start).ok_or_else(|| format!("bad start '{}'", row.start))?;
    let end = parse_time(&row.end).ok_or_else(|| format!("bad end '{}'", row.end))?;
    let category: SlotCategory = row.category.parse().map_err(|e| format!("{e}"))?;
    OccupiedSlot::new(date, start, end, category, row.title.trim()).map_err(|e| e.to_string())
}

pub fn parse_slot_csv_reader<R: Read>(reader: R) -> Result<Vec<OccupiedSlot>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut out = Vec::new();
    for (i, record) in rdr.deserialize::<SlotRow>().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable slot row");
                continue;
            }
        };
        match row_to_slot(&row) {
            Ok(slot) => out.push(slot),
            Err(reason) => warn!(line, %reason, "skipping slot row"),
        }
    }
    Ok(out)
}

pub fn parse_slot_csv(path: impl AsRef<Path>) -> Result<Vec<OccupiedSlot>, IngestError> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_slot_csv_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_bad_ones() {
        let data = "\
date,start,end,category,title
2026-03-02,09:00,11:00,course,Algebra
2026-03-02,14:00,12:00,work,Backwards
2026-03-03, 18:30 ,20:00,Sport,
not-a-date,09:00,10:00,work,Nope
2026-03-04,10:00,11:00,juggling,Unknown category
2026-03-05,08:00,09:00,Rendez-vous,Doctor
";
        let slots = parse_slot_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(slots.len(), 3);

        assert_eq!(slots[0].title, "Algebra");
        assert_eq!(slots[0].category, SlotCategory::Course);

        assert_eq!(slots[1].start_time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(slots[1].display_title(), "Sport");

        assert_eq!(slots[2].category, SlotCategory::Appointment);
    }

    #[test]
    fn empty_file_yields_no_slots() {
        let slots = parse_slot_csv_reader("date,start,end,category,title\n".as_bytes()).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            parse_slot_csv("/nonexistent/slots.csv"),
            Err(IngestError::Io(_))
        ));
    }
}
