//! Google Calendar event listings -> occupied slots.
//!
//! Accepts either the API's list envelope (`{"items": [...]}`) or a bare
//! array of events. Timestamps are reduced to local wall-clock time: the
//! offset is dropped and seconds are truncated.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use serde::Deserialize;
use slotplan_core::{OccupiedSlot, SlotCategory};
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::types::{RawEvent, RawEventTime};

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Envelope { items: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

/// Parse a JSON event listing into `CalendarImport` slots.
///
/// All-day events and entries that do not decode are skipped. An event that
/// runs past midnight is clipped to 23:59 of its start date.
pub fn parse_events_json(json: &str) -> Result<Vec<OccupiedSlot>, IngestError> {
    let listing: Listing = serde_json::from_str(json)?;
    let values = match listing {
        Listing::Envelope { items } => items,
        Listing::Bare(items) => items,
    };

    let mut events = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<RawEvent>(value) {
            Ok(ev) => events.push(ev),
            Err(e) => warn!(error = %e, "skipping undecodable event"),
        }
    }
    parse_events(&events)
}

pub fn parse_events(events: &[RawEvent]) -> Result<Vec<OccupiedSlot>, IngestError> {
    let offset_re = Regex::new(r"(Z|[+-]\d{2}:?\d{2})$")?;
    let mut out = Vec::new();

    for ev in events {
        let title = ev.summary.clone().unwrap_or_default();
        let (Some(start), Some(end)) = (
            event_instant(&ev.start, &offset_re),
            event_instant(&ev.end, &offset_re),
        ) else {
            debug!(%title, "skipping all-day or malformed event");
            continue;
        };

        let end_time = if end.date() > start.date() {
            NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()
        } else {
            end.time()
        };

        match OccupiedSlot::new(
            start.date(),
            start.time(),
            end_time,
            SlotCategory::CalendarImport,
            title.clone(),
        ) {
            Ok(slot) => out.push(slot),
            Err(e) => warn!(%title, error = %e, "skipping event"),
        }
    }

    Ok(out)
}

fn event_instant(t: &RawEventTime, offset_re: &Regex) -> Option<NaiveDateTime> {
    let raw = t.date_time.as_deref()?.trim();
    let local = offset_re.replace(raw, "");
    let parsed = NaiveDateTime::parse_from_str(&local, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&local, "%Y-%m-%dT%H:%M"))
        .ok()?;
    parsed.with_second(0)?.with_nanosecond(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_envelope_and_drops_offsets() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [
                {"summary": "Standup",
                 "start": {"dateTime": "2026-03-02T09:15:42+01:00"},
                 "end":   {"dateTime": "2026-03-02T09:45:00+01:00"}},
                {"summary": "Holiday",
                 "start": {"date": "2026-03-03"},
                 "end":   {"date": "2026-03-04"}},
                {"summary": "Dentist",
                 "start": {"dateTime": "2026-03-04T14:00:00Z"},
                 "end":   {"dateTime": "2026-03-04T15:30:00Z"}}
            ]
        }"#;

        let slots = parse_events_json(json).unwrap();
        assert_eq!(slots.len(), 2);

        assert_eq!(slots[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(slots[0].start_time, t(9, 15));
        assert_eq!(slots[0].end_time, t(9, 45));
        assert_eq!(slots[0].category, SlotCategory::CalendarImport);
        assert_eq!(slots[0].title, "Standup");

        assert_eq!(slots[1].title, "Dentist");
        assert_eq!(slots[1].start_time, t(14, 0));
        assert_eq!(slots[1].end_time, t(15, 30));
    }

    #[test]
    fn accepts_bare_array_and_clips_overnight() {
        let json = r#"[
            {"summary": "Night shift",
             "start": {"dateTime": "2026-03-05T20:00:00-05:00"},
             "end":   {"dateTime": "2026-03-06T04:00:00-05:00"}},
            {"start": {"dateTime": "2026-03-05T10:00"},
             "end":   {"dateTime": "2026-03-05T11:00"}},
            "not an event"
        ]"#;

        let slots = parse_events_json(json).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].end_time, t(23, 59));
        assert_eq!(slots[1].title, "");
        assert_eq!(slots[1].display_title(), "Calendar");
    }

    #[test]
    fn inverted_event_is_skipped() {
        let json = r#"[{"summary": "broken",
            "start": {"dateTime": "2026-03-05T11:00:00Z"},
            "end":   {"dateTime": "2026-03-05T10:00:00Z"}}]"#;
        assert!(parse_events_json(json).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(parse_events_json("{nope"), Err(IngestError::Json(_))));
    }
}
