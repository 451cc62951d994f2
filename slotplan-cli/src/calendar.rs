use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use slotplan_core::ExportRequest;
use std::io::Write;

/// A scheduled block ready to be written to a calendar, in local wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub start_local: NaiveDateTime,
    pub end_local: NaiveDateTime,
    pub summary: String,
    pub description: String,
}

impl From<&ExportRequest> for CalendarEvent {
    fn from(req: &ExportRequest) -> Self {
        Self {
            uid: format!("{}@slotplan", req.key),
            start_local: req.date.and_time(req.start),
            end_local: req.date.and_time(req.end),
            summary: req.title.clone(),
            description: req.description.clone(),
        }
    }
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are floating local times; the importing calendar applies its own zone.
pub fn events_to_ics(events: &[CalendarEvent], stamp: NaiveDate) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Slotplan//EN\r\n");

    for e in events {
        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!("UID:{}\r\n", e.uid));
        s.push_str(&format!("DTSTAMP:{}T000000Z\r\n", stamp.format("%Y%m%d")));
        s.push_str(&format!("DTSTART:{}\r\n", e.start_local.format("%Y%m%dT%H%M%S")));
        s.push_str(&format!("DTEND:{}\r\n", e.end_local.format("%Y%m%dT%H%M%S")));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\r\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

/// Push ICS to Google Calendar using `gcalcli import`.
///
/// Requires `gcalcli` installed and authenticated on the machine.
pub fn push_ics_via_gcalcli(ics: &str, calendar: Option<&str>) -> Result<()> {
    if which::which("gcalcli").is_err() {
        bail!(
            "gcalcli is not installed. Install it, authenticate, then retry.\n\nmacOS (brew):  brew install gcalcli\nUbuntu (pipx): pipx install gcalcli\n\nOr write a file: slotplan export > schedule.ics"
        );
    }

    let mut cmd = std::process::Command::new("gcalcli");
    cmd.arg("import");
    if let Some(cal) = calendar {
        cmd.args(["--calendar", cal]);
    }

    let mut child = cmd
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .spawn()
        .context("spawning gcalcli import")?;

    {
        let stdin = child.stdin.as_mut().context("no stdin")?;
        stdin
            .write_all(ics.as_bytes())
            .context("writing ICS to gcalcli")?;
    }

    let status = child.wait().context("waiting on gcalcli")?;
    if !status.success() {
        bail!("gcalcli import failed: {status}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use slotplan_core::BlockKey;

    #[test]
    fn ics_uses_floating_times_and_escapes_text() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let req = ExportRequest {
            key: BlockKey("t1_2026-03-02_08:00:00".into()),
            title: "[Planner] Essay, draft".into(),
            date,
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            description: "Priority: High\nDeadline: 04/03/2026\n".into(),
        };
        let ics = events_to_ics(&[CalendarEvent::from(&req)], date);

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("UID:t1_2026-03-02_08:00:00@slotplan\r\n"));
        assert!(ics.contains("DTSTART:20260302T080000\r\n"));
        assert!(ics.contains("DTEND:20260302T103000\r\n"));
        assert!(ics.contains("SUMMARY:[Planner] Essay\\, draft\r\n"));
        assert!(ics.contains("DESCRIPTION:Priority: High\\nDeadline: 04/03/2026\\n\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }
}
