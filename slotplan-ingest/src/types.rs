use serde::{Deserialize, Serialize};
use slotplan_core::Task;

/// Start or end of a calendar event as the Google Calendar API returns it.
/// Timed events carry `dateTime`; all-day events only `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: RawEventTime,
    #[serde(default)]
    pub end: RawEventTime,
}

/// A task as proposed by the extraction model, before defaults are applied.
/// Every field is optional; models routinely omit or mistype them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTask {
    pub title: Option<String>,
    pub duration_hours: Option<serde_json::Value>,
    pub deadline: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

/// Decoded extraction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub tasks: Vec<Task>,
    pub planning_suggestions: String,
}
