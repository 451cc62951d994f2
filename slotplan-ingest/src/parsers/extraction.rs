//! Prompt construction and response decoding for LLM task extraction.

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use slotplan_core::{Priority, Task};
use tracing::warn;

use crate::error::IngestError;
use crate::types::{ExtractedTask, Extraction};

const DEFAULT_TITLE: &str = "Untitled task";
const DEFAULT_DURATION_HOURS: f64 = 2.0;
const DEFAULT_DEADLINE_DAYS: u64 = 7;

fn default_deadline(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(DEFAULT_DEADLINE_DAYS))
        .unwrap_or(today)
}

/// System prompt asking the model for a strict JSON task list.
pub fn extraction_prompt(today: NaiveDate) -> String {
    let fallback = default_deadline(today).format("%Y-%m-%d");
    format!(
        r#"You are an expert planning assistant. Read the user's text and extract every task they need to get done.

STRICT RULES:
1. Return ONLY a valid JSON object, with no text before or after it.
2. Every task has: title, duration_hours, deadline, priority, notes.
3. duration_hours: if not stated, estimate from the complexity (e.g. "write a report" = 3h, "revise for an exam" = 6h, "read a book" = 5h, "code a script" = 4h).
4. deadline: if not stated, use "{fallback}" (one week).
5. priority: EXACTLY "Low", "Normal" or "High". If not stated, infer it from context (exam tomorrow = High).
6. notes: a short summary of any extra details.
7. planning_suggestions: one sentence of advice on how to approach these tasks.

Today's date: {today} ({weekday})

EXPECTED JSON FORMAT:
{{
    "tasks": [
        {{
            "title": "Task title",
            "duration_hours": 2.5,
            "deadline": "YYYY-MM-DD",
            "priority": "High",
            "notes": "Optional details"
        }}
    ],
    "planning_suggestions": "Planning advice"
}}"#,
        today = today.format("%d/%m/%Y"),
        weekday = today.format("%A"),
    )
}

/// Prompt asking for 3-5 points of coaching advice on a generated plan.
pub fn advice_prompt(tasks_summary: &str, schedule_summary: &str) -> String {
    format!(
        "As a productivity coach, give practical and motivating advice (3-5 points) for this task plan.\n\n\
         TASKS TO PLAN:\n{tasks_summary}\n\n\
         PROPOSED SCHEDULE:\n{schedule_summary}\n\n\
         Be concise, positive and actionable."
    )
}

#[derive(Deserialize)]
struct RawExtraction {
    #[serde(default)]
    tasks: Vec<ExtractedTask>,
    #[serde(default)]
    planning_suggestions: Option<String>,
}

/// Decode a model response into tasks, filling in defaults for missing fields.
pub fn parse_extraction(content: &str, today: NaiveDate) -> Result<Extraction, IngestError> {
    let json = locate_json(content)?;
    let raw: RawExtraction = serde_json::from_str(&json)?;

    let tasks = raw
        .tasks
        .into_iter()
        .map(|t| into_task(t, today))
        .collect();

    Ok(Extraction {
        tasks,
        planning_suggestions: raw.planning_suggestions.unwrap_or_default(),
    })
}

fn locate_json(content: &str) -> Result<String, IngestError> {
    let fence_re = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```")?;
    if let Some(caps) = fence_re.captures(content) {
        return Ok(caps[1].to_string());
    }

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(content[start..=end].to_string()),
        _ => {
            let snippet: String = content.chars().take(200).collect();
            Err(IngestError::NoJson(snippet))
        }
    }
}

fn into_task(raw: ExtractedTask, today: NaiveDate) -> Task {
    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let duration = raw
        .duration_hours
        .as_ref()
        .and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().trim_end_matches('h').parse().ok(),
            _ => None,
        })
        .filter(|h| h.is_finite() && *h > 0.0)
        .unwrap_or(DEFAULT_DURATION_HOURS);

    let deadline = raw
        .deadline
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .unwrap_or_else(|| default_deadline(today));

    let priority = match raw.priority.as_deref() {
        None => Priority::Normal,
        Some(p) => p.parse().unwrap_or_else(|e| {
            warn!(%title, error = %e, "unknown priority from extraction, using Normal");
            Priority::Normal
        }),
    };

    Task::new(title, duration, deadline)
        .with_priority(priority)
        .with_notes(raw.notes.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn prompt_mentions_fallback_deadline() {
        let p = extraction_prompt(today());
        assert!(p.contains("2026-03-09"));
        assert!(p.contains("02/03/2026 (Monday)"));
    }

    #[test]
    fn fenced_block_is_preferred() {
        let content = r#"Sure! Here you go:
```json
{"tasks": [{"title": "Revise algebra", "duration_hours": 6, "deadline": "2026-03-04",
            "priority": "High", "notes": "chapters 3-5"}],
 "planning_suggestions": "Start with the hardest chapter."}
```
Anything else {?}"#;

        let ex = parse_extraction(content, today()).unwrap();
        assert_eq!(ex.tasks.len(), 1);
        let t = &ex.tasks[0];
        assert_eq!(t.title, "Revise algebra");
        assert_eq!(t.duration_hours, 6.0);
        assert_eq!(t.deadline, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.notes, "chapters 3-5");
        assert_eq!(ex.planning_suggestions, "Start with the hardest chapter.");
    }

    #[test]
    fn bare_object_with_missing_fields_gets_defaults() {
        let content = r#"{"tasks": [{}, {"title": "Essay", "duration_hours": "3.5h", "priority": "Haute",
                          "deadline": "next week"}]}"#;
        let ex = parse_extraction(content, today()).unwrap();

        let first = &ex.tasks[0];
        assert_eq!(first.title, "Untitled task");
        assert_eq!(first.duration_hours, 2.0);
        assert_eq!(first.deadline, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!(first.priority, Priority::Normal);
        assert_eq!(first.notes, "");

        let second = &ex.tasks[1];
        assert_eq!(second.duration_hours, 3.5);
        assert_eq!(second.priority, Priority::High);
        assert_eq!(second.deadline, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_ne!(first.id, second.id);
        assert_eq!(ex.planning_suggestions, "");
    }

    #[test]
    fn response_without_json_is_an_error() {
        let err = parse_extraction("I could not find any tasks.", today()).unwrap_err();
        assert!(matches!(err, IngestError::NoJson(_)));
    }
}
