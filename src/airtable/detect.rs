//! Event detection over raw poll rows.
//!
//! Two column conventions are supported:
//! 1. Named questions: `{event_name}_Question_{YYYY_MM_DD}`, with matching
//!    `_Response_` and `_Notes_` columns.
//! 2. Compact polls: `POLL_Q_{id}`, with `POLL_R_{id}` and `POLL_N_{id}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::airtable::client::AirtableRecord;

static QUESTION_COL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_Question_\d{4}_\d{2}_\d{2}$").expect("question column regex"));
static DATE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\d{4})_(\d{2})_(\d{2})$").expect("date suffix regex"));

#[derive(Debug, Clone, Serialize)]
pub struct PollEvent {
    pub event_id: String,
    pub event_name: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub question_column: String,
    pub response_column: String,
    pub notes_column: String,
}

/// One person's answer for a detected event.
#[derive(Debug, Clone)]
pub struct PollResponse {
    pub person: String,
    pub response: Option<String>,
    pub notes: Option<String>,
}

/// "meeting_is_tonight_at_8pm_2025_11_13" → "Meeting Is Tonight At 8pm".
pub fn parse_event_name(event_id: &str) -> String {
    let without_date = DATE_SUFFIX.replace(event_id, "");
    without_date
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// "…_2025_11_13" → "2025-11-13"; falls back to today when no date suffix.
pub fn extract_event_date(event_id: &str) -> String {
    if let Some(caps) = DATE_SUFFIX.captures(event_id) {
        return format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
    }
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Scan column names (sampled from the first row) for both conventions,
/// deduplicated by derived event id.
pub fn detect_events(records: &[AirtableRecord]) -> Vec<PollEvent> {
    let Some(sample) = records.first() else {
        return Vec::new();
    };

    let mut events: Vec<PollEvent> = Vec::new();
    let mut push = |event: PollEvent| {
        if !events.iter().any(|e| e.event_id == event.event_id) {
            events.push(event);
        }
    };

    for column in sample.fields.keys() {
        if QUESTION_COL.is_match(column) {
            let event_id = QUESTION_COL.replace(column, "").to_string();
            let full_event_id = match DATE_SUFFIX.captures(column) {
                Some(caps) => format!("{}_{}_{}_{}", event_id, &caps[1], &caps[2], &caps[3]),
                None => event_id.clone(),
            };
            push(PollEvent {
                event_name: parse_event_name(&event_id),
                date: extract_event_date(&full_event_id),
                event_id: full_event_id,
                question_column: column.clone(),
                response_column: column.replace("_Question_", "_Response_"),
                notes_column: column.replace("_Question_", "_Notes_"),
            });
        } else if let Some(poll_id) = column.strip_prefix("POLL_Q_") {
            push(PollEvent {
                event_id: format!("POLL_{poll_id}"),
                event_name: format!("Poll {poll_id}"),
                date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
                question_column: column.clone(),
                response_column: format!("POLL_R_{poll_id}"),
                notes_column: format!("POLL_N_{poll_id}"),
            });
        }
    }

    events
}

fn field_str(record: &AirtableRecord, column: &str) -> Option<String> {
    record
        .fields
        .get(column)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// All responses for one detected event; rows without a `Person` field are
/// ignored.
pub fn responses_for_event(records: &[AirtableRecord], event: &PollEvent) -> Vec<PollResponse> {
    records
        .iter()
        .filter_map(|record| {
            let person = field_str(record, "Person")?;
            Some(PollResponse {
                person,
                response: field_str(record, &event.response_column),
                notes: field_str(record, &event.notes_column),
            })
        })
        .collect()
}
