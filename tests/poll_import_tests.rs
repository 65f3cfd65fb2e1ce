//! Poll detection, fuzzy name matching and draft status derivation.

use clubpoints_server::airtable::client::AirtableRecord;
use clubpoints_server::airtable::detect::{
    detect_events, extract_event_date, parse_event_name, responses_for_event, PollResponse,
};
use clubpoints_server::airtable::import::{
    draft_attendance_rows, draft_status, synced_status,
};
use clubpoints_server::airtable::mapping::{flexible_name_match, resolve_member};
use clubpoints_server::engine::types::AttendanceStatus;
use uuid::Uuid;

fn record(fields: &[(&str, &str)]) -> AirtableRecord {
    AirtableRecord {
        id: "rec123".into(),
        created_time: "2025-11-01T00:00:00.000Z".into(),
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect(),
    }
}

fn response(person: &str, answer: Option<&str>, notes: Option<&str>) -> PollResponse {
    PollResponse {
        person: person.into(),
        response: answer.map(str::to_owned),
        notes: notes.map(str::to_owned),
    }
}

#[test]
fn detects_named_question_columns() {
    let rows = vec![record(&[
        ("Person", "Quinn"),
        ("team_meeting_Question_2025_11_13", "Coming tonight?"),
        ("team_meeting_Response_2025_11_13", "Yes"),
    ])];

    let events = detect_events(&rows);
    assert_eq!(events.len(), 1);
    let ev = &events[0];
    assert_eq!(ev.event_id, "team_meeting_2025_11_13");
    assert_eq!(ev.event_name, "Team Meeting");
    assert_eq!(ev.date, "2025-11-13");
    assert_eq!(ev.response_column, "team_meeting_Response_2025_11_13");
    assert_eq!(ev.notes_column, "team_meeting_Notes_2025_11_13");
}

#[test]
fn detects_compact_poll_columns() {
    let rows = vec![record(&[("Person", "Quinn"), ("POLL_Q_2.3", "Attending?")])];

    let events = detect_events(&rows);
    assert_eq!(events.len(), 1);
    let ev = &events[0];
    assert_eq!(ev.event_id, "POLL_2.3");
    assert_eq!(ev.event_name, "Poll 2.3");
    assert_eq!(ev.response_column, "POLL_R_2.3");
    assert_eq!(ev.notes_column, "POLL_N_2.3");
}

#[test]
fn no_rows_means_no_events() {
    assert!(detect_events(&[]).is_empty());
}

#[test]
fn event_names_are_title_cased_without_the_date() {
    assert_eq!(
        parse_event_name("meeting_is_tonight_at_8pm_2025_11_13"),
        "Meeting Is Tonight At 8pm"
    );
    assert_eq!(parse_event_name("retreat"), "Retreat");
}

#[test]
fn event_date_comes_from_the_suffix() {
    assert_eq!(extract_event_date("kickoff_2025_09_02"), "2025-09-02");
    // No suffix: defaults to today, still YYYY-MM-DD shaped.
    assert_eq!(extract_event_date("kickoff").len(), 10);
}

#[test]
fn rows_without_a_person_are_ignored() {
    let rows = vec![
        record(&[("team_Question_2025_11_13", "?")]),
        record(&[("Person", "Quinn"), ("team_Response_2025_11_13", "Yes")]),
    ];
    let events = detect_events(&rows);
    let responses = responses_for_event(&rows, &events[0]);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].person, "Quinn");
    assert_eq!(responses[0].response.as_deref(), Some("Yes"));
}

#[test]
fn name_matching_is_containment_or_first_token() {
    assert!(flexible_name_match("quinn", "Quinn Kiefer"));
    assert!(flexible_name_match("Kit Zeliff", "Kit"));
    assert!(flexible_name_match("ash", "Ash Barrett"));
    assert!(flexible_name_match("Sam Smith", "Sam Jones")); // first token
    assert!(!flexible_name_match("Bob", "Alice Chen"));
}

#[test]
fn resolved_names_are_remembered_across_lookups() {
    let id = Uuid::new_v4();
    let members = vec![(id, "Cachet Quinnell".to_string())];

    assert_eq!(resolve_member("cachet", &members), Some(id));
    // Second lookup is served from the remembered mapping.
    assert_eq!(resolve_member("cachet", &members), Some(id));
}

#[test]
fn stale_cached_matches_are_dropped() {
    let old_id = Uuid::new_v4();
    let before = vec![(old_id, "Staleton Reyes".to_string())];
    assert_eq!(resolve_member("staleton", &before), Some(old_id));

    // The member was deleted and re-added under a new id; the old mapping
    // must not leak through.
    let new_id = Uuid::new_v4();
    let after = vec![(new_id, "Staleton Reyes".to_string())];
    assert_eq!(resolve_member("staleton", &after), Some(new_id));

    assert_eq!(resolve_member("staleton", &[]), None);
}

#[test]
fn unmatched_names_resolve_to_none() {
    let members = vec![(Uuid::new_v4(), "Someone Else".to_string())];
    assert_eq!(resolve_member("zzz_nobody", &members), None);
}

#[test]
fn draft_treats_yes_and_silence_the_same() {
    // Before the meeting, only an explicit "no" means anything: everyone else
    // defaults to absent and is marked present at the door.
    let (status, notes) = draft_status(None);
    assert_eq!((status, notes), (AttendanceStatus::Absent, None));

    let yes = response("Quinn", Some("Yes"), None);
    let (status, _) = draft_status(Some(&yes));
    assert_eq!(status, AttendanceStatus::Absent);

    let silent = response("Quinn", None, None);
    let (status, _) = draft_status(Some(&silent));
    assert_eq!(status, AttendanceStatus::Absent);
}

#[test]
fn draft_no_without_notes_gets_the_default_reason() {
    let no = response("Quinn", Some("No"), None);
    let (status, notes) = draft_status(Some(&no));
    assert_eq!(status, AttendanceStatus::ExcusedAbsent);
    assert_eq!(notes.as_deref(), Some("No reason provided"));

    let excused = response("Quinn", Some("no"), Some("travelling"));
    let (_, notes) = draft_status(Some(&excused));
    assert_eq!(notes.as_deref(), Some("travelling"));
}

#[test]
fn live_sync_promotes_yes_to_present() {
    let yes = response("Quinn", Some("yes"), None);
    let (status, notes) = synced_status(Some(&yes));
    assert_eq!((status, notes), (AttendanceStatus::Present, None));

    let no = response("Quinn", Some("No"), None);
    let (status, _) = synced_status(Some(&no));
    assert_eq!(status, AttendanceStatus::ExcusedAbsent);

    let (status, _) = synced_status(None);
    assert_eq!(status, AttendanceStatus::Absent);
}

#[test]
fn draft_rows_cover_every_member() {
    let event_id = Uuid::new_v4();
    let members = vec![
        (Uuid::new_v4(), "Quinn Kiefer".to_string()),
        (Uuid::new_v4(), "Ash Barrett".to_string()),
    ];
    let responses = vec![response("quinn", Some("No"), None)];

    let rows = draft_attendance_rows(event_id, &members, &responses);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.points_change == 0));

    let quinn = rows.iter().find(|r| r.member_id == members[0].0).unwrap();
    assert_eq!(quinn.status, AttendanceStatus::ExcusedAbsent);
    assert_eq!(quinn.notes.as_deref(), Some("No reason provided"));

    let ash = rows.iter().find(|r| r.member_id == members[1].0).unwrap();
    assert_eq!(ash.status, AttendanceStatus::Absent);
    assert_eq!(ash.notes, None);
}

#[test]
fn empty_responses_are_treated_as_missing() {
    let rows = vec![record(&[
        ("Person", "Quinn"),
        ("team_Question_2025_11_13", "?"),
        ("team_Response_2025_11_13", ""),
    ])];
    let events = detect_events(&rows);
    let responses = responses_for_event(&rows, &events[0]);
    assert_eq!(responses[0].response, None);
}

#[test]
fn mixed_field_types_do_not_panic() {
    let mut rec = record(&[("Person", "Quinn"), ("team_Question_2025_11_13", "?")]);
    rec.fields.insert(
        "team_Response_2025_11_13".into(),
        serde_json::Value::Number(serde_json::Number::from(1)),
    );
    let rows = vec![rec];
    let events = detect_events(&rows);
    let responses = responses_for_event(&rows, &events[0]);
    // Non-string cells read as missing.
    assert_eq!(responses[0].response, None);
}

#[test]
fn records_build_from_json_the_airtable_way() {
    let raw = serde_json::json!({
        "id": "recXYZ",
        "createdTime": "2025-11-01T00:00:00.000Z",
        "fields": { "Person": "Quinn", "POLL_Q_1": "?" }
    });
    let rec: AirtableRecord = serde_json::from_value(raw).unwrap();
    assert_eq!(rec.id, "recXYZ");
    assert_eq!(rec.fields.len(), 2);
}
