//! Turning poll responses into draft attendance rows.

use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::airtable::client::AirtableRecord;
use crate::airtable::detect::{self, PollEvent, PollResponse};
use crate::airtable::mapping;
use crate::db::event_repo;
use crate::engine::types::{AttendanceRow, AttendanceStatus};

const DEFAULT_EXCUSE: &str = "No reason provided";

/// Initial draft status for a member's matched response.
///
/// Everyone defaults to absent and gets flipped to present at the door; only
/// an explicit "no" pre-populates an excused absence. A "yes" is deliberately
/// not distinguished from silence at draft time.
pub fn draft_status(response: Option<&PollResponse>) -> (AttendanceStatus, Option<String>) {
    if let Some(resp) = response {
        if resp
            .response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("no"))
        {
            let notes = resp.notes.clone().unwrap_or_else(|| DEFAULT_EXCUSE.into());
            return (AttendanceStatus::ExcusedAbsent, Some(notes));
        }
    }
    (AttendanceStatus::Absent, None)
}

/// Status for a live re-sync of a draft. Richer than [`draft_status`]: an
/// explicit "yes" now does mark the member present.
pub fn synced_status(response: Option<&PollResponse>) -> (AttendanceStatus, Option<String>) {
    if let Some(resp) = response {
        match resp.response.as_deref() {
            Some(r) if r.eq_ignore_ascii_case("no") => {
                let notes = resp.notes.clone().unwrap_or_else(|| DEFAULT_EXCUSE.into());
                return (AttendanceStatus::ExcusedAbsent, Some(notes));
            }
            Some(r) if r.eq_ignore_ascii_case("yes") => {
                return (AttendanceStatus::Present, None);
            }
            _ => {}
        }
    }
    (AttendanceStatus::Absent, None)
}

/// Member id → that member's poll response, resolved through the match
/// cache. The first response wins when two rows resolve to the same member.
pub fn responses_by_member<'a>(
    members: &[(Uuid, String)],
    responses: &'a [PollResponse],
) -> HashMap<Uuid, &'a PollResponse> {
    let mut by_member = HashMap::new();
    for resp in responses {
        if let Some(member_id) = mapping::resolve_member(&resp.person, members) {
            by_member.entry(member_id).or_insert(resp);
        }
    }
    by_member
}

/// Pre-populated attendance rows for a new draft: one per active member,
/// zero points (drafts never touch the ledger).
pub fn draft_attendance_rows(
    event_id: Uuid,
    members: &[(Uuid, String)],
    responses: &[PollResponse],
) -> Vec<AttendanceRow> {
    let by_member = responses_by_member(members, responses);
    members
        .iter()
        .map(|(member_id, _)| {
            let (status, notes) = draft_status(by_member.get(member_id).copied());
            AttendanceRow {
                event_id,
                member_id: *member_id,
                status,
                points_change: 0,
                notes,
            }
        })
        .collect()
}

/// Overwrite a draft's attendance rows with the latest poll responses.
/// Idempotent; returns how many rows were rewritten. Members with no match
/// are left at the default absent state, which is the expected steady state
/// before responses arrive.
pub async fn apply_poll_responses(
    db: &PgPool,
    event_id: Uuid,
    poll: &PollEvent,
    records: &[AirtableRecord],
) -> Result<usize> {
    let responses = detect::responses_for_event(records, poll);
    let rows = event_repo::attendance_with_member_names(db, event_id)
        .await
        .context("loading draft attendance")?;

    let members: Vec<(Uuid, String)> = rows
        .iter()
        .map(|(_, member_id, name)| (*member_id, name.clone()))
        .collect();
    let by_member = responses_by_member(&members, &responses);

    let mut updated = 0;
    for (record_id, member_id, _) in &rows {
        let (status, notes) = synced_status(by_member.get(member_id).copied());
        event_repo::update_attendance_status(db, *record_id, status.as_str(), notes.as_deref())
            .await?;
        updated += 1;
    }
    Ok(updated)
}
