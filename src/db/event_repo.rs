use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{AttendanceRecord, Event, NewEvent};
use crate::engine::types::AttendanceRow;

const EVENT_COLS: &str = "id, name, event_type, date, is_draft, is_reverted, \
     custom_rules, selected_members, airtable_event_id, created_at";

pub async fn get(db: &PgPool, id: Uuid) -> Result<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLS} FROM events WHERE id = $1");
    sqlx::query_as::<_, Event>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("fetching event")
}

/// Newest first. Drafts are hidden unless asked for.
pub async fn list(db: &PgPool, include_drafts: bool) -> Result<Vec<Event>> {
    let sql = if include_drafts {
        format!("SELECT {EVENT_COLS} FROM events ORDER BY created_at DESC")
    } else {
        format!(
            "SELECT {EVENT_COLS} FROM events WHERE is_draft = FALSE ORDER BY created_at DESC"
        )
    };
    sqlx::query_as::<_, Event>(&sql)
        .fetch_all(db)
        .await
        .context("listing events")
}

/// Caller is responsible for the draft-only guard; attendance rows cascade.
pub async fn delete(db: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting event")?;
    Ok(())
}

pub async fn attendance_for_event(db: &PgPool, event_id: Uuid) -> Result<Vec<AttendanceRecord>> {
    sqlx::query_as::<_, AttendanceRecord>(
        "SELECT id, event_id, member_id, status, points_change, notes, created_at
           FROM attendance_records WHERE event_id = $1",
    )
    .bind(event_id)
    .fetch_all(db)
    .await
    .context("listing attendance records")
}

/// (attendance record id, member id, member name) rows for a poll response
/// sync.
pub async fn attendance_with_member_names(
    db: &PgPool,
    event_id: Uuid,
) -> Result<Vec<(Uuid, Uuid, String)>> {
    sqlx::query_as::<_, (Uuid, Uuid, String)>(
        r#"
        SELECT a.id, m.id, m.name
          FROM attendance_records a
          JOIN members m ON m.id = a.member_id
         WHERE a.event_id = $1
        "#,
    )
    .bind(event_id)
    .fetch_all(db)
    .await
    .context("listing attendance records with member names")
}

pub async fn update_attendance_status(
    db: &PgPool,
    record_id: Uuid,
    status: &str,
    notes: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE attendance_records SET status = $2, notes = $3 WHERE id = $1")
        .bind(record_id)
        .bind(status)
        .bind(notes)
        .execute(db)
        .await
        .context("updating attendance record")?;
    Ok(())
}

pub async fn find_by_airtable_id(db: &PgPool, airtable_event_id: &str) -> Result<Option<Uuid>> {
    sqlx::query_scalar("SELECT id FROM events WHERE airtable_event_id = $1")
        .bind(airtable_event_id)
        .fetch_optional(db)
        .await
        .context("looking up event by poll id")
}

/// Poll ids already imported, used to hide known events from detection.
pub async fn linked_airtable_ids(db: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar("SELECT airtable_event_id FROM events WHERE airtable_event_id IS NOT NULL")
        .fetch_all(db)
        .await
        .context("listing imported poll ids")
}

/// Draft, poll-linked events awaiting response syncs: (event id, poll id).
pub async fn draft_airtable_events(db: &PgPool) -> Result<Vec<(Uuid, String)>> {
    sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, airtable_event_id FROM events
          WHERE is_draft = TRUE AND airtable_event_id IS NOT NULL",
    )
    .fetch_all(db)
    .await
    .context("listing draft poll events")
}

/// Insert a draft event together with its pre-populated attendance rows.
pub async fn insert_draft(db: &PgPool, event: &NewEvent, rows: &[AttendanceRow]) -> Result<()> {
    let mut tx = db.begin().await.context("opening transaction")?;

    sqlx::query(
        r#"
        INSERT INTO events (id, name, event_type, date, is_draft, is_reverted,
                            custom_rules, selected_members, airtable_event_id)
             VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $8)
        "#,
    )
    .bind(event.id)
    .bind(&event.name)
    .bind(&event.event_type)
    .bind(event.date)
    .bind(event.is_draft)
    .bind(&event.custom_rules)
    .bind(&event.selected_members)
    .bind(&event.airtable_event_id)
    .execute(&mut *tx)
    .await
    .context("inserting draft event")?;

    for row in rows {
        sqlx::query(
            "INSERT INTO attendance_records (event_id, member_id, status, points_change, notes)
                  VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(row.event_id)
        .bind(row.member_id)
        .bind(row.status.as_str())
        .bind(row.points_change)
        .bind(&row.notes)
        .execute(&mut *tx)
        .await
        .context("inserting draft attendance record")?;
    }

    tx.commit().await.context("committing draft event")
}
