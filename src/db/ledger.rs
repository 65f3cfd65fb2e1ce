//! Persists a reconciliation outcome in one transaction.
//!
//! Member patches, attendance rows, history rows and the event insert (or
//! revert flip) commit together or not at all, so a mid-flight failure can
//! never leave the ledger out of step with balances.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::NewEvent;
use crate::engine::types::ReconcileOutcome;

/// Event lifecycle flip applied alongside an outcome (used by revert).
#[derive(Debug, Clone, Copy)]
pub struct EventFlip {
    pub event_id: Uuid,
    pub is_draft: bool,
    pub is_reverted: bool,
}

pub async fn apply(
    db: &PgPool,
    new_event: Option<&NewEvent>,
    flip: Option<EventFlip>,
    outcome: &ReconcileOutcome,
) -> Result<()> {
    let mut tx = db.begin().await.context("opening transaction")?;

    if let Some(event) = new_event {
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
        .context("inserting event")?;
    }

    if let Some(flip) = flip {
        sqlx::query("UPDATE events SET is_draft = $2, is_reverted = $3 WHERE id = $1")
            .bind(flip.event_id)
            .bind(flip.is_draft)
            .bind(flip.is_reverted)
            .execute(&mut *tx)
            .await
            .context("updating event state")?;
    }

    for patch in &outcome.patches {
        sqlx::query("UPDATE members SET points = $2, status = $3, rank_change = $4 WHERE id = $1")
            .bind(patch.member_id)
            .bind(patch.points)
            .bind(patch.status.as_str())
            .bind(patch.rank_change)
            .execute(&mut *tx)
            .await
            .context("patching member")?;
    }

    for row in &outcome.attendance {
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
        .context("inserting attendance record")?;
    }

    for entry in &outcome.history {
        sqlx::query(
            "INSERT INTO point_history (member_id, event_id, points_change, reason, new_total)
                  VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.member_id)
        .bind(entry.event_id)
        .bind(entry.points_change)
        .bind(&entry.reason)
        .bind(entry.new_total)
        .execute(&mut *tx)
        .await
        .context("inserting point history")?;
    }

    tx.commit().await.context("committing reconciliation")
}
