use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::PointHistoryEntry;

const MAX_PAGE: i64 = 500;

/// Page-size guard for limits arriving straight from the URL: zero, negative
/// and oversized values collapse into `[1, 500]`.
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_PAGE)
}

/// Newest first, optionally scoped to one member. `event_name` is NULL for
/// manual adjustments; the handler substitutes a display label.
pub async fn list(
    db: &PgPool,
    member_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<PointHistoryEntry>> {
    let sql = r#"
        SELECT h.id, h.member_id, h.event_id, h.points_change, h.reason,
               h.new_total, h.timestamp,
               m.name AS member_name, e.name AS event_name
          FROM point_history h
          JOIN members m ON m.id = h.member_id
          LEFT JOIN events e ON e.id = h.event_id
         WHERE ($1::uuid IS NULL OR h.member_id = $1)
         ORDER BY h.timestamp DESC
         LIMIT $2
    "#;
    sqlx::query_as::<_, PointHistoryEntry>(sql)
        .bind(member_id)
        .bind(clamp_limit(limit))
        .fetch_all(db)
        .await
        .context("listing point history")
}
