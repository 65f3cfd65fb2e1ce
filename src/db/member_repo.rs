use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Member;

/// The leaderboard order: points descending, name ascending.
pub async fn list_active(db: &PgPool) -> Result<Vec<Member>> {
    sqlx::query_as::<_, Member>(
        r#"
        SELECT id, name, points, status, rank_change, photo_url, created_at
          FROM members
         WHERE status = 'active'
         ORDER BY points DESC, name ASC
        "#,
    )
    .fetch_all(db)
    .await
    .context("listing active members")
}

pub async fn get(db: &PgPool, id: Uuid) -> Result<Option<Member>> {
    sqlx::query_as::<_, Member>(
        "SELECT id, name, points, status, rank_change, photo_url, created_at
           FROM members WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("fetching member")
}

pub async fn exists_by_name(db: &PgPool, name: &str) -> Result<bool> {
    let found: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM members WHERE name ILIKE $1 LIMIT 1")
            .bind(name)
            .fetch_optional(db)
            .await
            .context("checking for duplicate member name")?;
    Ok(found.is_some())
}

/// New members start with 100 points, active, unmoved.
pub async fn insert(db: &PgPool, name: &str) -> Result<Member> {
    sqlx::query_as::<_, Member>(
        r#"
        INSERT INTO members (name, points, status, rank_change)
             VALUES ($1, 100, 'active', 0)
          RETURNING id, name, points, status, rank_change, photo_url, created_at
        "#,
    )
    .bind(name)
    .fetch_one(db)
    .await
    .context("inserting member")
}

/// Deletes the member row; attendance and history rows cascade by schema.
pub async fn delete(db: &PgPool, id: Uuid) -> Result<u64> {
    let rows = sqlx::query("DELETE FROM members WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("deleting member")?
        .rows_affected();
    Ok(rows)
}
