//! Background worker that keeps draft poll events in step with Airtable.
//!
//! Each tick re-syncs every draft event linked to a poll. Syncs only rewrite
//! draft attendance rows, so a dropped or failed tick is harmless; the next
//! one starts from scratch.

use sqlx::PgPool;
use tokio::time::{sleep, Duration};

use crate::airtable::{client, detect, import};
use crate::config;
use crate::db::event_repo;

async fn tick(db: &PgPool) -> anyhow::Result<()> {
    let drafts = event_repo::draft_airtable_events(db).await?;
    if drafts.is_empty() {
        return Ok(());
    }

    let records = client::fetch_all_records().await?;
    let polls = detect::detect_events(&records);

    for (event_id, airtable_id) in drafts {
        let Some(poll) = polls.iter().find(|p| p.event_id == airtable_id) else {
            log::warn!("draft event {event_id} references unknown poll {airtable_id}");
            continue;
        };
        match import::apply_poll_responses(db, event_id, poll, &records).await {
            Ok(updated) => log::debug!("synced {updated} responses for event {event_id}"),
            Err(e) => log::warn!("poll sync for event {event_id} failed: {e:?}"),
        }
    }
    Ok(())
}

/// Spawn the infinite poll-sync loop as a Tokio task.
pub fn start(db: PgPool) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tick(&db).await {
                log::error!("poll sync tick failed: {e:?}");
            }
            sleep(Duration::from_secs(config::settings().sync_interval)).await;
        }
    });
}
