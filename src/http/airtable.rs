//! Poll-import endpoints: detect new poll events, create drafts from them,
//! and re-sync a draft's responses on demand.

use std::collections::HashSet;

use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::airtable::{client, detect, import};
use crate::db::models::NewEvent;
use crate::db::{event_repo, member_repo};
use crate::engine::rules;
use crate::engine::types::AttendanceStatus;

/// GET /api/airtable/detect-events — detected polls not yet imported.
#[get("/airtable/detect-events")]
pub async fn detect_events(db: web::Data<PgPool>) -> impl Responder {
    let records = match client::fetch_all_records().await {
        Ok(r) => r,
        Err(e) => {
            log::error!("airtable fetch failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch poll data" }));
        }
    };
    let detected = detect::detect_events(&records);

    let linked: HashSet<String> = match event_repo::linked_airtable_ids(&db).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            log::error!("imported poll lookup failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to detect events" }));
        }
    };

    let new_events: Vec<_> = detected
        .iter()
        .filter(|ev| !linked.contains(&ev.event_id))
        .collect();

    HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "total": detected.len(),
            "new": new_events.len(),
            "events": new_events,
        },
    }))
}

#[derive(Deserialize)]
pub struct CreateDraftReq {
    /// Poll-side event id, e.g. "meeting_is_tonight_at_8pm_2025_11_13".
    pub event_id: String,
}

/// POST /api/airtable/create-draft
#[post("/airtable/create-draft")]
pub async fn create_draft(db: web::Data<PgPool>, body: web::Json<CreateDraftReq>) -> impl Responder {
    if body.event_id.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "success": false, "error": "event_id is required" }));
    }

    let records = match client::fetch_all_records().await {
        Ok(r) => r,
        Err(e) => {
            log::error!("airtable fetch failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch poll data" }));
        }
    };

    let polls = detect::detect_events(&records);
    let Some(poll) = polls.iter().find(|p| p.event_id == body.event_id) else {
        return HttpResponse::NotFound().json(json!({
            "success": false,
            "error": format!("Event {} not found in Airtable", body.event_id),
        }));
    };

    match event_repo::find_by_airtable_id(&db, &poll.event_id).await {
        Ok(Some(existing)) => {
            return HttpResponse::Conflict().json(json!({
                "success": false,
                "error": "Event already exists",
                "event_id": existing,
            }))
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("imported poll lookup failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to create draft event" }));
        }
    }

    let members: Vec<(Uuid, String)> = match member_repo::list_active(&db).await {
        Ok(rows) => rows.into_iter().map(|m| (m.id, m.name)).collect(),
        Err(e) => {
            log::error!("member load failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch members" }));
        }
    };

    let date = NaiveDate::parse_from_str(&poll.date, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or_else(|_| Utc::now());

    let event = NewEvent {
        id: Uuid::new_v4(),
        name: poll.event_name.clone(),
        event_type: rules::ACTIVE_MEETING.to_string(),
        date,
        is_draft: true,
        custom_rules: None,
        selected_members: None,
        airtable_event_id: Some(poll.event_id.clone()),
    };

    let responses = detect::responses_for_event(&records, poll);
    let rows = import::draft_attendance_rows(event.id, &members, &responses);
    let excused = rows
        .iter()
        .filter(|r| r.status == AttendanceStatus::ExcusedAbsent)
        .count();

    if let Err(e) = event_repo::insert_draft(&db, &event, &rows).await {
        log::error!("draft insert failed: {e:?}");
        return HttpResponse::InternalServerError()
            .json(json!({ "success": false, "error": "Failed to create draft event" }));
    }

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Draft event \"{}\" created successfully", event.name),
        "data": {
            "event_id": event.id,
            "airtable_event_id": poll.event_id,
            "name": event.name,
            "date": poll.date,
            "attendance_count": rows.len(),
            "excused_absences": excused,
        },
    }))
}

#[derive(Deserialize)]
pub struct SyncReq {
    /// Database-side event id, not the poll id.
    pub event_id: Uuid,
}

/// POST /api/airtable/sync-responses — only valid while the event is a draft.
#[post("/airtable/sync-responses")]
pub async fn sync_responses(db: web::Data<PgPool>, body: web::Json<SyncReq>) -> impl Responder {
    let event = match event_repo::get(&db, body.event_id).await {
        Ok(Some(ev)) => ev,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(json!({ "success": false, "error": "Event not found" }))
        }
        Err(e) => {
            log::error!("event lookup failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to sync responses" }));
        }
    };

    let Some(airtable_id) = event.airtable_event_id.clone() else {
        return HttpResponse::BadRequest()
            .json(json!({ "success": false, "error": "Event is not linked to Airtable" }));
    };
    if !event.is_draft {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "Cannot sync submitted events. Event must be in draft state.",
        }));
    }

    let records = match client::fetch_all_records().await {
        Ok(r) => r,
        Err(e) => {
            log::error!("airtable fetch failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch poll data" }));
        }
    };

    let polls = detect::detect_events(&records);
    let Some(poll) = polls.iter().find(|p| p.event_id == airtable_id) else {
        return HttpResponse::NotFound()
            .json(json!({ "success": false, "error": "Airtable event not found" }));
    };

    match import::apply_poll_responses(&db, event.id, poll, &records).await {
        Ok(updated) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("Synced {updated} attendance records"),
            "data": {
                "event_id": event.id,
                "event_name": event.name,
                "updated_records": updated,
            },
        })),
        Err(e) => {
            log::error!("response sync failed: {e:?}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to sync responses" }))
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(detect_events)
        .service(create_draft)
        .service(sync_responses);
}
