//! Event lifecycle: list, submit, revert, delete drafts, read attendance.

use std::collections::HashMap;

use actix_web::{delete, get, post, web, HttpResponse, Responder};
use chrono::Utc;
use redis::Client as RedisClient;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache;
use crate::db::ledger::EventFlip;
use crate::db::models::NewEvent;
use crate::db::{event_repo, ledger, member_repo};
use crate::engine;
use crate::engine::reconcile::reconcile;
use crate::engine::rules::{self, CustomRules};
use crate::engine::types::{AttendanceStatus, Mutation};

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub include_drafts: bool,
}

/// GET /api/events
#[get("/events")]
pub async fn list(db: web::Data<PgPool>, params: web::Query<ListParams>) -> impl Responder {
    match event_repo::list(&db, params.include_drafts).await {
        Ok(events) => HttpResponse::Ok().json(json!({ "success": true, "data": events })),
        Err(e) => {
            log::error!("event list failed: {e:?}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch events" }))
        }
    }
}

/// DELETE /api/events/{event_id} — drafts (and reverted events) only.
#[delete("/events/{event_id}")]
pub async fn remove(db: web::Data<PgPool>, path: web::Path<Uuid>) -> impl Responder {
    let event_id = path.into_inner();

    let event = match event_repo::get(&db, event_id).await {
        Ok(Some(ev)) => ev,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(json!({ "success": false, "error": "Event not found" }))
        }
        Err(e) => {
            log::error!("event lookup failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to delete event" }));
        }
    };

    if !event.is_draft && !event.is_reverted {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "Cannot delete submitted events. Only drafts can be deleted.",
        }));
    }

    match event_repo::delete(&db, event_id).await {
        Ok(()) => HttpResponse::Ok()
            .json(json!({ "success": true, "message": "Draft event deleted successfully" })),
        Err(e) => {
            log::error!("event delete failed: {e:?}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to delete event" }))
        }
    }
}

/// GET /api/events/{event_id}/attendance
#[get("/events/{event_id}/attendance")]
pub async fn attendance(db: web::Data<PgPool>, path: web::Path<Uuid>) -> impl Responder {
    match event_repo::attendance_for_event(&db, path.into_inner()).await {
        Ok(records) => HttpResponse::Ok().json(json!({ "success": true, "data": records })),
        Err(e) => {
            log::error!("attendance list failed: {e:?}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch attendance" }))
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    ActiveMeeting,
    ExecMeeting,
    Social,
    Custom,
}

#[derive(Deserialize)]
pub struct SubmitReq {
    pub name: String,
    pub category: EventCategory,
    pub custom_event_type: Option<String>,
    /// Member → status, for meeting and custom categories.
    #[serde(default)]
    pub attendance: HashMap<Uuid, AttendanceStatus>,
    /// Flat-award recipients, for social events.
    #[serde(default)]
    pub selected_members: Vec<Uuid>,
    pub social_points: Option<i32>,
    pub custom_rules: Option<CustomRules>,
}

/// POST /api/events/submit — structured submission for all categories.
#[post("/events/submit")]
pub async fn submit(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    body: web::Json<SubmitReq>,
) -> impl Responder {
    let _guard = engine::ledger_lock().lock().await;

    let mut members = match member_repo::list_active(&db).await {
        Ok(rows) => rows.iter().map(|m| m.state()).collect::<Vec<_>>(),
        Err(e) => {
            log::error!("member load failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch members" }));
        }
    };

    let event_type = match body.category {
        EventCategory::ActiveMeeting => rules::ACTIVE_MEETING.to_string(),
        EventCategory::ExecMeeting => rules::EXEC_MEETING.to_string(),
        EventCategory::Social => rules::SOCIAL_EVENT.to_string(),
        EventCategory::Custom => body
            .custom_event_type
            .clone()
            .unwrap_or_else(|| rules::CUSTOM_EVENT.to_string()),
    };

    let event = NewEvent {
        id: Uuid::new_v4(),
        name: body.name.clone(),
        event_type: event_type.clone(),
        date: Utc::now(),
        is_draft: false,
        custom_rules: body
            .custom_rules
            .as_ref()
            .and_then(|r| serde_json::to_string(r).ok()),
        selected_members: (!body.selected_members.is_empty())
            .then(|| body.selected_members.clone()),
        airtable_event_id: None,
    };

    let mutations: Vec<Mutation> = match body.category {
        EventCategory::Social => {
            let points = body.social_points.unwrap_or(0);
            body.selected_members
                .iter()
                .map(|&member_id| Mutation {
                    member_id,
                    points_change: points,
                    marks_inactive: false,
                    reason: format!("{} - Social Event", body.name),
                    attendance: Some(AttendanceStatus::Present),
                })
                .collect()
        }
        _ => body
            .attendance
            .iter()
            .map(|(&member_id, &status)| {
                Mutation::from_attendance(
                    &body.name,
                    member_id,
                    status,
                    rules::point_change(&event_type, status, body.custom_rules.as_ref()),
                )
            })
            .collect(),
    };

    let outcome = reconcile(&mut members, &mutations, Some(event.id));

    if let Err(e) = ledger::apply(&db, Some(&event), None, &outcome).await {
        log::error!("event submit persist failed: {e:?}");
        return HttpResponse::InternalServerError()
            .json(json!({ "success": false, "error": "Failed to submit event" }));
    }
    cache::invalidate_leaderboard(&redis).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Event submitted successfully",
        "event_id": event.id,
    }))
}

#[derive(Deserialize)]
pub struct RevertReq {
    pub event_id: Uuid,
}

/// POST /api/events/revert — undo a submitted event by applying the exact
/// inverse of every stored delta, then flip it back to a draft.
#[post("/events/revert")]
pub async fn revert(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    body: web::Json<RevertReq>,
) -> impl Responder {
    let _guard = engine::ledger_lock().lock().await;

    let event = match event_repo::get(&db, body.event_id).await {
        Ok(Some(ev)) => ev,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(json!({ "success": false, "error": "Event not found" }))
        }
        Err(e) => {
            log::error!("event lookup failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to revert event" }));
        }
    };

    if event.is_draft {
        return HttpResponse::BadRequest()
            .json(json!({ "success": false, "error": "Cannot revert a draft event" }));
    }

    let records = match event_repo::attendance_for_event(&db, event.id).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("attendance load failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to revert event" }));
        }
    };
    if records.is_empty() {
        return HttpResponse::NotFound()
            .json(json!({ "success": false, "error": "No attendance records found" }));
    }

    let mut members = match member_repo::list_active(&db).await {
        Ok(rows) => rows.iter().map(|m| m.state()).collect::<Vec<_>>(),
        Err(e) => {
            log::error!("member load failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch members" }));
        }
    };

    // Inverse of the recorded deltas, not a re-evaluation of current rules,
    // so a revert stays exact even after the rules table changes.
    let mutations: Vec<Mutation> = records
        .iter()
        .map(|record| Mutation {
            member_id: record.member_id,
            points_change: -record.points_change,
            marks_inactive: false,
            reason: "Event reverted".into(),
            attendance: None,
        })
        .collect();

    let outcome = reconcile(&mut members, &mutations, Some(event.id));
    let flip = EventFlip {
        event_id: event.id,
        is_draft: true,
        is_reverted: true,
    };

    if let Err(e) = ledger::apply(&db, None, Some(flip), &outcome).await {
        log::error!("event revert persist failed: {e:?}");
        return HttpResponse::InternalServerError()
            .json(json!({ "success": false, "error": "Failed to revert event" }));
    }
    cache::invalidate_leaderboard(&redis).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Event reverted successfully",
    }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(submit)
        .service(revert)
        .service(attendance)
        .service(remove);
}
