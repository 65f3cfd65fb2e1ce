//! Freeform attendance submission: creates a submitted event and applies
//! the standard rules for its category in one reconciliation.

use actix_web::{post, web, HttpResponse, Responder};
use chrono::Utc;
use redis::Client as RedisClient;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache;
use crate::db::models::NewEvent;
use crate::db::{ledger, member_repo};
use crate::engine;
use crate::engine::reconcile::reconcile;
use crate::engine::types::{AttendanceStatus, Mutation};
use crate::engine::rules;

#[derive(Deserialize)]
pub struct AttendanceItem {
    pub member_id: Uuid,
    pub status: AttendanceStatus,
}

#[derive(Deserialize)]
pub struct AttendanceReq {
    pub event_name: String,
    pub event_type: String,
    pub attendance: Vec<AttendanceItem>,
}

/// POST /api/attendance
#[post("/attendance")]
pub async fn submit_attendance(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    body: web::Json<AttendanceReq>,
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

    let event = NewEvent {
        id: Uuid::new_v4(),
        name: body.event_name.clone(),
        event_type: body.event_type.clone(),
        date: Utc::now(),
        is_draft: false,
        custom_rules: None,
        selected_members: None,
        airtable_event_id: None,
    };

    let mutations: Vec<Mutation> = body
        .attendance
        .iter()
        .map(|item| {
            Mutation::from_attendance(
                &body.event_name,
                item.member_id,
                item.status,
                rules::point_change(&body.event_type, item.status, None),
            )
        })
        .collect();

    let outcome = reconcile(&mut members, &mutations, Some(event.id));

    if let Err(e) = ledger::apply(&db, Some(&event), None, &outcome).await {
        log::error!("attendance persist failed: {e:?}");
        return HttpResponse::InternalServerError()
            .json(json!({ "success": false, "error": "Failed to record attendance" }));
    }
    cache::invalidate_leaderboard(&redis).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Attendance recorded successfully",
        "event_id": event.id,
    }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_attendance);
}
