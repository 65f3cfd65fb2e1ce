//! Manual point adjustments, rank recalculation and the history log.

use actix_web::{get, post, web, HttpResponse, Responder};
use redis::Client as RedisClient;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache;
use crate::db::{history_repo, ledger, member_repo};
use crate::engine;
use crate::engine::reconcile::reconcile;
use crate::engine::types::Mutation;

#[derive(Deserialize)]
pub struct AdjustReq {
    pub member_id: Uuid,
    pub points_change: i32,
    pub reason: Option<String>,
}

/// POST /api/adjust-points — single-member manual adjustment.
#[post("/adjust-points")]
pub async fn adjust_points(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    body: web::Json<AdjustReq>,
) -> impl Responder {
    let _guard = engine::ledger_lock().lock().await;

    let member = match member_repo::get(&db, body.member_id).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(json!({ "success": false, "error": "Member not found" }))
        }
        Err(e) => {
            log::error!("member lookup failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch member" }));
        }
    };

    let mut members = match member_repo::list_active(&db).await {
        Ok(rows) => rows.iter().map(|m| m.state()).collect::<Vec<_>>(),
        Err(e) => {
            log::error!("member load failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch members" }));
        }
    };

    let reason = body.reason.clone().unwrap_or_else(|| {
        let verb = if body.points_change > 0 {
            "addition"
        } else {
            "deduction"
        };
        format!("Manual {verb} of {} points", body.points_change.abs())
    });

    let mutation = Mutation {
        member_id: body.member_id,
        points_change: body.points_change,
        marks_inactive: false,
        reason,
        attendance: None,
    };
    let outcome = reconcile(&mut members, std::slice::from_ref(&mutation), None);

    if let Err(e) = ledger::apply(&db, None, None, &outcome).await {
        log::error!("adjustment persist failed: {e:?}");
        return HttpResponse::InternalServerError()
            .json(json!({ "success": false, "error": "Failed to update points" }));
    }
    cache::invalidate_leaderboard(&redis).await;

    // An inactive member is skipped by the reconciler; report its unchanged
    // balance in that case.
    let new_points = members
        .iter()
        .find(|m| m.id == body.member_id)
        .map(|m| m.points)
        .unwrap_or(member.points);

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Points adjusted successfully",
        "new_points": new_points,
    }))
}

/// POST /api/recalculate-ranks — refresh rank changes with no point mutation.
/// Used after a batch of manual adjustments; calling it twice in a row zeroes
/// every rank change.
#[post("/recalculate-ranks")]
pub async fn recalculate_ranks(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
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

    let outcome = reconcile(&mut members, &[], None);
    let updated = outcome.patches.len();

    if let Err(e) = ledger::apply(&db, None, None, &outcome).await {
        log::error!("rank recalculation persist failed: {e:?}");
        return HttpResponse::InternalServerError()
            .json(json!({ "success": false, "error": "Failed to update rankings" }));
    }
    cache::invalidate_leaderboard(&redis).await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Rankings recalculated successfully",
        "members_updated": updated,
    }))
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub member_id: Option<Uuid>,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    100
}

/// GET /api/point-history
#[get("/point-history")]
pub async fn point_history(
    db: web::Data<PgPool>,
    web::Query(params): web::Query<HistoryParams>,
) -> impl Responder {
    match history_repo::list(&db, params.member_id, params.limit).await {
        Ok(mut entries) => {
            for entry in &mut entries {
                entry
                    .event_name
                    .get_or_insert_with(|| "Manual Adjustment".into());
            }
            HttpResponse::Ok().json(json!({ "success": true, "data": entries }))
        }
        Err(e) => {
            log::error!("point history query failed: {e:?}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch point history" }))
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(adjust_points)
        .service(recalculate_ranks)
        .service(point_history);
}
