//! Member management: leaderboard listing, add, delete.

use actix_web::{delete, get, post, web, HttpResponse, Responder};
use redis::Client as RedisClient;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache;
use crate::db::member_repo;

/// GET /api/members — the leaderboard, active members by points then name.
#[get("/members")]
pub async fn list(db: web::Data<PgPool>, redis: web::Data<RedisClient>) -> impl Responder {
    if let Some(cached) = cache::get_leaderboard(&redis).await {
        return HttpResponse::Ok()
            .content_type("application/json")
            .body(cached);
    }

    let members = match member_repo::list_active(&db).await {
        Ok(m) => m,
        Err(e) => {
            log::error!("leaderboard query failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to fetch members" }));
        }
    };

    let payload = json!({ "success": true, "data": members });
    let body = payload.to_string();
    cache::store_leaderboard(&redis, &body).await;

    HttpResponse::Ok()
        .content_type("application/json")
        .body(body)
}

#[derive(Deserialize)]
pub struct AddMemberReq {
    pub first_name: String,
    pub last_name: String,
}

/// POST /api/members/add — new members start at 100 points.
#[post("/members/add")]
pub async fn add(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    body: web::Json<AddMemberReq>,
) -> impl Responder {
    let first = body.first_name.trim();
    let last = body.last_name.trim();
    if first.is_empty() || last.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "success": false, "error": "First name and last name are required" }));
    }
    let full_name = format!("{first} {last}");

    match member_repo::exists_by_name(&db, &full_name).await {
        Ok(true) => {
            return HttpResponse::BadRequest().json(
                json!({ "success": false, "error": "A member with this name already exists" }),
            )
        }
        Ok(false) => {}
        Err(e) => {
            log::error!("duplicate-name check failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to add member" }));
        }
    }

    match member_repo::insert(&db, &full_name).await {
        Ok(member) => {
            cache::invalidate_leaderboard(&redis).await;
            HttpResponse::Ok().json(json!({
                "success": true,
                "data": member,
                "message": format!("{full_name} has been added to the leaderboard"),
            }))
        }
        Err(e) => {
            log::error!("member insert failed: {e:?}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to add member" }))
        }
    }
}

/// DELETE /api/members/{id}
#[delete("/members/{id}")]
pub async fn remove(
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();

    let member = match member_repo::get(&db, id).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(json!({ "success": false, "error": "Member not found" }))
        }
        Err(e) => {
            log::error!("member lookup failed: {e:?}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to delete member" }));
        }
    };

    match member_repo::delete(&db, id).await {
        Ok(_) => {
            cache::invalidate_leaderboard(&redis).await;
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": format!("{} has been deleted", member.name),
            }))
        }
        Err(e) => {
            log::error!("member delete failed: {e:?}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "Failed to delete member" }))
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(add).service(remove);
}
