//! Liveness / readiness probe for the leaderboard service.

use actix_web::{get, web, HttpResponse, Responder};
use redis::{AsyncCommands, Client as RedisClient};
use serde_json::json;
use sqlx::PgPool;

/// GET /api/healthz — verifies both backing stores answer.
#[get("/healthz")]
pub async fn healthz(db: web::Data<PgPool>, redis: web::Data<RedisClient>) -> impl Responder {
    if sqlx::query("SELECT 1").execute(&**db).await.is_err() {
        return HttpResponse::ServiceUnavailable()
            .json(json!({ "success": false, "error": "database unavailable" }));
    }

    let redis_ok = match redis.get_multiplexed_async_connection().await {
        Ok(mut conn) => conn.ping::<String>().await.is_ok(),
        Err(_) => false,
    };
    if !redis_ok {
        return HttpResponse::ServiceUnavailable()
            .json(json!({ "success": false, "error": "cache unavailable" }));
    }

    HttpResponse::Ok().json(json!({ "success": true, "status": "ok" }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz);
}
