use actix_web::{get, web, Responder};
use serde_json::json;

use crate::state::AppState;

/// GET /api/v1/health (公开)
///
/// 存活探针, 数据库不可用时仍返回 200, 仅 database 字段置为 unhealthy
#[get("/api/v1/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let database = match state.rb.query("SELECT 1", vec![]).await {
        Ok(_) => "healthy",
        Err(e) => {
            log::warn!("⚠️  健康检查数据库探测失败: {}", e);
            "unhealthy"
        }
    };

    web::Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
