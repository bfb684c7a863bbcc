use actix_web::{get, post, put, web, HttpRequest, Responder};
use serde::Deserialize;

use common::error::AppError;
use common::middleware::auth::AuthContext;
use common::models::{AdminDecisionRequest, LoanApplicationRequest};
use common::response::R;
use common::utils::{client_ip, user_agent};

use crate::state::AppState;

/// POST /api/v1/loans/predict
///
/// 同步评分, 落库失败不影响响应
#[post("/api/v1/loans/predict")]
pub async fn predict(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<LoanApplicationRequest>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let dto = state.loan_service.predict(&payload).await?;
    R::success(dto)
}

/// GET /api/v1/loans/applications/{application_id}
#[get("/api/v1/loans/applications/{application_id}")]
pub async fn get_application(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let application = state.loan_service.get_application(&path).await?;
    R::success(application)
}

/// PUT /api/v1/loans/applications/{application_id}/admin-decision
#[put("/api/v1/loans/applications/{application_id}/admin-decision")]
pub async fn admin_decision(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Json<AdminDecisionRequest>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    state
        .loan_service
        .admin_decision(
            &ctx,
            &path,
            &payload,
            Some(client_ip(&req)),
            user_agent(&req),
        )
        .await?;
    R::ok_with_msg("Admin decision updated successfully")
}

#[derive(Debug, Deserialize)]
pub struct PendingReviewQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

/// GET /api/v1/loans/applications/review/pending
#[get("/api/v1/loans/applications/review/pending")]
pub async fn pending_review(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PendingReviewQuery>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let page = state
        .loan_service
        .pending_review(query.limit, query.offset)
        .await?;
    R::success(page)
}

/// GET /api/v1/loans/metrics/model-performance
#[get("/api/v1/loans/metrics/model-performance")]
pub async fn model_metrics(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let metrics = state.loan_service.model_metrics().await;
    R::success(metrics)
}
