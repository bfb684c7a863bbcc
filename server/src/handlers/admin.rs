use actix_web::{get, post, put, web, HttpRequest, Responder};
use serde::Deserialize;

use common::error::AppError;
use common::middleware::auth::AuthContext;
use common::models::{LoanStatusUpdateRequest, UpdateWeightRequest};
use common::response::R;
use common::utils::{client_ip, user_agent};

use crate::service::admin_service::LoanListFilter;
use crate::service::audit_service::AuditLogFilter;
use crate::state::AppState;

/// GET /api/v1/admin/feature-weights
#[get("/api/v1/admin/feature-weights")]
pub async fn get_feature_weights(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let weights = state.admin_service.get_feature_weights().await?;
    R::success(weights)
}

/// PUT /api/v1/admin/feature-weights
#[put("/api/v1/admin/feature-weights")]
pub async fn update_feature_weight(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<UpdateWeightRequest>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    state
        .admin_service
        .update_weight(&ctx, &payload, Some(client_ip(&req)), user_agent(&req))
        .await?;
    R::ok_with_msg("Feature weight updated successfully")
}

/// GET /api/v1/admin/model/performance
#[get("/api/v1/admin/model/performance")]
pub async fn model_performance(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let report = state.admin_service.performance_report().await?;
    R::success(report)
}

/// POST /api/v1/admin/model/retrain
#[post("/api/v1/admin/model/retrain")]
pub async fn retrain_model(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let ack = state
        .admin_service
        .request_retraining(&ctx, Some(client_ip(&req)), user_agent(&req))
        .await?;
    R::success(ack)
}

#[derive(Debug, Deserialize)]
pub struct LoanListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_loan_page_size")]
    pub page_size: u64,
    /// 终审状态 Yes / No
    pub status: Option<String>,
    pub risk_category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub min_loan_amount: Option<f64>,
    pub max_loan_amount: Option<f64>,
    pub property_area: Option<String>,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_loan_page_size() -> u64 {
    20
}

/// GET /api/v1/admin/loans
#[get("/api/v1/admin/loans")]
pub async fn list_loans(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LoanListQuery>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let query = query.into_inner();
    let filter = LoanListFilter {
        final_status: query.status,
        risk_category: query.risk_category,
        date_from: query.date_from,
        date_to: query.date_to,
        min_loan_amount: query.min_loan_amount,
        max_loan_amount: query.max_loan_amount,
        property_area: query.property_area,
        search: query.search,
    };
    let page = state
        .admin_service
        .list_loans(&filter, query.page, query.page_size)
        .await?;
    R::success(page)
}

/// GET /api/v1/admin/loans/{application_id}
#[get("/api/v1/admin/loans/{application_id}")]
pub async fn get_loan(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let loan = state.admin_service.get_loan(&path).await?;
    R::success(loan)
}

/// PUT /api/v1/admin/loans/{application_id}/status
#[put("/api/v1/admin/loans/{application_id}/status")]
pub async fn update_loan_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Json<LoanStatusUpdateRequest>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let ack = state
        .admin_service
        .update_loan_status(
            &ctx,
            &path,
            &payload,
            Some(client_ip(&req)),
            user_agent(&req),
        )
        .await?;
    R::success(ack)
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_audit_page_size")]
    pub page_size: u64,
    pub user_id: Option<i64>,
    /// 动作名模糊匹配
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn default_audit_page_size() -> u64 {
    50
}

/// GET /api/v1/admin/audit-logs
#[get("/api/v1/admin/audit-logs")]
pub async fn audit_logs(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<AuditLogQuery>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let query = query.into_inner();
    let filter = AuditLogFilter {
        user_id: query.user_id,
        action: query.action,
        resource_type: query.resource_type,
        date_from: query.date_from,
        date_to: query.date_to,
    };
    let page = state
        .audit_service
        .list(&filter, query.page, query.page_size)
        .await?;
    R::success(page)
}
