use actix_web::{delete, get, post, put, web, HttpRequest, Responder};
use serde::Deserialize;

use common::error::AppError;
use common::middleware::auth::AuthContext;
use common::models::{ChangePasswordRequest, CreateUserRequest, LoginRequest, UpdateUserRequest};
use common::response::R;
use common::utils::{client_ip, user_agent};

use crate::state::AppState;

/// POST /api/v1/auth/login (公开)
#[post("/api/v1/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    log::info!("收到登录请求: username={}", payload.username);
    let dto = state
        .auth_service
        .login(&payload, Some(client_ip(&req)), user_agent(&req))
        .await?;
    R::success(dto)
}

/// POST /api/v1/auth/logout
#[post("/api/v1/auth/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    state
        .auth_service
        .logout(&ctx, Some(client_ip(&req)), user_agent(&req))
        .await;
    R::ok_with_msg("Logged out successfully")
}

/// GET /api/v1/auth/me
#[get("/api/v1/auth/me")]
pub async fn me(state: web::Data<AppState>, req: HttpRequest) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    let dto = state.auth_service.current_user(ctx.user_id).await?;
    R::success(dto)
}

/// PUT /api/v1/auth/change-password
#[put("/api/v1/auth/change-password")]
pub async fn change_password(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    state
        .auth_service
        .change_password(&ctx, &payload, Some(client_ip(&req)), user_agent(&req))
        .await?;
    R::ok_with_msg("Password changed successfully")
}

/// POST /api/v1/auth/users (仅超级管理员)
#[post("/api/v1/auth/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<CreateUserRequest>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_superadmin()?;
    let dto = state
        .auth_service
        .create_user(&ctx, &payload, Some(client_ip(&req)), user_agent(&req))
        .await?;
    R::success(dto)
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

/// GET /api/v1/auth/users (仅超级管理员)
#[get("/api/v1/auth/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_superadmin()?;
    let page = state
        .auth_service
        .list_users(
            query.role.clone(),
            query.is_active,
            query.page,
            query.page_size,
        )
        .await?;
    R::success(page)
}

/// GET /api/v1/auth/users/{user_id} (仅超级管理员)
#[get("/api/v1/auth/users/{user_id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_superadmin()?;
    let dto = state.auth_service.get_user(path.into_inner()).await?;
    R::success(dto)
}

/// PUT /api/v1/auth/users/{user_id} (仅超级管理员)
#[put("/api/v1/auth/users/{user_id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_superadmin()?;
    let dto = state
        .auth_service
        .update_user(
            &ctx,
            path.into_inner(),
            &payload,
            Some(client_ip(&req)),
            user_agent(&req),
        )
        .await?;
    R::success(dto)
}

/// DELETE /api/v1/auth/users/{user_id} (仅超级管理员, 软删除)
#[delete("/api/v1/auth/users/{user_id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_superadmin()?;
    state
        .auth_service
        .delete_user(
            &ctx,
            path.into_inner(),
            Some(client_ip(&req)),
            user_agent(&req),
        )
        .await?;
    R::ok_with_msg("User disabled successfully")
}
