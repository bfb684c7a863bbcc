use actix_web::{get, web, HttpRequest, Responder};

use common::error::AppError;
use common::middleware::auth::AuthContext;
use common::response::R;

use crate::state::AppState;

/// GET /api/v1/admin/dashboard
#[get("/api/v1/admin/dashboard")]
pub async fn dashboard(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let ctx = AuthContext::from_request(&req)?;
    ctx.require_reviewer()?;
    let dto = state.dashboard_service.dashboard().await?;
    R::success(dto)
}
