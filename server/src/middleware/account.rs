use std::sync::Arc;

use async_trait::async_trait;
use rbatis::RBatis;

use common::enums::UserRole;
use common::error::{AppError, AppResult};
use common::middleware::auth::{AccountVerifier, AuthContext, TokenClaims};
use orm::entities::system::SysUser;

/// 查库版账户校验器
///
/// 每次请求都按用户名回查账户，被停用的账户即使持有
/// 未过期 token 也立即失效
pub struct DbAccountVerifier {
    rb: Arc<RBatis>,
}

impl DbAccountVerifier {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }
}

#[async_trait(?Send)]
impl AccountVerifier for DbAccountVerifier {
    async fn verify(&self, claims: &TokenClaims) -> AppResult<AuthContext> {
        let user = SysUser::select_by_username(self.rb.as_ref(), &claims.sub)
            .await?
            .ok_or_else(|| AppError::auth("Invalid or expired token"))?;

        if !user.is_usable() {
            log::warn!("⚠️  被停用账户尝试访问: {}", claims.sub);
            return Err(AppError::auth("User account is disabled"));
        }

        let role_str = user.role.as_deref().unwrap_or_default();
        let role = UserRole::parse(role_str)
            .ok_or_else(|| AppError::auth("Invalid or expired token"))?;

        Ok(AuthContext {
            user_id: user.id.unwrap_or(claims.user_id),
            username: claims.sub.clone(),
            role,
        })
    }
}
