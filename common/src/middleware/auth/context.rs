use actix_web::{HttpMessage, HttpRequest};

use crate::enums::UserRole;
use crate::error::{AppError, AppResult};

/// 已认证请求的上下文
///
/// 由认证中间件写入请求扩展，handler 通过 `from_request` 取出
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_request(req: &HttpRequest) -> AppResult<Self> {
        req.extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::auth("Not authenticated"))
    }

    /// 要求贷款审查权限
    pub fn require_reviewer(&self) -> AppResult<()> {
        if self.role.can_review_loans() {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient permissions"))
        }
    }

    /// 要求超级管理员权限
    pub fn require_superadmin(&self) -> AppResult<()> {
        if self.role.can_manage_users() {
            Ok(())
        } else {
            Err(AppError::forbidden("Superadmin access required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_gates() {
        let admin = AuthContext {
            user_id: 1,
            username: "superadmin".to_string(),
            role: UserRole::Superadmin,
        };
        let manager = AuthContext {
            user_id: 2,
            username: "bankmanager".to_string(),
            role: UserRole::BankManager,
        };

        assert!(admin.require_superadmin().is_ok());
        assert!(admin.require_reviewer().is_ok());
        assert!(manager.require_reviewer().is_ok());
        assert!(manager.require_superadmin().is_err());
    }

    #[test]
    fn test_missing_context_is_unauthorized() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let err = AuthContext::from_request(&req).unwrap_err();
        assert_eq!(err.message(), "Not authenticated");
    }
}
