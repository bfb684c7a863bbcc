/// 应用常量定义

/// 认证头名称
pub const AUTH_HEADER_NAME: &str = "Authorization";

/// Bearer 前缀
pub const BEARER_PREFIX: &str = "Bearer ";

/// 返回给客户端的 token 类型
pub const TOKEN_TYPE: &str = "bearer";

/// 最大分页大小
pub const MAX_PAGE_SIZE: u64 = 100;

/// 审计动作
pub mod audit_actions {
    pub const LOGIN_SUCCESS: &str = "login_success";
    pub const LOGIN_FAILED: &str = "login_failed";
    pub const LOGOUT: &str = "logout";
    pub const PASSWORD_CHANGED: &str = "password_changed";
    pub const USER_CREATED: &str = "user_created";
    pub const USER_UPDATED: &str = "user_updated";
    pub const USER_DELETED: &str = "user_deleted";
    pub const LOAN_STATUS_UPDATED: &str = "loan_status_updated";
    pub const ADMIN_DECISION_UPDATED: &str = "admin_decision_updated";
    pub const FEATURE_WEIGHT_UPDATED: &str = "feature_weight_updated";
    pub const MODEL_RETRAIN_REQUESTED: &str = "model_retrain_requested";
}

/// 审计资源类型
pub mod resource_types {
    pub const USER: &str = "user";
    pub const LOAN_APPLICATION: &str = "loan_application";
    pub const FEATURE_WEIGHT: &str = "feature_weight";
    pub const MODEL: &str = "model";
}
