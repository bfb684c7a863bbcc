use rbatis::crud;
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 审计日志, 只增不改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SysAuditLog {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    /// login_success / user_created / feature_weight_updated ...
    pub action: Option<String>,
    /// user / loan_application / feature_weight / model
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Option<DateTime>,
}

crud!(SysAuditLog {}, "sys_audit_log");

impl SysAuditLog {
    pub const TABLE_NAME: &'static str = "sys_audit_log";
}

/// 审计日志联查投影, 带操作人用户名
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogDetail {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Option<DateTime>,
}
