pub mod sys_user;
pub mod sys_audit_log;

pub use sys_user::SysUser;
pub use sys_audit_log::{AuditLogDetail, SysAuditLog};
