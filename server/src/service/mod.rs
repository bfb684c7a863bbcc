// 业务服务层

pub mod admin_service;
pub mod audit_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod loan_service;
