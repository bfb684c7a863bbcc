use std::sync::Arc;
use rbatis::RBatis;
use scoring::Predictor;
use crate::service::admin_service::AdminService;
use crate::service::audit_service::AuditService;
use crate::service::auth_service::AuthService;
use crate::service::dashboard_service::DashboardService;
use crate::service::loan_service::LoanService;

#[derive(Clone)]
pub struct AppState {
    pub rb: Arc<RBatis>,
    pub predictor: Arc<Predictor>,
    pub auth_service: Arc<AuthService>,
    pub loan_service: Arc<LoanService>,
    pub admin_service: Arc<AdminService>,
    pub dashboard_service: Arc<DashboardService>,
    pub audit_service: Arc<AuditService>,
}
