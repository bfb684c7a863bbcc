// 枚举模块

pub mod application;
pub mod risk;
pub mod user_role;

pub use application::{Education, Gender, PropertyArea, YesNo};
pub use risk::{LoanDecision, RiskCategory};
pub use user_role::UserRole;
