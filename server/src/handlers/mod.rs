// 路由层
//
// handler 只做参数提取和权限断言, 业务都在 service 层

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod loans;
