// 中间件模块

pub mod auth;
pub mod error_handler;
