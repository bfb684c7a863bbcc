// 数据库实体定义

pub mod entities;

pub use entities::*;
