// 工具模块

pub mod application_id;
pub mod password;
pub mod http;

pub use application_id::generate_application_id;
pub use password::{hash_password, verify_password};
pub use http::{client_ip, user_agent};
