pub mod prediction;
pub mod auth;
