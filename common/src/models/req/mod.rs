pub mod loan;
pub mod auth;
pub mod admin;
