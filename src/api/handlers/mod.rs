//! API handlers for the accounts service.
//!
//! Every handler returns `Result<_, ApiError>` so that status codes are decided
//! in one place (`error.rs`), not scattered through business logic.

pub mod auth;
pub mod error;
pub mod health;
pub mod me;
pub mod types;
pub mod user_login;
pub mod user_register;
pub mod users;
