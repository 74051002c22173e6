//! Auth handlers and supporting modules.
//!
//! This module owns credential hashing, session-token issuance and
//! verification, and the cookie that carries the token.
//!
//! ## Session Tokens
//!
//! Tokens are HS256 JWTs whose subject is the user id. They are signed with the
//! server-held `--session-secret`; rotating the secret logs every user out.
//! The default lifetime is 30 days and matches the cookie's `Max-Age`.

pub(crate) mod password;
pub(crate) mod principal;
pub(crate) mod session;
mod state;
mod token;
pub(crate) mod utils;

pub use state::{AuthConfig, AuthState, DEFAULT_SESSION_TTL_SECONDS, MAX_SESSION_TTL_SECONDS};
pub use token::{SessionClaims, SessionKeys, TokenError};
