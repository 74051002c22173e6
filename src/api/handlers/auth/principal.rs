//! Authenticated principal extraction and the admin gate.
//!
//! Flow Overview: read the session token, verify it, and return a principal
//! that downstream handlers can use. Admin routes additionally load the user
//! and require the admin flag.

use axum::http::HeaderMap;
use tracing::debug;
use uuid::Uuid;

use super::{session::authenticate_session, state::AuthState};
use crate::{
    api::handlers::error::ApiError,
    store::{User, UserStore},
};

/// Authenticated user context derived from the session token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Resolve a session into a principal, or return 401 for missing/invalid sessions.
pub(crate) fn require_auth(headers: &HeaderMap, auth_state: &AuthState) -> Result<Principal, ApiError> {
    authenticate_session(headers, auth_state).map(|user_id| Principal { user_id })
}

/// Resolve a session and require the admin flag on the session's user.
///
/// A valid token for a user that no longer exists is treated as unauthenticated.
pub(crate) async fn require_admin(
    headers: &HeaderMap,
    auth_state: &AuthState,
    store: &dyn UserStore,
) -> Result<User, ApiError> {
    let principal = require_auth(headers, auth_state)?;
    let Some(user) = store.find_by_id(principal.user_id).await? else {
        debug!(user_id = %principal.user_id, "session user no longer exists");
        return Err(ApiError::Unauthenticated);
    };
    if user.is_admin {
        Ok(user)
    } else {
        Err(ApiError::Forbidden("Not authorized as an admin"))
    }
}
