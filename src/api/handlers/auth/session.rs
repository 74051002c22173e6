//! Session cookie handling and the logout endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use super::{
    state::{AuthConfig, AuthState},
    token::TokenError,
};
use crate::api::handlers::{error::ApiError, types::MessageResponse};

pub(crate) const SESSION_COOKIE_NAME: &str = "session";

const EXPIRED_AT: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

#[utoipa::path(
    post,
    path = "/users/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(Extension(auth_state): Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Always clear the cookie, whatever state the client's session was in.
    let mut headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }
    (
        StatusCode::OK,
        headers,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Sign a session token for `user_id` and wrap it in a `Set-Cookie` header map.
pub(crate) fn issue_session(auth_state: &AuthState, user_id: Uuid) -> Result<HeaderMap, ApiError> {
    let token = auth_state
        .keys()
        .issue(user_id, auth_state.config().session_ttl_seconds())
        .map_err(ApiError::internal)?;
    let cookie = session_cookie(auth_state.config(), &token).map_err(ApiError::internal)?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok(headers)
}

/// Resolve the request's session token into a user id.
pub(crate) fn authenticate_session(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<Uuid, ApiError> {
    let Some(token) = extract_session_token(headers) else {
        return Err(ApiError::Unauthenticated);
    };
    auth_state.keys().verify(&token).map_err(|err| {
        match err {
            TokenError::Expired => debug!("Rejected expired session token"),
            other => debug!("Rejected session token: {other}"),
        }
        ApiError::Unauthenticated
    })
}

/// Build an `HttpOnly` cookie for the session token.
fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(
    config: &AuthConfig,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0; Expires={EXPIRED_AT}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
