//! Authenticated self-service endpoints.
//!
//! Flow Overview:
//! 1) Authenticate via session cookie.
//! 2) Resolve the current user from the store.
//! 3) Apply the provided subset of updates.

use axum::{Json, extract::Extension, http::HeaderMap};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    auth::{
        AuthState,
        password::hash_password_blocking,
        principal::require_auth,
        utils::{non_empty, normalize_email, normalize_optional, valid_email},
    },
    error::ApiError,
    types::{MessageResponse, ProfileUpdateRequest, UserResponse},
};
use crate::store::SharedStore;

#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "Return the authenticated user profile.", body = UserResponse),
        (status = 401, description = "Missing or invalid session cookie.", body = MessageResponse),
        (status = 404, description = "User not found.", body = MessageResponse),
    ),
    tag = "profile"
)]
#[instrument(skip_all)]
pub async fn get_profile(
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> Result<Json<UserResponse>, ApiError> {
    let principal = require_auth(&headers, &auth_state)?;

    let user = store
        .find_by_id(principal.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(UserResponse::from(&user)))
}

#[utoipa::path(
    put,
    path = "/users/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated.", body = UserResponse),
        (status = 400, description = "Invalid update payload or email already registered.", body = MessageResponse),
        (status = 401, description = "Missing or invalid session cookie.", body = MessageResponse),
        (status = 404, description = "User not found.", body = MessageResponse),
    ),
    tag = "profile"
)]
#[instrument(skip_all)]
pub async fn update_profile(
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    payload: Option<Json<ProfileUpdateRequest>>,
) -> Result<Json<UserResponse>, ApiError> {
    let principal = require_auth(&headers, &auth_state)?;
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    debug!("profile update: {:?}", request);

    let mut user = store
        .find_by_id(principal.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(name) = normalize_optional(request.name) {
        user.name = name;
    }
    if let Some(email) = normalize_optional(request.email).map(|email| normalize_email(&email)) {
        if !valid_email(&email) {
            return Err(ApiError::validation("Invalid email"));
        }
        user.email = email;
    }
    if let Some(password) = non_empty(request.password) {
        user.password = hash_password_blocking(password)
            .await
            .map_err(ApiError::internal)?;
    }

    let updated = store.save(&user).await.map_err(ApiError::persistence)?;

    info!(user_id = %updated.id, "profile updated");

    Ok(Json(UserResponse::from(&updated)))
}
