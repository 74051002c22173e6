//! Admin-only user management endpoints.
//!
//! Flow Overview:
//! 1) Authenticate the request via session cookie.
//! 2) Require the admin flag on the session's user.
//! 3) Read, update or delete the requested user.

use axum::{
    Json,
    extract::{Extension, Path},
    http::HeaderMap,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    auth::{
        AuthState,
        principal::require_admin,
        utils::{normalize_email, normalize_optional, valid_email},
    },
    error::ApiError,
    types::{MessageResponse, UserRecord, UserResponse, UserUpdateRequest},
};
use crate::store::SharedStore;

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "List all users (admin-only).", body = [UserRecord]),
        (status = 401, description = "Missing or invalid session cookie.", body = MessageResponse),
        (status = 403, description = "Forbidden.", body = MessageResponse),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn list_users(
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    require_admin(&headers, &auth_state, store.as_ref()).await?;

    let users = store.find_all().await?;
    Ok(Json(users.iter().map(UserRecord::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User detail without password (admin-only).", body = UserRecord),
        (status = 400, description = "Invalid user id.", body = MessageResponse),
        (status = 401, description = "Missing or invalid session cookie.", body = MessageResponse),
        (status = 403, description = "Forbidden.", body = MessageResponse),
        (status = 404, description = "User not found.", body = MessageResponse),
    ),
    tag = "users"
)]
#[instrument(skip_all, fields(target_id = %id))]
pub async fn get_user(
    Path(id): Path<String>,
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> Result<Json<UserRecord>, ApiError> {
    require_admin(&headers, &auth_state, store.as_ref()).await?;
    let user_id = parse_user_id(&id)?;

    let user = store.find_by_id(user_id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(UserRecord::from(&user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated (admin-only).", body = UserResponse),
        (status = 400, description = "Invalid input.", body = MessageResponse),
        (status = 401, description = "Missing or invalid session cookie.", body = MessageResponse),
        (status = 403, description = "Forbidden.", body = MessageResponse),
        (status = 404, description = "User not found.", body = MessageResponse),
    ),
    tag = "users"
)]
#[instrument(skip_all, fields(target_id = %id))]
pub async fn update_user(
    Path(id): Path<String>,
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    payload: Option<Json<UserUpdateRequest>>,
) -> Result<Json<UserResponse>, ApiError> {
    require_admin(&headers, &auth_state, store.as_ref()).await?;
    let user_id = parse_user_id(&id)?;
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    debug!("admin update: {:?}", request);

    let mut user = store.find_by_id(user_id).await?.ok_or(ApiError::NotFound)?;

    if let Some(name) = normalize_optional(request.name) {
        user.name = name;
    }
    if let Some(email) = normalize_optional(request.email).map(|email| normalize_email(&email)) {
        if !valid_email(&email) {
            return Err(ApiError::validation("Invalid email"));
        }
        user.email = email;
    }

    let updated = store.save(&user).await.map_err(ApiError::persistence)?;

    info!(user_id = %updated.id, "user updated by admin");

    Ok(Json(UserResponse::from(&updated)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User deleted (admin-only).", body = MessageResponse),
        (status = 400, description = "Invalid user id.", body = MessageResponse),
        (status = 401, description = "Missing or invalid session cookie.", body = MessageResponse),
        (status = 403, description = "Forbidden, or target is an admin.", body = MessageResponse),
        (status = 404, description = "User not found.", body = MessageResponse),
    ),
    tag = "users"
)]
#[instrument(skip_all, fields(target_id = %id))]
pub async fn delete_user(
    Path(id): Path<String>,
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&headers, &auth_state, store.as_ref()).await?;
    let user_id = parse_user_id(&id)?;

    let user = store.find_by_id(user_id).await?.ok_or(ApiError::NotFound)?;
    if user.is_admin {
        return Err(ApiError::Forbidden("Cannot delete admin user"));
    }

    store.delete_by_id(user.id).await?;

    info!(user_id = %user.id, "user deleted by admin");

    Ok(Json(MessageResponse {
        message: format!("User removed with id: {}", user.id),
    }))
}

fn parse_user_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id.trim()).map_err(|_| ApiError::validation("Invalid user id"))
}
