use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    auth::{
        AuthState,
        password::hash_password_blocking,
        session::issue_session,
        utils::{non_empty, normalize_email, normalize_optional, valid_email},
    },
    error::ApiError,
    types::{MessageResponse, RegisterRequest, UserResponse},
};
use crate::store::{NewUser, SharedStore};

#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful, session cookie set", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Missing input, invalid email or email already registered", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    debug!("register request: {:?}", request);

    let name = normalize_optional(request.name);
    let email = normalize_optional(request.email).map(|email| normalize_email(&email));
    let password = non_empty(request.password);

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(ApiError::validation("Please fill all the inputs."));
    };

    if !valid_email(&email) {
        return Err(ApiError::validation("Invalid email"));
    }

    // Fast path only; the store's unique constraint is what actually prevents duplicates.
    if store.find_by_email(&email).await?.is_some() {
        debug!("email already registered");
        return Err(ApiError::Conflict);
    }

    let password_hash = hash_password_blocking(password)
        .await
        .map_err(ApiError::internal)?;

    let mut user = store
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(ApiError::persistence)?;

    if auth_state.config().is_admin_email(&user.email) {
        user.is_admin = true;
        user = store.save(&user).await.map_err(ApiError::persistence)?;
        info!(user_id = %user.id, "configured admin account registered");
    }

    let headers = issue_session(&auth_state, user.id)?;

    info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, headers, Json(UserResponse::from(&user))))
}
