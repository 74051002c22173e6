use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    auth::{
        AuthState,
        password::{verify_dummy_blocking, verify_password_blocking},
        session::issue_session,
        utils::{non_empty, normalize_email, normalize_optional},
    },
    error::ApiError,
    types::{LoginRequest, MessageResponse, UserResponse},
};
use crate::store::SharedStore;

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login successful, session cookie set", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Missing email or password", body = MessageResponse),
        (status = 401, description = "Invalid email or password", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(store): Extension<SharedStore>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    debug!("login request: {:?}", request);

    let email = normalize_optional(request.email).map(|email| normalize_email(&email));
    let password = non_empty(request.password);
    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    // Unknown email and wrong password must be indistinguishable to the caller.
    let Some(user) = store.find_by_email(&email).await? else {
        verify_dummy_blocking(password).await;
        debug!("login for unknown email");
        return Err(ApiError::AuthFailure);
    };

    let valid = verify_password_blocking(password, user.password.clone())
        .await
        .map_err(ApiError::internal)?;
    if !valid {
        debug!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::AuthFailure);
    }

    let headers = issue_session(&auth_state, user.id)?;

    info!(user_id = %user.id, "user logged in");

    Ok((StatusCode::CREATED, headers, Json(UserResponse::from(&user))))
}
