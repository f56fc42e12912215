//! Profile, API-key and admin handlers. Everything here sits behind the
//! authentication middleware; handlers receive the resolved principal from
//! the request extensions.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResponse, ApiResult, ok};
use crate::auth::Principal;
use crate::users::models::{CredentialsReset, User, UserUpdate};
use crate::users::password::{hash_password, verify_password};

#[derive(Serialize, ToSchema)]
pub struct StatsData {
    pub user_count: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StatusData {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Users"
)]
pub async fn get_me(principal: Principal) -> ApiResult<User> {
    ok(principal.0)
}

/// Update email and location of the current user
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid profile data")
    ),
    tag = "Users"
)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(update): Json<UserUpdate>,
) -> ApiResult<User> {
    if !update.is_valid() {
        return ApiError::bad_request("invalid profile data").into_err();
    }

    let mut user = principal.0;
    user.email = update.email;
    user.location = update.location;

    let user = state.users.update(&user).await?;
    ok(user)
}

/// Change the current user's password, verifying the old one first
#[utoipa::path(
    post,
    path = "/api/users/me/password",
    request_body = CredentialsReset,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid new password"),
        (status = 401, description = "Old password wrong")
    ),
    tag = "Users"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(reset): Json<CredentialsReset>,
) -> ApiResult<()> {
    if !reset.is_valid() {
        return ApiError::bad_request("invalid new password").into_err();
    }

    let pepper = &state.config.security.password_pepper;
    let mut user = principal.0;
    if !verify_password(&user.password, &reset.password_old, pepper) {
        return ApiError::unauthorized("invalid credentials").into_err();
    }

    user.password = hash_password(&reset.password_new, pepper)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    state.users.update(&user).await?;

    tracing::info!("user '{}' changed their password", user.id);
    ok(())
}

/// Regenerate the current user's API key
///
/// The old key stops resolving immediately; the new one is in the response.
#[utoipa::path(
    post,
    path = "/api/users/me/api-key",
    responses((status = 200, description = "User with fresh API key", body = User)),
    tag = "Users"
)]
pub async fn reset_api_key(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> ApiResult<User> {
    let user = state.users.reset_api_key(&principal.0).await?;
    tracing::info!("user '{}' reset their api key", user.id);
    ok(user)
}

/// Delete the current user's account and clear the session
#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses((status = 200, description = "Account deleted, session cookie cleared")),
    tag = "Users"
)]
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Response, ApiError> {
    state.users.delete(&principal.0).await?;
    tracing::info!("user '{}' deleted their account", principal.0.id);

    let clear = state.config.clear_auth_cookie().to_string();
    let value = HeaderValue::from_str(&clear)
        .map_err(|_| ApiError::internal("failed to serialize cookie"))?;
    let mut response = (StatusCode::OK, Json(ApiResponse::success(()))).into_response();
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// Authentication status, usable without credentials
///
/// Mounted on an optional-auth path: with a valid credential the principal
/// is attached, without one the request still reaches this handler.
#[utoipa::path(
    get,
    path = "/api/status",
    responses((status = 200, description = "Authentication status", body = StatusData)),
    tag = "Users"
)]
pub async fn status(principal: Option<Principal>) -> ApiResult<StatusData> {
    ok(StatusData {
        authenticated: principal.is_some(),
        user: principal.map(|p| p.0.id),
    })
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 403, description = "Not an administrator")
    ),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> ApiResult<Vec<User>> {
    require_admin(&principal)?;
    ok(state.users.get_all().await?)
}

/// User count (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses((status = 200, description = "Aggregate counts", body = StatsData)),
    tag = "Admin"
)]
pub async fn stats(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> ApiResult<StatsData> {
    require_admin(&principal)?;
    ok(StatsData {
        user_count: state.users.count().await?,
    })
}

/// Drop every cached identity snapshot (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/cache/flush",
    responses((status = 200, description = "Cache flushed")),
    tag = "Admin"
)]
pub async fn flush_cache(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> ApiResult<()> {
    require_admin(&principal)?;
    state.users.flush_cache();
    tracing::info!("identity cache flushed by '{}'", principal.0.id);
    ok(())
}

fn require_admin(principal: &Principal) -> Result<(), ApiError> {
    if principal.0.is_admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("administrator access required"))
    }
}
