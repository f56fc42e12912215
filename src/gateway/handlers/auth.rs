//! Signup, login/logout and the password-reset flow.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResponse, ApiResult, created, error_codes, ok};
use crate::users::models::{
    AUTH_COOKIE_NAME, Login, ResetPasswordRequest, SetPasswordRequest, Signup, User,
};
use crate::users::password::{hash_password, verify_password};
use crate::users::service::ServiceError;

/// Register a new account
///
/// Idempotent on the username: signing up an existing name returns 409
/// without touching the stored identity. The very first account becomes
/// an administrator.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = Signup,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid signup data"),
        (status = 403, description = "Signup disabled"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Auth"
)]
pub async fn signup(State(state): State<Arc<AppState>>, Json(signup): Json<Signup>) -> ApiResult<User> {
    if !state.config.security.allow_signup {
        return ApiError::new(
            StatusCode::FORBIDDEN,
            error_codes::SIGNUP_DISABLED,
            "signup is disabled",
        )
        .into_err();
    }
    if !signup.is_valid() {
        return ApiError::bad_request("invalid signup data").into_err();
    }

    // the very first account gets the admin flag
    let is_admin = state.users.count().await? == 0;

    let (user, was_created) = state.users.create_or_get(signup, is_admin).await?;
    if !was_created {
        return ApiError::conflict(error_codes::USERNAME_TAKEN, "username already taken")
            .into_err();
    }

    tracing::info!("created new user '{}'", user.id);
    created(user)
}

/// Log in with username and password
///
/// On success the session cookie is set; the response body carries the
/// public profile. Wrong username and wrong password are deliberately
/// indistinguishable.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Login,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = User),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(login): Json<Login>,
) -> Result<Response, ApiError> {
    let user = match state.users.get_user_by_id(&login.username).await {
        Ok(user) => user,
        Err(ServiceError::NotFound) => return Err(ApiError::unauthorized("invalid credentials")),
        Err(e) => return Err(e.into()),
    };

    let pepper = &state.config.security.password_pepper;
    if !verify_password(&user.password, &login.password, pepper) {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let mut user = user;
    user.last_logged_in_at = Utc::now();
    let user = state.users.update(&user).await?;

    let token = state
        .codec
        .encode(AUTH_COOKIE_NAME, &user.id)
        .map_err(|_| ApiError::internal("failed to create session"))?;
    let cookie = state.config.auth_cookie(token);

    tracing::info!("user '{}' logged in", user.id);
    with_set_cookie(
        (StatusCode::OK, Json(ApiResponse::success(user))).into_response(),
        &cookie.to_string(),
    )
}

/// Log out
///
/// Overwrites the session cookie with an empty value and negative max-age.
/// Works without a valid session on purpose.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "Auth"
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let clear = state.config.clear_auth_cookie();
    with_set_cookie(
        (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        &clear.to_string(),
    )
}

/// Request a password reset mail
///
/// Always answers 200 so the response does not reveal whether an address
/// is registered.
#[utoipa::path(
    post,
    path = "/api/auth/password/reset",
    request_body = ResetPasswordRequest,
    responses((status = 200, description = "Reset mail sent if the address is known")),
    tag = "Auth"
)]
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<()> {
    match state.users.get_user_by_email(&request.email).await {
        Ok(user) => {
            let user = state.users.generate_reset_token(&user).await?;
            let reset_link = format!(
                "{}/set-password?token={}",
                state.config.server.public_url.trim_end_matches('/'),
                user.reset_token
            );
            if let Err(e) = state.mail.send_password_reset(&user, &reset_link).await {
                tracing::error!("failed to send password reset mail to '{}': {}", user.id, e);
            }
        }
        Err(ServiceError::NotFound) | Err(ServiceError::InvalidInput(_)) => {
            tracing::debug!("password reset requested for unknown address");
        }
        Err(e) => return Err(e.into()),
    }

    ok(())
}

/// Set a new password using a one-time reset token
#[utoipa::path(
    post,
    path = "/api/auth/password/set",
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid token or password")
    ),
    tag = "Auth"
)]
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetPasswordRequest>,
) -> ApiResult<()> {
    if !request.is_valid() {
        return ApiError::bad_request("invalid password").into_err();
    }

    let user = match state.users.get_user_by_reset_token(&request.token).await {
        Ok(user) => user,
        Err(ServiceError::NotFound) | Err(ServiceError::InvalidInput(_)) => {
            return ApiError::bad_request("invalid reset token").into_err();
        }
        Err(e) => return Err(e.into()),
    };

    let pepper = &state.config.security.password_pepper;
    let mut user = user;
    user.password =
        hash_password(&request.password, pepper).map_err(|e| ApiError::internal(e.to_string()))?;
    user.reset_token = String::new(); // one-time: consumed here
    state.users.update(&user).await?;

    tracing::info!("user '{}' set a new password via reset token", user.id);
    ok(())
}

fn with_set_cookie(mut response: Response, cookie: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|_| ApiError::internal("failed to serialize cookie"))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}
