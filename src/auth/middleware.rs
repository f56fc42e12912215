//! Authentication middleware.
//!
//! Per request, three credential sources are tried in fixed order: session
//! cookie, then `Authorization` header, then `api_key` query parameter.
//! The order is load-bearing: a browser session must win over a programmatic
//! key when a request carries both, and clients rely on that.
//!
//! Every strategy failure is silent, including a cookie that fails to
//! decode: a tampered cookie and no cookie look identical from the outside.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::ERR_UNAUTHORIZED;
use super::extract;
use super::principal::Principal;
use crate::config::AppConfig;
use crate::session::SessionCodec;
use crate::users::models::{AUTH_COOKIE_NAME, User};
use crate::users::service::IdentityResolver;

/// Configuration and collaborators for one middleware mount. Routes with
/// different policies (optional paths, redirect-vs-401) get their own
/// `AuthGate`, all sharing the same resolver and codec.
pub struct AuthGate {
    resolver: Arc<dyn IdentityResolver>,
    codec: Arc<SessionCodec>,
    config: Arc<AppConfig>,
    optional_prefixes: Vec<String>,
    redirect_target: Option<String>,
}

impl AuthGate {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        codec: Arc<SessionCodec>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            resolver,
            codec,
            config,
            optional_prefixes: Vec::new(),
            redirect_target: None,
        }
    }

    /// Paths (exact or prefix match) on which a missing or invalid
    /// credential does not block the request.
    pub fn with_optional_for(mut self, paths: Vec<String>) -> Self {
        self.optional_prefixes = paths;
        self
    }

    /// Where to send unauthenticated browsers instead of a bare 401. The
    /// session cookie is cleared alongside the redirect.
    pub fn with_redirect_target(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = Some(target.into());
        self
    }

    fn is_optional(&self, request_path: &str) -> bool {
        self.optional_prefixes
            .iter()
            .any(|p| request_path == p || request_path.starts_with(p.as_str()))
    }

    async fn user_from_cookie(&self, headers: &HeaderMap) -> Option<User> {
        let token = extract::cookie_value(headers, AUTH_COOKIE_NAME)?;
        // decode failure falls through like an absent cookie; the cookie is
        // authenticated, so there is no password to re-check here
        let user_id = self.codec.decode(AUTH_COOKIE_NAME, &token).ok()?;
        self.resolver.get_user_by_id(&user_id).await.ok()
    }

    async fn user_from_header(&self, headers: &HeaderMap) -> Option<User> {
        let api_key = extract::bearer_api_key(headers).ok()?;
        self.resolver.get_user_by_key(&api_key).await.ok()
    }

    async fn user_from_query(&self, uri: &Uri) -> Option<User> {
        let api_key = extract::query_api_key(uri)?;
        self.resolver.get_user_by_key(&api_key).await.ok()
    }

    fn reject(&self) -> Response {
        match &self.redirect_target {
            None => (StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED).into_response(),
            Some(target) => {
                let Ok(location) = HeaderValue::from_str(target) else {
                    tracing::error!("invalid redirect target '{}'", target);
                    return (StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED).into_response();
                };
                let clear_cookie = self.config.clear_auth_cookie().to_string();
                let mut response = StatusCode::FOUND.into_response();
                response.headers_mut().insert(header::LOCATION, location);
                if let Ok(value) = HeaderValue::from_str(&clear_cookie) {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
                response
            }
        }
    }
}

/// The per-request authentication state machine. Mounted with
/// `axum::middleware::from_fn_with_state(gate, authenticate)`.
pub async fn authenticate(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut user = gate.user_from_cookie(request.headers()).await;
    if user.is_none() {
        user = gate.user_from_header(request.headers()).await;
    }
    if user.is_none() {
        user = gate.user_from_query(request.uri()).await;
    }

    let Some(user) = user else {
        if gate.is_optional(request.uri().path()) {
            return next.run(request).await;
        }
        tracing::debug!("unauthenticated request to {}", request.uri().path());
        return gate.reject();
    };

    request.extensions_mut().insert(Principal(user));
    next.run(request).await
}
