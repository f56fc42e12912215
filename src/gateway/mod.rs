//! HTTP gateway: router assembly and server startup.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use anyhow::Context;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{AuthGate, authenticate};
use crate::users::service::IdentityResolver;
use state::AppState;

/// Assemble the full router.
///
/// Two middleware mounts share one resolver and codec but carry different
/// failure policies: API routes answer unauthenticated requests with a bare
/// 401 (and let `/api/status` through without credentials), browser routes
/// clear the session cookie and redirect home.
pub fn build_router(state: Arc<AppState>) -> Router {
    let resolver: Arc<dyn IdentityResolver> = state.users.clone();

    let api_gate = Arc::new(
        AuthGate::new(
            resolver.clone(),
            state.codec.clone(),
            state.config.clone(),
        )
        .with_optional_for(vec!["/api/status".to_string()]),
    );

    let browser_gate = Arc::new(
        AuthGate::new(resolver, state.codec.clone(), state.config.clone())
            .with_redirect_target("/?error=unauthorized"),
    );

    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/auth/password/reset",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/api/auth/password/set",
            post(handlers::auth::set_password),
        );

    let authenticated_routes = Router::new()
        .route(
            "/api/users/me",
            get(handlers::users::get_me)
                .put(handlers::users::update_me)
                .delete(handlers::users::delete_me),
        )
        .route(
            "/api/users/me/password",
            post(handlers::users::change_password),
        )
        .route(
            "/api/users/me/api-key",
            post(handlers::users::reset_api_key),
        )
        .route("/api/status", get(handlers::users::status))
        .route("/api/admin/users", get(handlers::users::list_users))
        .route("/api/admin/stats", get(handlers::users::stats))
        .route(
            "/api/admin/cache/flush",
            post(handlers::users::flush_cache),
        )
        .layer(from_fn_with_state(api_gate, authenticate));

    // browser-facing stand-in for server-rendered pages; template rendering
    // itself lives outside this service
    let browser_routes = Router::new()
        .route("/dashboard", get(handlers::users::get_me))
        .layer(from_fn_with_state(browser_gate, authenticate));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(browser_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let app = build_router(Arc::new(state));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("gateway listening on http://{}", addr);
    tracing::info!("API docs at http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
