//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:3000/docs`
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::health::HealthResponse;
use crate::gateway::handlers::users::{StatsData, StatusData};
use crate::users::models::{
    CredentialsReset, Login, ResetPasswordRequest, SetPasswordRequest, Signup, User, UserUpdate,
};

/// API-key authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    r#"Set this header to your API key encoded as base64, prefixed with `Basic` or `Bearer`.

Example: Basic ODY2NDhkNzQtMTljNS00NTJiLWJhMDEtZmIzZWM3MGQ0YzJmCg==

Browser clients authenticate with the session cookie instead; the query
parameter `api_key` is accepted as a last resort."#,
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gatekeeper API",
        version = "1.0.0",
        description = "User authentication gateway: session cookies, API keys and a cached identity resolver.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::signup,
        crate::gateway::handlers::auth::login,
        crate::gateway::handlers::auth::logout,
        crate::gateway::handlers::auth::request_password_reset,
        crate::gateway::handlers::auth::set_password,
        crate::gateway::handlers::users::get_me,
        crate::gateway::handlers::users::update_me,
        crate::gateway::handlers::users::change_password,
        crate::gateway::handlers::users::reset_api_key,
        crate::gateway::handlers::users::delete_me,
        crate::gateway::handlers::users::status,
        crate::gateway::handlers::users::list_users,
        crate::gateway::handlers::users::stats,
        crate::gateway::handlers::users::flush_cache,
    ),
    components(
        schemas(
            HealthResponse,
            User,
            Signup,
            Login,
            UserUpdate,
            CredentialsReset,
            SetPasswordRequest,
            ResetPasswordRequest,
            StatsData,
            StatusData,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup, login and password management"),
        (name = "Users", description = "Profile and API-key management (auth required)"),
        (name = "Admin", description = "Administrative endpoints (admin auth required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
