//! Router-level authentication scenarios against a stub identity resolver.
//!
//! These exercise the middleware exactly as mounted in production: a real
//! router, real requests, only the credential store swapped for an
//! in-memory stub.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
    routing::get,
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use tower::ServiceExt;

use gatekeeper::auth::{AuthGate, Principal, authenticate};
use gatekeeper::config::{AppConfig, DbConfig, ServerConfig};
use gatekeeper::session::SessionCodec;
use gatekeeper::users::{AUTH_COOKIE_NAME, IdentityResolver, ServiceError, User};

struct StubResolver {
    users: Vec<User>,
}

#[async_trait]
impl IdentityResolver for StubResolver {
    async fn get_user_by_id(&self, user_id: &str) -> Result<User, ServiceError> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }

    async fn get_user_by_key(&self, api_key: &str) -> Result<User, ServiceError> {
        if api_key.is_empty() {
            return Err(ServiceError::InvalidInput("api key must not be empty"));
        }
        self.users
            .iter()
            .find(|u| u.api_key == api_key)
            .cloned()
            .ok_or(ServiceError::NotFound)
    }
}

fn test_user(id: &str, api_key: &str) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        api_key: api_key.to_string(),
        email: format!("{id}@example.org"),
        location: String::new(),
        password: String::new(),
        is_admin: false,
        reset_token: String::new(),
        created_at: now,
        last_logged_in_at: now,
    }
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        log_level: "info".to_string(),
        log_dir: "./logs".to_string(),
        log_file: "test.log".to_string(),
        use_json: false,
        rotation: "never".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: "http://localhost".to_string(),
        },
        db: DbConfig {
            url: String::new(),
            max_connections: 1,
        },
        security: Default::default(),
        cache: Default::default(),
        mail: Default::default(),
    })
}

/// Reports the attached principal (or "anonymous") in the response body.
async fn whoami(principal: Option<Principal>) -> String {
    principal
        .map(|p| p.0.id)
        .unwrap_or_else(|| "anonymous".to_string())
}

struct Harness {
    router: Router,
    codec: Arc<SessionCodec>,
}

fn harness(configure: impl FnOnce(AuthGate) -> AuthGate) -> Harness {
    let codec = Arc::new(SessionCodec::new());
    let config = test_config();
    let resolver = Arc::new(StubResolver {
        users: vec![
            test_user("alice", "alice-key"),
            test_user("bob", "bob-key"),
        ],
    });

    let gate = configure(AuthGate::new(resolver, codec.clone(), config.clone()));
    let router = Router::new()
        .route("/dashboard", get(whoami))
        .route("/assets/{*path}", get(whoami))
        .layer(from_fn_with_state(Arc::new(gate), authenticate));

    Harness { router, codec }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn session_cookie_header(codec: &SessionCodec, user_id: &str) -> String {
    let token = codec.encode(AUTH_COOKIE_NAME, user_id).unwrap();
    format!("{AUTH_COOKIE_NAME}={token}")
}

fn basic_auth_header(api_key: &str) -> String {
    format!("Basic {}", BASE64.encode(api_key))
}

#[tokio::test]
async fn test_header_auth_on_mandatory_path() {
    let h = harness(|gate| gate);

    let request = Request::builder()
        .uri("/dashboard")
        .header(header::AUTHORIZATION, basic_auth_header("alice-key"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "alice");
}

#[tokio::test]
async fn test_cookie_beats_header() {
    let h = harness(|gate| gate);

    // both credentials valid, for different users: the cookie must win
    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, session_cookie_header(&h.codec, "alice"))
        .header(header::AUTHORIZATION, basic_auth_header("bob-key"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "alice");
}

#[tokio::test]
async fn test_header_beats_query() {
    let h = harness(|gate| gate);

    let request = Request::builder()
        .uri("/dashboard?api_key=alice-key")
        .header(header::AUTHORIZATION, basic_auth_header("bob-key"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "bob");
}

#[tokio::test]
async fn test_query_auth_as_last_resort() {
    let h = harness(|gate| gate);

    let request = Request::builder()
        .uri("/dashboard?api_key=alice-key")
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "alice");
}

#[tokio::test]
async fn test_garbled_cookie_falls_through_to_header() {
    let h = harness(|gate| gate);

    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, format!("{AUTH_COOKIE_NAME}=tampered-garbage"))
        .header(header::AUTHORIZATION, basic_auth_header("bob-key"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "bob");
}

#[tokio::test]
async fn test_garbled_cookie_on_optional_path_passes_through() {
    let h = harness(|gate| gate.with_optional_for(vec!["/assets".to_string()]));

    let request = Request::builder()
        .uri("/assets/app.css")
        .header(header::COOKIE, format!("{AUTH_COOKIE_NAME}=expired-or-garbled"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    // handler runs, but with no identity attached
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "anonymous");
}

#[tokio::test]
async fn test_no_credentials_mandatory_path_is_401() {
    let h = harness(|gate| gate);

    let request = Request::builder()
        .uri("/dashboard")
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(response).await, "401 unauthorized");
}

#[tokio::test]
async fn test_no_credentials_with_redirect_target() {
    let h = harness(|gate| gate.with_redirect_target("/?error=unauthorized"));

    let request = Request::builder()
        .uri("/dashboard")
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/?error=unauthorized"
    );

    // the session cookie is cleared alongside the redirect
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("clearing cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{AUTH_COOKIE_NAME}=;")));
    assert!(set_cookie.contains("Max-Age=-1"));
}

#[tokio::test]
async fn test_valid_session_cookie_resolves() {
    let h = harness(|gate| gate);

    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, session_cookie_header(&h.codec, "bob"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "bob");
}

#[tokio::test]
async fn test_cookie_for_deleted_user_falls_through() {
    let h = harness(|gate| gate);

    // valid token, but the user no longer resolves
    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, session_cookie_header(&h.codec, "ghost"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_api_key_is_rejected_not_errored() {
    let h = harness(|gate| gate);

    let request = Request::builder()
        .uri("/dashboard")
        .header(header::AUTHORIZATION, basic_auth_header("no-such-key"))
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_query_key_does_not_authenticate() {
    let h = harness(|gate| gate.with_optional_for(vec!["/assets".to_string()]));

    let request = Request::builder()
        .uri("/assets/logo.svg?api_key=")
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();
    assert_eq!(body_string(response).await, "anonymous");
}
