use cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::users::models::AUTH_COOKIE_NAME;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub server: ServerConfig,
    pub db: DbConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible base URL, used in password-reset links
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Security knobs: the password pepper, cookie attributes and signup switch.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecurityConfig {
    /// Server-wide secret mixed into passwords before hashing.
    /// Distinct from the per-password salt argon2 generates itself.
    #[serde(default)]
    pub password_pepper: String,
    /// Disables the `Secure` cookie attribute for local development over plain HTTP
    #[serde(default)]
    pub insecure_cookies: bool,
    #[serde(default = "default_cookie_max_age")]
    pub cookie_max_age_sec: i64,
    #[serde(default = "default_allow_signup")]
    pub allow_signup: bool,
}

fn default_cookie_max_age() -> i64 {
    172_800 // two days
}

fn default_allow_signup() -> bool {
    true
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password_pepper: String::new(),
            insecure_cookies: false,
            cookie_max_age_sec: default_cookie_max_age(),
            allow_signup: default_allow_signup(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Lifespan of a cached identity snapshot
    pub user_ttl_sec: u64,
    /// How often the janitor task evicts expired entries
    pub janitor_interval_sec: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_ttl_sec: 3600,
            janitor_interval_sec: 7200,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub http: HttpMailConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HttpMailConfig {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }

    /// Build the authentication cookie carrying an encoded session token.
    ///
    /// `HttpOnly` is always set; `Secure` unless `insecure_cookies` is
    /// enabled for local development; same-site strict.
    pub fn auth_cookie(&self, value: impl Into<String>) -> Cookie<'static> {
        self.build_cookie(value.into(), self.security.cookie_max_age_sec)
    }

    /// A cookie that removes the session: empty value, negative max-age.
    pub fn clear_auth_cookie(&self) -> Cookie<'static> {
        self.build_cookie(String::new(), -1)
    }

    fn build_cookie(&self, value: String, max_age_sec: i64) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE_NAME, value))
            .path("/")
            .max_age(CookieDuration::seconds(max_age_sec))
            .secure(!self.security.insecure_cookies)
            .http_only(true)
            .same_site(SameSite::Strict)
            .build()
    }
}
