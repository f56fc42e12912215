use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{
    validate_email, validate_password, validate_timezone, validate_username,
};

/// Name of the browser session cookie.
pub const AUTH_COOKIE_NAME: &str = "gatekeeper_auth";

/// A user identity as persisted in the credential store.
///
/// `id` doubles as the natural key chosen at signup (the username) and is
/// what the session cookie carries. `api_key` is the long-lived programmatic
/// credential; it is regenerated, never reused, on reset. Secrets are never
/// serialized into responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: String,
    pub api_key: String,
    pub email: String,
    /// Timezone/location string, e.g. "Europe/Berlin"
    pub location: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub is_admin: bool,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub reset_token: String,
    pub created_at: DateTime<Utc>,
    pub last_logged_in_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_repeat: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub email: String,
    pub location: String,
}

/// Request to set a new password using a one-time reset token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
    pub password_repeat: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsReset {
    pub password_old: String,
    pub password_new: String,
    pub password_repeat: String,
}

impl Signup {
    pub fn is_valid(&self) -> bool {
        validate_username(&self.username)
            && validate_email(&self.email)
            && validate_password(&self.password)
            && self.password == self.password_repeat
            && validate_timezone(&self.location)
    }
}

impl UserUpdate {
    pub fn is_valid(&self) -> bool {
        validate_email(&self.email) && validate_timezone(&self.location)
    }
}

impl SetPasswordRequest {
    pub fn is_valid(&self) -> bool {
        validate_password(&self.password) && self.password == self.password_repeat
    }
}

impl CredentialsReset {
    pub fn is_valid(&self) -> bool {
        validate_password(&self.password_new) && self.password_new == self.password_repeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> Signup {
        Signup {
            username: "alice".to_string(),
            email: "alice@example.org".to_string(),
            password: "hunter22".to_string(),
            password_repeat: "hunter22".to_string(),
            location: "Europe/Berlin".to_string(),
        }
    }

    #[test]
    fn test_signup_valid() {
        assert!(valid_signup().is_valid());
    }

    #[test]
    fn test_signup_password_mismatch() {
        let mut signup = valid_signup();
        signup.password_repeat = "different".to_string();
        assert!(!signup.is_valid());
    }

    #[test]
    fn test_signup_reserved_username() {
        let mut signup = valid_signup();
        signup.username = "current".to_string();
        assert!(!signup.is_valid());
    }

    #[test]
    fn test_user_serialization_hides_secrets() {
        let user = User {
            id: "alice".to_string(),
            api_key: "key".to_string(),
            email: "alice@example.org".to_string(),
            location: String::new(),
            password: "$argon2id$secret".to_string(),
            is_admin: true,
            reset_token: "token".to_string(),
            created_at: chrono::Utc::now(),
            last_logged_in_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("reset_token"));
        assert!(!json.contains("is_admin"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn test_set_password_request_too_short() {
        let req = SetPasswordRequest {
            token: "t".to_string(),
            password: "short".to_string(),
            password_repeat: "short".to_string(),
        };
        assert!(!req.is_valid());
    }
}
