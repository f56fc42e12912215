//! Outbound mail, narrowly scoped to password-reset delivery.
//!
//! The provider is chosen once at startup from configuration and never
//! re-selected: an HTTP mail API when mail is enabled, a logging no-op
//! otherwise.

pub mod http_api;

pub use http_api::HttpSendingService;

use crate::config::AppConfig;
use crate::users::models::User;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("recipient has no email address")]
    NoRecipient,
    #[error("mail provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected the message: status {0}")]
    Rejected(u16),
}

pub enum MailSender {
    Http(HttpSendingService),
    Noop,
}

impl MailSender {
    pub fn from_config(config: &AppConfig) -> Self {
        if config.mail.enabled && !config.mail.http.url.is_empty() {
            Self::Http(HttpSendingService::new(
                config.mail.http.clone(),
                config.mail.sender.clone(),
            ))
        } else {
            Self::Noop
        }
    }

    pub async fn send_password_reset(
        &self,
        recipient: &User,
        reset_link: &str,
    ) -> Result<(), MailError> {
        match self {
            Self::Http(service) => service.send_password_reset(recipient, reset_link).await,
            Self::Noop => {
                tracing::info!(
                    "mail disabled, password reset link for '{}': {}",
                    recipient.id,
                    reset_link
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: "alice".to_string(),
            api_key: "alice-key".to_string(),
            email: email.to_string(),
            location: String::new(),
            password: String::new(),
            is_admin: false,
            reset_token: String::new(),
            created_at: now,
            last_logged_in_at: now,
        }
    }

    #[tokio::test]
    async fn test_noop_sender_always_succeeds() {
        let sender = MailSender::Noop;
        let result = sender
            .send_password_reset(&test_user("alice@example.org"), "http://localhost/reset")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_http_sender_rejects_recipient_without_email() {
        let sender = MailSender::Http(HttpSendingService::new(
            crate::config::HttpMailConfig {
                url: "http://localhost:9/api/mail".to_string(),
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            },
            "noreply@example.org".to_string(),
        ));

        let result = sender
            .send_password_reset(&test_user(""), "http://localhost/reset")
            .await;
        assert!(matches!(result, Err(MailError::NoRecipient)));
    }
}
