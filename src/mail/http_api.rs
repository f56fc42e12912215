//! HTTP mail API provider.
//!
//! Speaks to a transactional mail service over JSON: client id/secret as
//! basic auth, one POST per message.

use serde::Serialize;

use super::MailError;
use crate::config::HttpMailConfig;
use crate::users::models::User;

const SUBJECT_PASSWORD_RESET: &str = "Gatekeeper - Password Reset";

pub struct HttpSendingService {
    client: reqwest::Client,
    config: HttpMailConfig,
    sender: String,
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: String,
}

impl HttpSendingService {
    pub fn new(config: HttpMailConfig, sender: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            sender,
        }
    }

    pub async fn send_password_reset(
        &self,
        recipient: &User,
        reset_link: &str,
    ) -> Result<(), MailError> {
        if recipient.email.is_empty() {
            return Err(MailError::NoRecipient);
        }

        let payload = MailPayload {
            from: &self.sender,
            to: vec![recipient.email.as_str()],
            subject: SUBJECT_PASSWORD_RESET,
            html: password_reset_body(reset_link),
        };

        let response = self
            .client
            .post(&self.config.url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        tracing::debug!("password reset mail queued for '{}'", recipient.id);
        Ok(())
    }
}

fn password_reset_body(reset_link: &str) -> String {
    format!(
        "<p>Hi,</p>\
         <p>somebody requested a password reset for your account. If that was you, \
         follow the link below to set a new password. Otherwise you can ignore this mail.</p>\
         <p><a href=\"{reset_link}\">{reset_link}</a></p>"
    )
}
