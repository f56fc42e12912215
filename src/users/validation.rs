//! Input validation for signup and profile updates.
//!
//! Plain predicate helpers; the DTOs in [`models`](super::models) compose
//! them into `is_valid()` checks.

use regex::Regex;
use std::sync::OnceLock;

const MAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static MAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn mail_regex() -> &'static Regex {
    MAIL_REGEX.get_or_init(|| Regex::new(MAIL_PATTERN).expect("mail pattern must compile"))
}

/// Usernames double as primary keys, so they must be non-empty and must not
/// collide with the reserved `current` route segment.
pub fn validate_username(username: &str) -> bool {
    !username.trim().is_empty() && username != "current"
}

pub fn validate_password(password: &str) -> bool {
    password.len() >= 6
}

/// Empty is allowed (users without mail get no reset flow, nothing else).
pub fn validate_email(email: &str) -> bool {
    email.is_empty() || mail_regex().is_match(email)
}

/// Syntactic check against the IANA name character set. Empty means "server
/// local time" and is allowed.
pub fn validate_timezone(tz: &str) -> bool {
    tz.is_empty()
        || (tz.len() <= 64
            && tz
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '+' | '-')))
}
