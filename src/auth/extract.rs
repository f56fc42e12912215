//! Credential extraction from inbound requests.
//!
//! Three sources, inspected by the middleware in fixed order: the session
//! cookie, the `Authorization` header and the `api_key` query parameter.
//! Extraction failures are typed but never escalated; a failed source just
//! hands over to the next one.

use axum::http::{HeaderMap, Uri, header};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use cookie::Cookie;

/// Query parameter carrying an API key.
pub const QUERY_API_KEY: &str = "api_key";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no credential present")]
    NoCredential,
    #[error("malformed credential")]
    Malformed,
}

/// Pull the API key out of an `Authorization` header of the form
/// `Basic <token>` or `Bearer <token>`, where `<token>` is the key in
/// standard base64. The decoded key is whitespace-trimmed (clients love
/// to base64-encode a trailing newline).
pub fn bearer_api_key(headers: &HeaderMap) -> Result<String, ExtractError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ExtractError::NoCredential)?;

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || (parts[0] != "Basic" && parts[0] != "Bearer") {
        return Err(ExtractError::Malformed);
    }

    let decoded = BASE64.decode(parts[1]).map_err(|_| ExtractError::Malformed)?;
    let key = String::from_utf8(decoded).map_err(|_| ExtractError::Malformed)?;
    Ok(key.trim().to_string())
}

/// Value of the named cookie, if any `Cookie` header carries it.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header_value in headers.get_all(header::COOKIE) {
        let Ok(raw) = header_value.to_str() else {
            continue;
        };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == name {
                return Some(cookie.value().to_string());
            }
        }
    }
    None
}

/// Trimmed value of the `api_key` query parameter; `None` when absent or
/// empty after trimming.
pub fn query_api_key(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    let (_, value) = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == QUERY_API_KEY)?;

    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
