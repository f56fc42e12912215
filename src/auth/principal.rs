//! The resolved principal attached to an in-flight request.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};
use std::convert::Infallible;

use super::ERR_UNAUTHORIZED;
use crate::users::models::User;

/// The user identity the middleware resolved for this request. Lives in the
/// request extensions only, so it exists exactly as long as the request.
#[derive(Debug, Clone)]
pub struct Principal(pub User);

impl Principal {
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Principal attached to `parts`, if authentication succeeded.
    pub fn from_parts(parts: &Parts) -> Option<&Principal> {
        parts.extensions.get::<Principal>()
    }
}

/// Rejecting extractor: handlers behind mandatory authentication take
/// `Principal` directly and get a generic 401 if the middleware did not
/// attach one (e.g. the route was mounted without it).
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, ERR_UNAUTHORIZED))
    }
}

/// Optional extractor: handlers on optional-authentication paths take
/// `Option<Principal>` and see `None` when no credential resolved.
impl<S> OptionalFromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned())
    }
}
