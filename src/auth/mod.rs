//! Request authentication: credential extraction, the resolved principal
//! and the middleware orchestrating both.

pub mod extract;
pub mod middleware;
pub mod principal;

pub use middleware::{AuthGate, authenticate};
pub use principal::Principal;

/// Fixed body for unauthenticated requests on mandatory routes. Generic on
/// purpose: it must not leak whether a credential "almost" matched.
pub const ERR_UNAUTHORIZED: &str = "401 unauthorized";
