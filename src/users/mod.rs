//! User identities: model, credential store access, TTL cache and the
//! resolver service in front of both.

pub mod cache;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod validation;

pub use cache::UserCache;
pub use models::{AUTH_COOKIE_NAME, Login, Signup, User};
pub use repository::UserRepository;
pub use service::{IdentityResolver, ServiceError, UserService};
