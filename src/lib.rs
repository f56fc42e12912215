//! Gatekeeper - User Authentication Gateway
//!
//! An HTTP service that resolves user identities from inbound requests:
//! session cookies, API-key headers and query parameters, backed by a
//! TTL identity cache in front of a PostgreSQL credential store.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration and cookie construction
//! - [`db`] - PostgreSQL connection pool
//! - [`session`] - Tamper-evident session token codec
//! - [`users`] - User model, credential store access, cache and resolver
//! - [`auth`] - Credential extraction, principal and middleware
//! - [`events`] - Fire-and-forget identity-change notifications
//! - [`mail`] - Password-reset mail collaborator
//! - [`gateway`] - Router assembly and HTTP server

pub mod auth;
pub mod config;
pub mod db;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod mail;
pub mod session;
pub mod users;

// Convenient re-exports at crate root
pub use auth::{AuthGate, Principal, authenticate};
pub use config::AppConfig;
pub use db::Database;
pub use events::{EventBus, UserEvent};
pub use gateway::state::AppState;
pub use mail::MailSender;
pub use session::{CodecError, SessionCodec};
pub use users::{IdentityResolver, ServiceError, User, UserRepository, UserService};
