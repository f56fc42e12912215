//! Gatekeeper entry point.
//!
//! Startup order matters: config first, then logging, then the credential
//! store, then the services that get injected into the router. Everything
//! is constructed exactly once here and handed down; no component reaches
//! for globals.

use std::sync::Arc;

use gatekeeper::config::AppConfig;
use gatekeeper::db::Database;
use gatekeeper::events::{EventBus, UserEvent};
use gatekeeper::gateway;
use gatekeeper::gateway::state::AppState;
use gatekeeper::logging::init_logging;
use gatekeeper::mail::MailSender;
use gatekeeper::session::SessionCodec;
use gatekeeper::users::{UserRepository, UserService};

fn get_env() -> String {
    std::env::var("GATEKEEPER_ENV").unwrap_or_else(|_| "dev".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = Arc::new(AppConfig::load(&env));
    let _log_guard = init_logging(&config);

    tracing::info!(
        "starting gatekeeper {} ({}) env={}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env
    );
    if config.security.password_pepper.is_empty() {
        tracing::warn!("security.password_pepper is empty; password hashes are unpeppered");
    }

    let db = Arc::new(Database::connect(&config.db.url, config.db.max_connections).await?);

    let events = Arc::new(EventBus::new());
    spawn_change_logger(&events);

    let repository = UserRepository::new(db.pool().clone());
    let users = Arc::new(UserService::new(&config, repository, events.clone()));
    let _janitor = users.spawn_janitor();

    // session keys live and die with the process; a restart logs everyone out
    let codec = Arc::new(SessionCodec::new());
    let mail = Arc::new(MailSender::from_config(&config));

    let state = AppState::new(config, db, users, codec, mail, events);
    gateway::serve(state).await
}

/// Example in-process subscriber; real consumers (statistics aggregation
/// and the like) register the same way at startup.
fn spawn_change_logger(events: &Arc<EventBus>) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(UserEvent::Changed(user)) = rx.recv().await {
            tracing::debug!("identity changed: '{}'", user.id);
        }
    });
}
