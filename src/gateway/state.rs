use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::events::EventBus;
use crate::mail::MailSender;
use crate::session::SessionCodec;
use crate::users::UserService;

/// Shared application state.
///
/// Every collaborator is constructed once at startup and injected here;
/// components hold only the references they were given, no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<Database>,
    pub users: Arc<UserService>,
    pub codec: Arc<SessionCodec>,
    pub mail: Arc<MailSender>,
    pub events: Arc<EventBus>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        db: Arc<Database>,
        users: Arc<UserService>,
        codec: Arc<SessionCodec>,
        mail: Arc<MailSender>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            db,
            users,
            codec,
            mail,
            events,
        }
    }
}
