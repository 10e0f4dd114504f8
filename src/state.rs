//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::AppConfig;
use crate::dispatch::{HttpMailRelay, MailRelay};
use crate::wizard::RegistrationSession;

#[derive(Clone)]
pub struct AppState {
    /// The single in-memory session. Never lock across an await.
    pub session: Arc<Mutex<RegistrationSession>>,
    pub relay: Arc<dyn MailRelay>,
    pub config: AppConfig,
}

impl AppState {
    /// State wired to the HTTP mail relay named in the config.
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent("guest-registration-server/1.0")
            .build()?;

        log::info!("Mail relay endpoint: {}", config.dispatch_url);
        let relay = Arc::new(HttpMailRelay::new(http_client, config.dispatch_url.clone()));
        Ok(Self::with_relay(config, relay))
    }

    pub fn with_relay(config: AppConfig, relay: Arc<dyn MailRelay>) -> Self {
        Self {
            session: Arc::new(Mutex::new(RegistrationSession::new())),
            relay,
            config,
        }
    }
}
