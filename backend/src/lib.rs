pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod routes;
pub mod store;
pub mod test_util;
pub mod views;

pub use auth::{CurrentUser, SessionManager};
pub use config::Config;
pub use error::Error;
pub use store::{Store, StoreError};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Users and work selections.
    pub store: Store,
    /// Session token issuing and verification.
    pub sessions: SessionManager,
}

impl AppState {
    /// Open the configured database and set up session handling.
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let store = Store::open(&config.database.url)?;
        let sessions = SessionManager::new(&config.session);
        Ok(Self {
            config,
            store,
            sessions,
        })
    }
}
