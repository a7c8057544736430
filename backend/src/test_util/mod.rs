use std::sync::Arc;

use crate::auth::hash_password;
use crate::config::{Config, DatabaseConfig, LoggingConfig, ServerConfig, SessionConfig};
use crate::models::user::User;
use crate::AppState;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        session: SessionConfig {
            secret: "test-session-secret".to_string(),
            ttl_hours: 1,
            secure_cookie: false,
        },
    }
}

pub fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(test_config()).expect("Failed to open in-memory store"))
}

/// Create a user with a real Argon2 hash of `password`.
pub fn create_test_user(state: &AppState, username: &str, password: &str) -> User {
    let hash = hash_password(password).expect("Failed to hash password");
    state.store.create_user(username, &hash).expect("Failed to create user")
}

/// `Cookie` header value carrying a valid session for `user`.
pub fn session_cookie_header(state: &AppState, user: &User) -> String {
    let token = state.sessions.issue(user).expect("Failed to issue session");
    format!("{}={}", crate::auth::SESSION_COOKIE, token)
}
