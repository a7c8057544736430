//! Local login: password hashing and signed session cookies.

pub mod password;
pub mod session;

pub use password::{hash_password, verify_login, verify_password};
pub use session::{CurrentUser, SessionClaims, SessionManager, SESSION_COOKIE};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Invalid password hash: {0}")]
    MalformedHash(String),
    #[error("Invalid session token: {0}")]
    InvalidToken(String),
    #[error("Failed to issue session token: {0}")]
    TokenIssue(String),
    #[error("Password check did not complete: {0}")]
    Interrupted(String),
}
