use std::sync::Arc;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::{SessionConfig, MAX_SESSION_TTL_HOURS};
use crate::error::Error;
use crate::models::user::User;
use crate::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "workloc_session";

/// JWT claims of a login session.
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    sub: String,
    name: String,
    iat: u64,
    exp: u64,
    jti: String,
}

/// Verified session contents.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClaims {
    pub user_id: i64,
    pub username: String,
}

/// Issues and verifies HS256-signed session tokens.
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::hours(config.ttl_hours.min(MAX_SESSION_TTL_HOURS) as i64),
            secure_cookie: config.secure_cookie,
        }
    }

    /// Create a signed token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            iat: now.timestamp() as u64,
            exp: (now + self.ttl).timestamp() as u64,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    /// Validate signature and expiry of a token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let user_id = data.claims.sub.parse::<i64>()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))?;

        Ok(SessionClaims {
            user_id,
            username: data.claims.name,
        })
    }

    /// Cookie storing `token`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }

    /// Cookie matching the session cookie, for removal from a jar.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }

    /// Session token carried by the request, if any. Quoted values are unquoted.
    pub fn token_from(&self, jar: &CookieJar) -> Option<String> {
        jar.get(SESSION_COOKIE)
            .map(|cookie| cookie.value_trimmed().to_string())
            .filter(|token| !token.is_empty())
    }
}

/// The logged-in user of a request.
///
/// Requests without a valid session are redirected to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let to_login = || Redirect::to("/login").into_response();

        let jar = CookieJar::from_headers(&parts.headers);
        let token = state.sessions.token_from(&jar).ok_or_else(to_login)?;

        let claims = state.sessions.verify(&token).map_err(|e| {
            tracing::debug!("Rejected session: {}", e);
            to_login()
        })?;

        match state.store.find_user_by_id(claims.user_id) {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                tracing::debug!("Session for unknown user {}", claims.user_id);
                Err(to_login())
            }
            Err(e) => Err(Error::from(e).into_response()),
        }
    }
}
