//! Login and logout.

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::auth::{verify_login, AuthError, CurrentUser};
use crate::error::Result;
use crate::views;
use crate::AppState;

const LOGIN_FAILED_MESSAGE: &str = "Benutzername oder Passwort ist falsch.";

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /login
async fn login_page(user: Option<CurrentUser>) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(views::login_page(None, "")).into_response()
}

/// POST /login - Check credentials and start a session
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let username = form.username.trim().to_string();
    let user = state.store.find_user_by_username(&username)?;

    // Argon2 is CPU bound; unknown users are checked against a dummy hash
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let password = form.password;
    let verified = tokio::task::spawn_blocking(move || verify_login(&password, stored_hash.as_deref()))
        .await
        .map_err(|e| AuthError::Interrupted(e.to_string()))?;

    let authenticated = verified.unwrap_or_else(|e| {
        tracing::error!("Password check for {} failed: {}", username, e);
        false
    });

    let user = match user {
        Some(user) if authenticated => user,
        _ => {
            tracing::warn!("Failed login for user: {}", username);
            return Ok((
                StatusCode::UNAUTHORIZED,
                Html(views::login_page(Some(LOGIN_FAILED_MESSAGE), &username)),
            ).into_response());
        }
    };

    let token = state.sessions.issue(&user)?;
    tracing::info!("User logged in: {}", user.username);

    Ok((jar.add(state.sessions.session_cookie(token)), Redirect::to("/")).into_response())
}

/// GET /logout - Clear the session cookie
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    (jar.remove(state.sessions.removal_cookie()), Redirect::to("/login")).into_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .with_state(state)
}
