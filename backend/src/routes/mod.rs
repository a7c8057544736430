pub mod health;
pub mod login;
pub mod week;

use std::sync::Arc;
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::logging::request_logger;
use crate::AppState;

/// Build the complete application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(login::router(state.clone()))
        .merge(week::router(state))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
}
