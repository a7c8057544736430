//! Error types for the HTTP layer.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use worklocation_common::CalendarError;

use crate::auth::AuthError;
use crate::export::ExportError;
use crate::store::StoreError;

/// Message returned for missing or malformed `year`/`week` input.
pub const INVALID_CALENDAR_MESSAGE: &str = "Ungültige Kalenderangabe.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid calendar input")]
    InvalidCalendar,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<CalendarError> for Error {
    fn from(_: CalendarError) -> Self {
        Error::InvalidCalendar
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::InvalidCalendar => (StatusCode::BAD_REQUEST, INVALID_CALENDAR_MESSAGE),
            Error::Store(_) | Error::Auth(_) | Error::Export(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Interner Fehler.")
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        ).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
