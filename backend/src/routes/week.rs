//! Week view, saving and spreadsheet download.

use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Local;
use worklocation_common::{
    current_iso_week, get_week_dates, iso_last_week, parse_week_number, WeekDates, MAX_YEAR, MIN_YEAR,
};

use crate::auth::CurrentUser;
use crate::error::{Error, Result};
use crate::export::{build_week_workbook, export_filename, XLSX_CONTENT_TYPE};
use crate::models::selection::{selections_from_form, WeekSelections};
use crate::models::user::User;
use crate::views::{self, WeekPage};
use crate::AppState;

/// GET / - Render the selected (or current) week
async fn show_week(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Html<String>> {
    let current = current_iso_week(Local::now().date_naive());

    // Unparsable query values fall back to the current week
    let year = query.get("year")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
        .unwrap_or(current.year);
    let week = query.get("week")
        .and_then(|v| parse_week_number(v))
        .unwrap_or(i64::from(current.week));

    let dates = get_week_dates(year, week)?;
    let selections = state.store.selections_for_week(user.id, &dates)?;

    Ok(Html(views::week_page(&WeekPage {
        username: &user.username,
        week: &dates,
        selections: &selections,
        last_week: iso_last_week(year)?,
        saved: query.get("saved").map(String::as_str) == Some("1"),
    })))
}

/// Parse `year` and `week` from the submitted form.
fn week_from_form(form: &HashMap<String, String>) -> Result<WeekDates> {
    let year = form.get("year")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .ok_or(Error::InvalidCalendar)?;
    let week = form.get("week")
        .and_then(|v| parse_week_number(v))
        .ok_or(Error::InvalidCalendar)?;
    Ok(get_week_dates(year, week)?)
}

/// Validate the form and persist the week for `user`.
fn persist_week(state: &AppState, user: &User, form: &HashMap<String, String>) -> Result<(WeekDates, WeekSelections)> {
    let dates = week_from_form(form)?;
    let selections = selections_from_form(&dates.days, |name| form.get(name).cloned());

    state.store.save_week(user.id, &dates, &selections)?;
    tracing::info!(
        user = %user.username,
        year = dates.year,
        week = dates.week,
        "Saved work locations"
    );

    Ok((dates, selections))
}

/// POST /save - Persist selections and return to the week view
async fn save_week(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect> {
    let (dates, _) = persist_week(&state, &user, &form)?;
    Ok(Redirect::to(&format!("/?year={}&week={}&saved=1", dates.year, dates.week)))
}

/// POST /download - Persist selections and stream the week as xlsx
async fn download_week(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response> {
    let (dates, selections) = persist_week(&state, &user, &form)?;

    let workbook = build_week_workbook(&user.username, &dates, &selections)?;
    let filename = export_filename(&user.username, dates.year, dates.week);

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        workbook,
    ).into_response())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_week))
        .route("/save", post(save_week))
        .route("/download", post(download_week))
        .with_state(state)
}
