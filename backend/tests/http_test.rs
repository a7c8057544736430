use std::sync::Arc;

use axum::body::Body;
use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use tower::ServiceExt;
use worklocation_backend::models::user::User;
use worklocation_backend::test_util::{create_test_state, create_test_user, session_cookie_header};
use worklocation_backend::{routes, AppState};
use worklocation_common::{get_week_dates, Location};

struct TestResponse {
    status: StatusCode,
    headers: http::HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

async fn send(
    state: &Arc<AppState>,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if form.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    }
    let request = builder
        .body(form.map(|f| Body::from(f.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = routes::app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse { status, headers, body }
}

fn logged_in() -> (Arc<AppState>, User, String) {
    let state = create_test_state();
    let user = create_test_user(&state, "alice", "pa55word");
    let cookie = session_cookie_header(&state, &user);
    (state, user, cookie)
}

const WEEK_1_FORM: &str = "year=2024&week=1\
    &loc_2024-01-01=Office\
    &loc_2024-01-02=Homeoffice\
    &loc_2024-01-03=Customer\
    &loc_2024-01-04=Spaceship\
    &loc_2024-01-05=";

#[tokio::test]
async fn test_health() {
    let state = create_test_state();
    let response = send(&state, Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn test_week_view_requires_login() {
    let state = create_test_state();
    let response = send(&state, Method::GET, "/", None, None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/login"));
}

#[tokio::test]
async fn test_tampered_session_is_rejected() {
    let (state, _, cookie) = logged_in();
    let tampered = format!("{}x", cookie);
    let response = send(&state, Method::GET, "/", Some(&tampered), None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/login"));
}

#[tokio::test]
async fn test_save_and_download_require_login() {
    let state = create_test_state();
    for uri in ["/save", "/download"] {
        let response = send(&state, Method::POST, uri, None, Some(WEEK_1_FORM)).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), Some("/login"));
    }
}

#[tokio::test]
async fn test_login_page() {
    let state = create_test_state();
    let response = send(&state, Method::GET, "/login", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("name=\"password\""));
}

#[tokio::test]
async fn test_login_page_redirects_when_logged_in() {
    let (state, _, cookie) = logged_in();
    let response = send(&state, Method::GET, "/login", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/"));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (state, _, _) = logged_in();
    let response = send(
        &state,
        Method::POST,
        "/login",
        None,
        Some("username=alice&password=nope"),
    ).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.header(header::SET_COOKIE).is_none());
    assert!(response.text().contains("Benutzername oder Passwort ist falsch."));
}

#[tokio::test]
async fn test_login_with_unknown_user() {
    let state = create_test_state();
    let response = send(
        &state,
        Method::POST,
        "/login",
        None,
        Some("username=mallory&password=x"),
    ).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_working_session_cookie() {
    let (state, _, _) = logged_in();
    let response = send(
        &state,
        Method::POST,
        "/login",
        None,
        Some("username=alice&password=pa55word"),
    ).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/"));

    let set_cookie = response.header(header::SET_COOKIE).unwrap();
    assert!(set_cookie.starts_with("workloc_session="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap();

    let response = send(&state, Method::GET, "/?year=2024&week=1", Some(cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("loc_2024-01-01"));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (state, _, cookie) = logged_in();
    let response = send(&state, Method::GET, "/logout", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/login"));
    assert!(response.header(header::SET_COOKIE).unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_week_view_clamps_week() {
    let (state, _, cookie) = logged_in();
    let response = send(&state, Method::GET, "/?year=2024&week=60", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let html = response.text();
    assert!(html.contains("KW 52/2024"));
    assert!(html.contains("loc_2024-12-23"));
    assert!(html.contains("loc_2024-12-29"));
}

#[tokio::test]
async fn test_week_view_falls_back_on_garbage_query() {
    let (state, _, cookie) = logged_in();
    let response = send(&state, Method::GET, "/?year=abc&week=xyz", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("<h1>Arbeitsorte KW"));
}

#[tokio::test]
async fn test_save_rejects_invalid_calendar() {
    let (state, _, cookie) = logged_in();
    for form in ["week=1", "year=2024", "year=abc&week=1", "year=2024&week=", "year=0&week=1"] {
        let response = send(&state, Method::POST, "/save", Some(&cookie), Some(form)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "form: {}", form);
        assert_eq!(response.text(), "Ungültige Kalenderangabe.");
    }
}

#[tokio::test]
async fn test_save_persists_and_redirects() {
    let (state, user, cookie) = logged_in();
    let response = send(&state, Method::POST, "/save", Some(&cookie), Some(WEEK_1_FORM)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/?year=2024&week=1&saved=1"));

    let week = get_week_dates(2024, 1).unwrap();
    let selections = state.store.selections_for_week(user.id, &week).unwrap();
    assert_eq!(
        selections,
        [
            Some(Location::Office),
            Some(Location::Homeoffice),
            Some(Location::Customer),
            None,
            None,
            None,
            None,
        ]
    );

    let response = send(&state, Method::GET, "/?year=2024&week=1&saved=1", Some(&cookie), None).await;
    let html = response.text();
    assert!(html.contains("Gespeichert."));
    assert!(html.contains("<option value=\"Homeoffice\" selected>"));
}

#[tokio::test]
async fn test_save_twice_updates_in_place() {
    let (state, user, cookie) = logged_in();
    send(&state, Method::POST, "/save", Some(&cookie), Some(WEEK_1_FORM)).await;
    let response = send(
        &state,
        Method::POST,
        "/save",
        Some(&cookie),
        Some("year=2024&week=1&loc_2024-01-01=Customer&loc_2024-01-02=Homeoffice"),
    ).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let week = get_week_dates(2024, 1).unwrap();
    let rows = state.store.selection_rows_for_week(user.id, &week).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].location, Location::Customer);
    assert_eq!(rows[1].location, Location::Homeoffice);
}

#[tokio::test]
async fn test_save_clamps_week_in_redirect() {
    let (state, _, cookie) = logged_in();
    let response = send(&state, Method::POST, "/save", Some(&cookie), Some("year=2024&week=99")).await;
    assert_eq!(response.header(header::LOCATION), Some("/?year=2024&week=52&saved=1"));
}

#[tokio::test]
async fn test_download_persists_and_returns_workbook() {
    let (state, user, cookie) = logged_in();
    let response = send(&state, Method::POST, "/download", Some(&cookie), Some(WEEK_1_FORM)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    );
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"Arbeitsorte_alice_J2024_KW01.xlsx\"")
    );
    assert_eq!(&response.body[..2], b"PK");

    let week = get_week_dates(2024, 1).unwrap();
    let selections = state.store.selections_for_week(user.id, &week).unwrap();
    assert_eq!(selections[0], Some(Location::Office));
}

#[tokio::test]
async fn test_download_rejects_invalid_calendar() {
    let (state, _, cookie) = logged_in();
    let response = send(&state, Method::POST, "/download", Some(&cookie), Some("year=x&week=1")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quoted_session_cookie_is_accepted() {
    let (state, user, _) = logged_in();
    let token = state.sessions.issue(&user).unwrap();
    let cookie = format!("workloc_session=\"{}\"", token);
    let response = send(&state, Method::GET, "/?year=2024&week=1", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_of_deleted_user_redirects_to_login() {
    let (state, _, cookie) = logged_in();
    state.store.delete_user("alice").unwrap();

    let response = send(&state, Method::GET, "/", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/login"));
}

#[tokio::test]
async fn test_save_clamps_huge_week() {
    let (state, _, cookie) = logged_in();
    let response = send(
        &state,
        Method::POST,
        "/save",
        Some(&cookie),
        Some("year=2024&week=99999999999999999999"),
    ).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header(header::LOCATION), Some("/?year=2024&week=52&saved=1"));
}

#[tokio::test]
async fn test_week_view_tolerates_repeated_query_keys() {
    let (state, _, cookie) = logged_in();
    let response = send(&state, Method::GET, "/?year=2024&week=1&week=2", Some(&cookie), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("<h1>Arbeitsorte KW"));
}

#[tokio::test]
async fn test_last_week_of_max_year_round_trips() {
    let (state, _, cookie) = logged_in();
    let form = "year=9999&week=52&loc_9999-12-27=Office&loc_%2B10000-01-02=Customer";
    let response = send(&state, Method::POST, "/save", Some(&cookie), Some(form)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let response = send(&state, Method::GET, "/?year=9999&week=52", Some(&cookie), None).await;
    let html = response.text();
    assert!(html.contains("<option value=\"Office\" selected>"));
    assert!(html.contains("<option value=\"Customer\" selected>"));
}
