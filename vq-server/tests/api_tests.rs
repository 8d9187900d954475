//! Integration tests for the vq-server HTTP API
//!
//! Every test runs the real router against an in-memory database via
//! tower's `oneshot`, so routing, extractors, and handlers are all
//! exercised without a listening socket.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot`

use vq_common::db::init_memory_database;
use vq_server::sheets::HttpSheetClient;
use vq_server::{build_router, AppState};

async fn setup_app() -> (axum::Router, SqlitePool) {
    let db = init_memory_database().await.expect("in-memory db");
    let sheets = HttpSheetClient::new().expect("http client");
    let state = AppState::new(db.clone(), sheets, None);
    (build_router(state), db)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

async fn seed_song(db: &SqlitePool, title: &str, artist: &str, genre: &str) -> Value {
    let song = vq_common::db::songs::create_song(
        db,
        &vq_common::db::models::NewSong {
            title: title.to_string(),
            artist: artist.to_string(),
            genre: Some(genre.to_string()),
            is_available: true,
        },
    )
    .await
    .expect("seed song");
    serde_json::to_value(song).unwrap()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_module_and_version() {
    let (app, _db) = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "vq-server");
}

// ---------------------------------------------------------------------------
// Songs and genres
// ---------------------------------------------------------------------------

#[tokio::test]
async fn songs_list_filters_by_search_and_genre() {
    let (app, db) = setup_app().await;
    seed_song(&db, "Billie Jean", "Michael Jackson", "Disco").await;
    seed_song(&db, "Enter Sandman", "Metallica", "Rock").await;

    let response = app
        .clone()
        .oneshot(get("/api/songs?search=billie"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Billie Jean");

    let response = app
        .clone()
        .oneshot(get("/api/songs?genres=Rock"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["genre"], "Rock");

    let response = app.oneshot(get("/api/genres")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!(["Disco", "Rock"]));
}

#[tokio::test]
async fn custom_song_is_created_unavailable() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({ "title": "My Song", "artist": "Me", "isAvailable": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["isAvailable"], false);

    // Unavailable songs do not show up in browsing
    let response = app.oneshot(get("/api/songs")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({ "title": "  ", "artist": "Me" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_song_is_404() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(get(
            "/api/songs/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Song not found");
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_lifecycle_through_the_api() {
    let (app, db) = setup_app().await;
    let song = seed_song(&db, "Song A", "Artist", "Rock").await;
    let song_id = song["id"].as_str().unwrap();

    // Submit
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/requests",
            json!({ "songId": song_id, "requesterUsername": "alice" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = extract_json(response.into_body()).await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["song"]["title"], "Song A");
    let request_id = created["id"].as_str().unwrap().to_string();

    // Duplicate probe sees it
    let response = app
        .clone()
        .oneshot(get(&format!("/api/requests/check-duplicate/{}", song_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["isDuplicate"], true);

    // Default listing is the live queue
    let response = app.clone().oneshot(get("/api/requests")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Advance to played
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/requests/{}", request_id),
            json!({ "status": "played" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/requests/played?limit=5"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Clear history
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/requests/played")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);

    let response = app.oneshot(get("/api/requests/played")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn positions_endpoint_reorders_the_queue() {
    let (app, db) = setup_app().await;
    let song_a = seed_song(&db, "Song A", "Artist", "Rock").await;
    let song_b = seed_song(&db, "Song B", "Artist", "Rock").await;

    let mut ids = Vec::new();
    for song in [&song_a, &song_b] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/requests",
                json!({ "songId": song["id"], "requesterUsername": "alice" }),
            ))
            .await
            .unwrap();
        let created = extract_json(response.into_body()).await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/requests/positions",
            json!({ "positions": [
                { "id": ids[0], "position": 2 },
                { "id": ids[1], "position": 1 },
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/requests")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["song"]["title"], "Song B");
    assert_eq!(body[1]["song"]["title"], "Song A");
}

#[tokio::test]
async fn bad_status_filter_is_rejected() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(get("/api/requests?status=pending,bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn public_settings_never_include_the_pin() {
    let (app, _db) = setup_app().await;

    let response = app.oneshot(get("/api/settings")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    assert!(body.get("dj_pin").is_none());
    assert_eq!(body["event_name"], "VQ");
}

#[tokio::test]
async fn verify_pin_answers_without_leaking() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/verify-pin", json!({ "pin": "1234" })))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["valid"], true);

    let response = app
        .oneshot(json_request("POST", "/api/verify-pin", json!({ "pin": "9999" })))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn update_settings_enforces_pin_allowlist_and_pin_shape() {
    let (app, db) = setup_app().await;

    // Wrong PIN
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/update-settings",
            json!({ "pin": "0000", "key": "event_name", "value": "Party" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Key outside the allowlist
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/update-settings",
            json!({ "pin": "1234", "key": "secret_flag", "value": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed new PIN
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/update-settings",
            json!({ "pin": "1234", "key": "dj_pin", "value": "12ab" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid write lands
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/update-settings",
            json!({ "pin": "1234", "key": "event_name", "value": "Party" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored: Option<String> = vq_common::db::settings::get_setting(&db, "event_name")
        .await
        .unwrap();
    assert_eq!(stored.as_deref(), Some("Party"));
}

// ---------------------------------------------------------------------------
// Sync endpoint (paths that fail before any network traffic)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_rejects_wrong_pin() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/sync-google-sheets",
            json!({ "pin": "0000" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Invalid DJ PIN");
}

#[tokio::test]
async fn sync_requires_a_configured_url() {
    let (app, _db) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/sync-google-sheets",
            json!({ "pin": "1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["error"],
        "Google Sheet URL not configured. Add it in DJ Settings."
    );
}

// ---------------------------------------------------------------------------
// Recognition / lyrics without a configured token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recognition_endpoints_report_unavailable_without_token() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/recognize-song",
            json!({ "audioData": "UklGRg==" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/get-lyrics",
            json!({ "title": "Song", "artist": "Artist" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
