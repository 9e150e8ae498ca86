//! HTTP server and routing integration tests
//!
//! Drives the full axum router with stub providers and an in-memory
//! database, checking status codes, response shapes and persistence side
//! effects.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use waxid::models::{Candidate, ReleaseMatch, StreamingLink};
use waxid::services::Identifier;
use waxid::types::{CatalogProvider, Lookup, OcrProvider, StreamingProvider};
use waxid::{build_router, AppState};

// ============================================================================
// Stub providers
// ============================================================================

struct StubOcr(Lookup<String>);

#[async_trait::async_trait]
impl OcrProvider for StubOcr {
    async fn extract_text(&self, _image: &[u8]) -> Lookup<String> {
        self.0.clone()
    }
}

struct StubCatalog {
    release: Lookup<ReleaseMatch>,
    by_id: Lookup<ReleaseMatch>,
    candidates: Vec<Candidate>,
}

impl Default for StubCatalog {
    fn default() -> Self {
        Self {
            release: Lookup::Miss,
            by_id: Lookup::Miss,
            candidates: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn find_release(&self, _query: &str) -> Lookup<ReleaseMatch> {
        self.release.clone()
    }

    async fn release_by_id(&self, _id: u64) -> Lookup<ReleaseMatch> {
        self.by_id.clone()
    }

    async fn find_candidates(&self, _query: &str) -> Vec<Candidate> {
        self.candidates.clone()
    }
}

struct StubStreaming(Lookup<StreamingLink>);

#[async_trait::async_trait]
impl StreamingProvider for StubStreaming {
    async fn find_album(&self, _artist: &str, _album_title: &str) -> Lookup<StreamingLink> {
        self.0.clone()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn walls_release() -> ReleaseMatch {
    ReleaseMatch {
        artist: "Apparat".to_string(),
        title: "Walls".to_string(),
        year: "2007".to_string(),
        label: "Shitkatapult".to_string(),
        genres: vec!["Electronic".to_string()],
        tracklist: vec!["Not A Number".to_string(), "Hailin From The Edge".to_string()],
        url: "https://www.discogs.com/release/1014903".to_string(),
        cover: Some("https://img.discogs.com/walls.jpg".to_string()),
        id: 1014903,
    }
}

async fn test_app_state(catalog: StubCatalog) -> AppState {
    let db_pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    waxid::db::init_tables(&db_pool).await.unwrap();

    let identifier = Arc::new(Identifier::new(
        Arc::new(StubOcr(Lookup::Miss)),
        Arc::new(catalog),
        Arc::new(StubStreaming(Lookup::Miss)),
    ));

    AppState::new(db_pool, identifier)
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn banner_route_responds() {
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_module_and_version() {
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "waxid");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn library_starts_empty() {
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/library")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn search_manual_miss_responds_404_with_message() {
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let response = app
        .oneshot(json_post("/search-manual", r#"{"query":"does not exist"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(
        json["error"]["message"],
        "Release not found in catalog for this text"
    );
}

#[tokio::test]
async fn search_manual_success_persists_and_returns_record() {
    let catalog = StubCatalog {
        release: Lookup::Hit(walls_release()),
        ..Default::default()
    };
    let state = test_app_state(catalog).await;
    let app = build_router(state.clone());

    let response = app
        .oneshot(json_post("/search-manual", r#"{"query":"Apparat Walls"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["display"]["artist"], "Apparat");
    assert!(json["display"]["original_photo"].is_null());

    // Persisted into the library.
    let albums = waxid::db::albums::list_albums(&state.db).await.unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].title, "Walls");
    assert_eq!(albums[0].discogs_url, "https://www.discogs.com/release/1014903");
}

#[tokio::test]
async fn add_by_id_fault_surfaces_message_as_404() {
    let catalog = StubCatalog {
        by_id: Lookup::Fault("Release 42 not found in catalog".to_string()),
        ..Default::default()
    };
    let state = test_app_state(catalog).await;
    let app = build_router(state);

    let response = app
        .oneshot(json_post("/add-by-id", r#"{"discogs_id":42}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Release 42 not found in catalog");
}

#[tokio::test]
async fn search_candidates_returns_list() {
    let catalog = StubCatalog {
        candidates: vec![Candidate {
            discogs_id: 7,
            title: "Apparat - Walls".to_string(),
            artist: "Apparat".to_string(),
            year: "2007".to_string(),
            label: "Shitkatapult".to_string(),
            thumb: String::new(),
        }],
        ..Default::default()
    };
    let state = test_app_state(catalog).await;
    let app = build_router(state);

    let response = app
        .oneshot(json_post("/search-candidates", r#"{"query":"Apparat"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["discogs_id"], 7);
    assert_eq!(json[0]["title"], "Apparat - Walls");
}

#[tokio::test]
async fn search_candidates_degrades_to_empty_list() {
    // Provider degrade-to-empty shows up as 200 [] at the boundary.
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let response = app
        .oneshot(json_post("/search-candidates", r#"{"query":"anything"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn scan_rejects_empty_upload() {
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let boundary = "test-boundary-7d93a1";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"empty.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n\r\n--{b}--\r\n",
        b = boundary
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn scan_unreadable_photo_responds_404() {
    // OCR stub always misses, so any non-empty upload is unreadable.
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let boundary = "test-boundary-1f40c2";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sleeve.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nnot-really-a-jpeg\r\n--{b}--\r\n",
        b = boundary
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Unreadable text on photo");
}

#[tokio::test]
async fn scan_accepts_phone_sized_photo() {
    // A 3 MB upload must reach the pipeline instead of being rejected by
    // the transport's body limit; the stub OCR then misses, so the
    // expected outcome is the unreadable-photo 404.
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let boundary = "test-boundary-9ab310";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sleeve.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
        b = boundary
    )
    .into_bytes();
    body.extend(std::iter::repeat(0xa5u8).take(3 * 1024 * 1024));
    body.extend(format!("\r\n--{}--\r\n", boundary).into_bytes());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Unreadable text on photo");
}

#[tokio::test]
async fn scan_picks_file_field_over_leading_form_fields() {
    // An unrelated leading field must not shadow the photo.
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let boundary = "test-boundary-44e7d8";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nshelf 3\r\n--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sleeve.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nnot-really-a-jpeg\r\n--{b}--\r\n",
        b = boundary
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    // The photo reached the pipeline (stub OCR misses), so this is the
    // unreadable outcome rather than an empty-upload rejection.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Unreadable text on photo");
}

#[tokio::test]
async fn scan_without_file_field_responds_400() {
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let boundary = "test-boundary-c201fe";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nno photo here\r\n--{b}--\r\n",
        b = boundary
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scan")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Missing file upload");
}

#[tokio::test]
async fn delete_missing_album_responds_404() {
    let state = test_app_state(StubCatalog::default()).await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/album/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_existing_album_removes_it() {
    let catalog = StubCatalog {
        release: Lookup::Hit(walls_release()),
        ..Default::default()
    };
    let state = test_app_state(catalog).await;
    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(json_post("/search-manual", r#"{"query":"Apparat Walls"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let albums = waxid::db::albums::list_albums(&state.db).await.unwrap();
    assert_eq!(albums.len(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/album/{}", albums[0].id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(waxid::db::albums::list_albums(&state.db)
        .await
        .unwrap()
        .is_empty());
}
