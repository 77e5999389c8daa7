use crate::config::{ExportConfig, ExportProfile};
use crate::io::ImageFetcher;
use crate::io::local::HttpImageFetcher;
use crate::notion::NotionApi;
use crate::notion::client::{HttpNotionClient, NOTION_VERSION};
use crate::parser::markdown::blocks_to_markdown;
use crate::services::ExportService;
use crate::tests::integration_export_service::{MockImageFetcher, blog_properties};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const SECRET: &str = "secret_test_token";

// --- Fake Notion API ---
// serves one database, a small content tree and a couple of image files, and keeps a log
// of every request path so tests can check what the client asked for
#[derive(Clone)]
struct FakeNotion {
    requests: Arc<Mutex<Vec<String>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", SECRET))
        .unwrap_or(false);
    let version = headers
        .get("notion-version")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == NOTION_VERSION)
        .unwrap_or(false);
    bearer && version
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "object": "error",
            "status": 401,
            "code": "unauthorized",
            "message": "API token is invalid."
        })),
    )
        .into_response()
}

fn text(content: &str) -> Value {
    json!([{ "type": "text", "plain_text": content, "href": null }])
}

async fn query_handler(
    State(fake): State<FakeNotion>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    fake.requests.lock().unwrap().push(format!("query {}", id));
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!({
        "object": "list",
        "results": [
            { "object": "page", "id": "page-1", "properties": blog_properties(Some("from-api"), "From API", true) }
        ],
        "has_more": true,
        "next_cursor": "ignored-cursor"
    }))
    .into_response()
}

async fn children_handler(
    State(fake): State<FakeNotion>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let cursor = params.get("start_cursor").cloned();
    fake.requests
        .lock()
        .unwrap()
        .push(format!("children {} {}", id, cursor.clone().unwrap_or_default()));
    if !authorized(&headers) {
        return unauthorized();
    }

    let body = match (id.as_str(), cursor.as_deref()) {
        ("page-1", None) => json!({
            "object": "list",
            "results": [
                { "object": "block", "id": "p1", "type": "paragraph", "has_children": false,
                  "paragraph": { "rich_text": text("Fetched over HTTP.") } },
                { "object": "block", "id": "l1", "type": "bulleted_list_item", "has_children": true,
                  "bulleted_list_item": { "rich_text": text("parent") } }
            ],
            "has_more": true,
            "next_cursor": "cursor-2"
        }),
        ("page-1", Some("cursor-2")) => json!({
            "object": "list",
            "results": [
                { "object": "block", "id": "cp1", "type": "child_page", "has_children": true,
                  "child_page": { "title": "Sub page" } },
                { "object": "block", "id": "i1", "type": "image", "has_children": false,
                  "image": { "type": "external", "external": { "url": "https://cdn.example.com/shot.png" }, "caption": [] } }
            ],
            "has_more": false,
            "next_cursor": null
        }),
        ("l1", None) => json!({
            "object": "list",
            "results": [
                { "object": "block", "id": "l2", "type": "bulleted_list_item", "has_children": false,
                  "bulleted_list_item": { "rich_text": text("child") } }
            ],
            "has_more": false,
            "next_cursor": null
        }),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "object": "error", "code": "object_not_found", "message": "Could not find block." })),
            )
                .into_response();
        }
    };

    Json(body).into_response()
}

async fn image_handler(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "pixel.png" => (StatusCode::OK, vec![0x89u8, b'P', b'N', b'G', 1, 2, 3]).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

// starts the fake on a free local port and returns its base url
async fn spawn_fake_notion() -> (String, FakeNotion) {
    let fake = FakeNotion {
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/v1/databases/{id}/query", post(query_handler))
        .route("/v1/blocks/{id}/children", get(children_handler))
        .route("/files/{name}", get(image_handler))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), fake)
}

#[tokio::test]
async fn test_query_database_returns_first_batch() {
    let (base, fake) = spawn_fake_notion().await;
    let client = HttpNotionClient::new(format!("{}/v1/", base), SECRET.to_string());

    let pages = client.query_database("db-1").await.expect("query should succeed");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].id, "page-1");
    // the continuation cursor is never followed
    assert_eq!(fake.requests.lock().unwrap().clone(), vec!["query db-1".to_string()]);
}

#[tokio::test]
async fn test_query_database_surfaces_api_errors() {
    let (base, _fake) = spawn_fake_notion().await;
    let client = HttpNotionClient::new(format!("{}/v1", base), "wrong".to_string());

    let err = client.query_database("db-1").await.unwrap_err();
    let message = format!("{:#}", err);

    assert!(message.contains("401"), "{}", message);
    assert!(message.contains("API token is invalid."), "{}", message);
}

#[tokio::test]
async fn test_query_database_connection_refused() {
    // nothing listens on the discard port
    let client = HttpNotionClient::new("http://127.0.0.1:9/v1".to_string(), SECRET.to_string());
    assert!(client.query_database("db-1").await.is_err());
}

// children are paged through and nested lists are fetched, child pages are not
#[tokio::test]
async fn test_page_blocks_follows_cursor_and_recursion() {
    let (base, fake) = spawn_fake_notion().await;
    let client = HttpNotionClient::new(format!("{}/v1", base), SECRET.to_string());

    let blocks = client.page_blocks("page-1").await.expect("blocks should load");

    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[1].children.len(), 1);
    assert_eq!(
        blocks_to_markdown(&blocks),
        "Fetched over HTTP.\n\n- parent\n  - child\n\n![](https://cdn.example.com/shot.png)"
    );

    let requests = fake.requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            "children page-1 ".to_string(),
            "children page-1 cursor-2".to_string(),
            "children l1 ".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_http_image_fetcher_streams_to_file() {
    let (base, _fake) = spawn_fake_notion().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("pixel.png");
    let fetcher = HttpImageFetcher::new();

    fetcher
        .fetch(&format!("{}/files/pixel.png", base), &dest)
        .await
        .expect("download should succeed");

    assert_eq!(
        std::fs::read(&dest).unwrap(),
        vec![0x89u8, b'P', b'N', b'G', 1, 2, 3]
    );

    let missing = fetcher
        .fetch(&format!("{}/files/missing.png", base), &dir.path().join("missing.png"))
        .await;
    assert!(missing.is_err());
    assert!(!dir.path().join("missing.png").exists());
}

// the whole pipeline against the fake api, with the image host mocked
#[tokio::test]
async fn test_export_against_fake_api() {
    let (base, _fake) = spawn_fake_notion().await;
    let dir = TempDir::new().unwrap();
    let mut config = ExportConfig::for_profile(
        ExportProfile::Assets,
        dir.path(),
        SECRET.to_string(),
        "db-1".to_string(),
    );
    config.api_url = format!("{}/v1", base);
    let config = Arc::new(config);

    let fetcher = MockImageFetcher::new();
    let service = Arc::new(ExportService::new(
        Box::new(HttpNotionClient::from_config(&config)),
        Box::new(fetcher.clone()),
        config.clone(),
    ));

    let report = service.export_all().await.expect("export should run");
    assert_eq!(report.written, 1);

    let written = std::fs::read_to_string(config.posts_dir.join("from-api.md")).unwrap();
    assert!(written.starts_with("---\ntitle: From API\n"));
    assert!(written.ends_with(
        "Fetched over HTTP.\n\n- parent\n  - child\n\n![](../../assets/images/from-api-1.png)"
    ));
    assert_eq!(fetcher.call_count(), 1);
}
