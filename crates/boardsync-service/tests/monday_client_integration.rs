//! Integration tests for MondayService against an in-process fake GraphQL API.
//!
//! Each test spawns an axum server on 127.0.0.1:0 that answers the handful of
//! queries the client issues, then exercises the client through the full
//! request/response cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use boardsync_core::{Attachment, SyncError};
use boardsync_service::{BoardService, MondayConfig, MondayService};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "test-token";

#[derive(Default)]
struct FakeApi {
    mutations: Mutex<Vec<Value>>,
    rate_limited: bool,
    requests: Mutex<u32>,
}

fn item(id: &str, status: &str, email: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Load {id}"),
        "created_at": "2026-10-16T08:00:00Z",
        "updated_at": "2026-10-16T09:00:00Z",
        "group": {"id": "grp_west", "title": "New Tender (West)"},
        "column_values": [
            {"id": "status", "text": status},
            {"id": "email_mk", "text": email}
        ],
        "assets": [{"id": format!("9{id}"), "name": "a.pdf", "file_extension": ".pdf", "public_url": null}]
    })
}

async fn graphql(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    *api.requests.lock().unwrap() += 1;
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error_message": "Not Authenticated"})),
        )
            .into_response();
    }
    if api.rate_limited {
        return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
    }

    let query = body["query"].as_str().unwrap_or_default();
    let vars = &body["variables"];

    let data = if query.contains("workspaces(") {
        match vars["page"].as_u64() {
            Some(1) => json!({"workspaces": [
                {"id": "1", "name": "Main"},
                {"id": null, "name": "Personal"}
            ]}),
            Some(2) => json!({"workspaces": [{"id": "2", "name": "Bot Activity"}]}),
            _ => json!({"workspaces": []}),
        }
    } else if query.contains("boards(workspace_ids") {
        assert_eq!(vars["workspace"], json!(["2"]));
        match vars["page"].as_u64() {
            Some(1) => json!({"boards": [
                {"id": "100", "name": "Other"},
                {"id": "555", "name": "BOT: Shipment Creation"}
            ]}),
            _ => json!({"boards": []}),
        }
    } else if query.contains("columns") {
        json!({"boards": [{
            "columns": [
                {"id": "name", "title": "Name", "type": "name"},
                {"id": "status", "title": "Status", "type": "status"},
                {"id": "email_mk", "title": "Email", "type": "email"}
            ],
            "groups": [
                {"id": "grp_west", "title": "> New Tender (West)"},
                {"id": "grp_east", "title": "New Tender (East)"}
            ]
        }]})
    } else if query.contains("next_items_page") {
        assert_eq!(vars["cursor"], "page-2");
        json!({"next_items_page": {"cursor": null, "items": [item("3", "", "")]}})
    } else if query.contains("items_page") {
        assert_eq!(vars["groups"], json!(["grp_west"]));
        json!({"boards": [{"groups": [{
            "id": "grp_west",
            "title": "> New Tender (West)",
            "items_page": {"cursor": "page-2", "items": [
                item("1", "Retry", "a@x.com"),
                item("2", "Done", "b@x.com")
            ]}
        }]}]})
    } else if query.contains("change_simple_column_value") {
        if vars["item"] == "404" {
            return Json(json!({"errors": [{"message": "Item not found"}]})).into_response();
        }
        api.mutations.lock().unwrap().push(vars.clone());
        json!({"change_simple_column_value": {"id": vars["item"]}})
    } else {
        return Json(json!({"errors": [{"message": "unknown query"}]})).into_response();
    };

    Json(json!({ "data": data })).into_response()
}

async fn file(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match params.get("assetId").map(String::as_str) {
        Some("91") => b"api-bytes".to_vec().into_response(),
        _ => (StatusCode::NOT_FOUND, "asset missing").into_response(),
    }
}

async fn public(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "a.pdf" => b"public-bytes".to_vec().into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

struct TestServer {
    base_url: String,
    api: Arc<FakeApi>,
    _handle: tokio::task::JoinHandle<()>,
}

async fn spawn_fake_api(api: FakeApi) -> TestServer {
    let api = Arc::new(api);
    let app = Router::new()
        .route("/", post(graphql))
        .route("/file", get(file))
        .route("/public/{name}", get(public))
        .with_state(api.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        api,
        _handle: handle,
    }
}

fn client(base_url: &str, token: &str) -> MondayService {
    let mut config = MondayConfig::new(token);
    config.api_url = base_url.to_string();
    MondayService::new(config).unwrap()
}

fn attachment(id: u64, public_url: Option<String>) -> Attachment {
    Attachment {
        id,
        name: "a.pdf".into(),
        file_extension: Some(".pdf".into()),
        public_url,
    }
}

// ---- resolve_board ----

#[tokio::test]
async fn resolve_board_walks_workspace_and_board_pages() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let id = svc
        .resolve_board("Bot Activity", "BOT: Shipment Creation")
        .await
        .unwrap();
    assert_eq!(id, 555);
}

#[tokio::test]
async fn resolve_board_unknown_board_is_not_found() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let err = svc
        .resolve_board("Bot Activity", "Nope")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound(ref m) if m.contains("Nope")));
}

#[tokio::test]
async fn resolve_board_unknown_workspace_is_not_found() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let err = svc
        .resolve_board("Missing", "BOT: Shipment Creation")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound(ref m) if m.contains("workspace 'Missing'")));
}

#[tokio::test]
async fn bad_token_is_auth_error() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, "wrong");
    let err = svc
        .resolve_board("Bot Activity", "BOT: Shipment Creation")
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, SyncError::Auth(ref m) if m.contains("Not Authenticated")));
}

#[tokio::test]
async fn throttling_surfaces_without_retry() {
    let server = spawn_fake_api(FakeApi {
        rate_limited: true,
        ..Default::default()
    })
    .await;
    let svc = client(&server.base_url, TOKEN);
    let err = svc.list_items(555, &["New Tender (West)".into()]).await.unwrap_err();
    assert!(matches!(err, SyncError::RateLimited(_)));
    assert_eq!(*server.api.requests.lock().unwrap(), 1);
}

// ---- list_items ----

#[tokio::test]
async fn list_items_follows_cursor_across_pages() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let items = svc
        .list_items(555, &["New Tender (West)".into()])
        .await
        .unwrap();

    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(items[0].status, "Retry");
    assert_eq!(items[0].email, "a@x.com");
    assert_eq!(items[1].status, "Done");
    assert_eq!(items[2].status, "");
    assert_eq!(items[0].attachments[0].id, 91);
    assert_eq!(items[0].created_at.as_deref(), Some("2026-10-16T08:00:00Z"));
}

#[tokio::test]
async fn list_items_unknown_group_is_not_found() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let err = svc
        .list_items(555, &["Pepsi".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound(ref m) if m.contains("Pepsi")));
}

// ---- update_status ----

#[tokio::test]
async fn update_status_sends_mutation_with_column_id() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    svc.update_status(555, 1, "Status", "In Queue").await.unwrap();
    // Idempotent: same value twice is fine.
    svc.update_status(555, 1, "Status", "In Queue").await.unwrap();

    let mutations = server.api.mutations.lock().unwrap().clone();
    assert_eq!(mutations.len(), 2);
    assert_eq!(mutations[0]["board"], "555");
    assert_eq!(mutations[0]["item"], "1");
    assert_eq!(mutations[0]["column"], "status");
    assert_eq!(mutations[0]["value"], "In Queue");
}

#[tokio::test]
async fn update_status_failure_is_status_update_error() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let err = svc
        .update_status(555, 404, "Status", "In Queue")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::StatusUpdate(ref m) if m.contains("Item not found")));
}

// ---- fetch_attachment_bytes ----

#[tokio::test]
async fn fetch_prefers_public_url() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let url = format!("{}/public/a.pdf", server.base_url);
    let data = svc.fetch_attachment_bytes(&attachment(77, Some(url))).await.unwrap();
    assert_eq!(data.as_ref(), b"public-bytes");
}

#[tokio::test]
async fn fetch_falls_back_to_file_endpoint() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let broken = format!("{}/public/gone.pdf", server.base_url);
    let data = svc
        .fetch_attachment_bytes(&attachment(91, Some(broken)))
        .await
        .unwrap();
    assert_eq!(data.as_ref(), b"api-bytes");

    let data = svc.fetch_attachment_bytes(&attachment(91, None)).await.unwrap();
    assert_eq!(data.as_ref(), b"api-bytes");
}

#[tokio::test]
async fn fetch_missing_asset_is_download_error() {
    let server = spawn_fake_api(FakeApi::default()).await;
    let svc = client(&server.base_url, TOKEN);
    let err = svc
        .fetch_attachment_bytes(&attachment(12, None))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Download(ref m) if m.contains("404")));
}

#[tokio::test]
async fn fetch_unreachable_host_is_download_error() {
    let svc = client("http://127.0.0.1:9", TOKEN);
    let err = svc
        .fetch_attachment_bytes(&attachment(1, None))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Download(_)));
}
