//!
//! shardstore HTTP server
//! ----------------------
//! Axum routes that expose the store to callers (upload pages, bots, viewers).
//!
//! Responsibilities:
//! - Multipart upload into the sharded store.
//! - Raw object retrieval through `/files/{shard}/{name}`, the target of every public URL.
//! - Catalog listing, search, per-object info and per-shard stats as JSON.
//!
//! Sessions, password gates and HTML rendering live in front of this router and
//! are not handled here.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::config::{ServerConfig, MAX_FILE_SIZE};
use crate::error::AppError;
use crate::store::{public_url, ObjectSummary, RequestContext, ShardStore};

/// Plain listener; TLS terminates at the reverse proxy, which reports itself via X-Forwarded-Proto.
const TRANSPORT_SCHEME: &str = "http";

// Leave room above the object ceiling so oversize uploads reach the store and get SIZE_LIMIT.
const BODY_LIMIT: usize = MAX_FILE_SIZE * 3;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ShardStore>,
}

pub fn build_router(store: Arc<ShardStore>) -> Router {
    Router::new()
        .route("/health", get(|| async { "shardstore ok" }))
        .route("/uploadfile", post(upload_handler))
        .route("/files/{shard}/{file_name}", get(fetch_handler))
        .route("/api/files", get(list_handler))
        .route("/api/search", get(search_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/file-info", get(file_info_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(AppState { store })
}

/// Bind and serve until the listener fails.
pub async fn run(server: &ServerConfig, store: Arc<ShardStore>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", server.bind, server.http_port).parse()?;
    let shards = store.shards().len();
    let app = build_router(store);
    info!("Starting server on {} with {} shard(s)", addr, shards);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn error_response(err: &AppError) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_json())).into_response()
}

fn parse_shard_index(raw: &str) -> Result<usize, AppError> {
    raw.trim().parse::<usize>().map_err(|_| AppError::invalid_shard(format!("Invalid repo index '{}'", raw)))
}

// A body cut off by the limit layer is still an oversize upload, not a malformed one.
fn multipart_error(e: MultipartError, what: &str) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::size_limit(format!(
            "File size exceeds {}MB limit (request body over {} bytes)",
            MAX_FILE_SIZE / (1024 * 1024),
            BODY_LIMIT
        ));
    }
    AppError::user(format!("{}: {}", what, e))
}

fn with_public_urls(ctx: &RequestContext, items: Vec<ObjectSummary>) -> Vec<ObjectSummary> {
    items
        .into_iter()
        .map(|mut o| {
            o.url = Some(public_url(ctx, &o.file_name, o.repo_index));
            o
        })
        .collect()
}

fn catalog_response(ctx: &RequestContext, items: Vec<ObjectSummary>) -> Response {
    let data = with_public_urls(ctx, items);
    let count = data.len();
    (StatusCode::OK, Json(json!({"success": true, "data": data, "count": count}))).into_response()
}

async fn upload_handler(State(state): State<AppState>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let mut file: Option<(String, axum::body::Bytes)> = None;
    let mut custom_name: Option<String> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => return error_response(&multipart_error(e, "malformed multipart body")),
        };
        let part = field.name().unwrap_or("").to_string();
        match part.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or("file").to_string();
                match field.bytes().await {
                    Ok(b) => file = Some((name, b)),
                    Err(e) => return error_response(&multipart_error(e, "failed to read file part")),
                }
            }
            "customName" | "custom_name" => {
                match field.text().await {
                    Ok(t) => custom_name = Some(t),
                    Err(e) => return error_response(&multipart_error(e, "failed to read customName part")),
                }
            }
            _ => {}
        }
    }
    let Some((name, bytes)) = file else {
        return error_response(&AppError::user("missing 'file' part"));
    };

    match state.store.upload(&name, &bytes, custom_name.as_deref()).await {
        Ok(record) => {
            let ctx = RequestContext::from_headers(&headers, TRANSPORT_SCHEME);
            let url = public_url(&ctx, &record.file_name, record.repo_index);
            let mut data = serde_json::to_value(&record).unwrap_or_else(|_| json!({}));
            if let Some(obj) = data.as_object_mut() {
                obj.insert("url".to_string(), json!(url));
            }
            (StatusCode::OK, Json(json!({"success": true, "data": data}))).into_response()
        }
        Err(e) => {
            error!(code = e.code_str(), "upload failed: {}", e.message());
            error_response(&e)
        }
    }
}

async fn fetch_handler(State(state): State<AppState>, Path((shard, file_name)): Path<(String, String)>) -> Response {
    let index = match parse_shard_index(&shard) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    match state.store.fetch_object(&file_name, index).await {
        Ok(obj) => {
            let ct = HeaderValue::from_str(&obj.content_type).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
            (StatusCode::OK, [(header::CONTENT_TYPE, ct)], obj.bytes).into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn list_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = RequestContext::from_headers(&headers, TRANSPORT_SCHEME);
    catalog_response(&ctx, state.store.list_objects().await)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_handler(State(state): State<AppState>, headers: HeaderMap, Query(params): Query<SearchParams>) -> Response {
    let ctx = RequestContext::from_headers(&headers, TRANSPORT_SCHEME);
    match state.store.search(&params.q).await {
        Ok(items) => catalog_response(&ctx, items),
        Err(e) => error_response(&e),
    }
}

async fn stats_handler(State(state): State<AppState>) -> Response {
    let stats = state.store.stats().await;
    (StatusCode::OK, Json(json!({"success": true, "data": stats}))).into_response()
}

#[derive(Debug, Deserialize)]
struct FileInfoParams {
    file: String,
    repo: String,
}

async fn file_info_handler(State(state): State<AppState>, headers: HeaderMap, Query(params): Query<FileInfoParams>) -> Response {
    let index = match parse_shard_index(&params.repo) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };
    match state.store.file_info(&params.file, index).await {
        Ok(info) => {
            let ctx = RequestContext::from_headers(&headers, TRANSPORT_SCHEME);
            let mut data = with_public_urls(&ctx, vec![info]);
            (StatusCode::OK, Json(json!({"success": true, "data": data.pop()}))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_index_parsing() {
        assert_eq!(parse_shard_index("2").unwrap(), 2);
        assert_eq!(parse_shard_index("-1").unwrap_err().code_str(), "INVALID_SHARD");
        assert_eq!(parse_shard_index("abc").unwrap_err().code_str(), "INVALID_SHARD");
    }
}
