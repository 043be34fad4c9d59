use crate::{
    config::Config,
    data::{runs, tree},
    errors::{AppError, AppResult},
    security::{self, PathGuard},
};
use anyhow::Context;
use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use http::{header, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Instant};
use tower::ServiceExt;
use tower_http::{services::ServeFile, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub guard: Arc<PathGuard>,
}

/// `?path=<relative to the data root>`
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: String,
}

pub async fn serve(cfg: Config, guard: PathGuard) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr = format!("{}:{}", cfg.server.bind_addr, cfg.server.port)
        .parse()
        .context("parsing bind address")?;
    let shared = AppState { cfg: Arc::new(cfg), guard: Arc::new(guard) };
    let app = build_router(shared)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> anyhow::Result<Router> {
    let cors = security::cors_layer(&shared.cfg)?;
    Ok(Router::new()
        .route("/healthz", get(health))
        .route("/api/dir-tree", get(dir_tree))
        .route("/api/read-sim", get(read_sim))
        .route("/api/file", get(file))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status":"ok"})))
}

async fn dir_tree(State(state): State<AppState>, query: Result<Query<PathQuery>, QueryRejection>) -> Response {
    const GENERIC: &str = "Failed to scan data directory";
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let q = match path_param(query) {
        Ok(q) => q,
        Err(e) => return fail(&request_id, "dir-tree", "", started, e, GENERIC),
    };
    let guard = state.guard.clone();
    let url = q.path.clone();
    let result = blocking(move || {
        let dir = guard.resolve(&url)?;
        tree::scan(&guard, &dir, &url)
    })
    .await;
    json_reply(&request_id, "dir-tree", &q.path, started, result, GENERIC)
}

async fn read_sim(State(state): State<AppState>, query: Result<Query<PathQuery>, QueryRejection>) -> Response {
    const GENERIC: &str = "Failed to read simulation data";
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let q = match path_param(query) {
        Ok(q) => q,
        Err(e) => return fail(&request_id, "read-sim", "", started, e, GENERIC),
    };
    let guard = state.guard.clone();
    let rel = q.path.clone();
    let result = blocking(move || {
        let sim_dir = guard.resolve(&rel)?;
        runs::aggregate(&guard, &sim_dir)
    })
    .await;
    json_reply(&request_id, "read-sim", &q.path, started, result, GENERIC)
}

async fn file(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
    req: Request,
) -> Response {
    const GENERIC: &str = "Failed to read file";
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    let q = match path_param(query) {
        Ok(q) => q,
        Err(e) => return fail(&request_id, "file", "", started, e, GENERIC),
    };
    let guard = state.guard.clone();
    let rel = q.path.clone();
    let resolved = blocking(move || {
        let full = guard.resolve(&rel)?;
        if full.is_file() { Ok(full) } else { Err(AppError::NotFound("File not found")) }
    })
    .await;
    let full = match resolved {
        Ok(full) => full,
        Err(e) => return fail(&request_id, "file", &q.path, started, e, GENERIC),
    };

    let resp = match ServeFile::new(&full).oneshot(req).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    };
    if resp.status().is_server_error() {
        let err = AppError::Internal(format!("serving {} returned {}", full.display(), resp.status()));
        return fail(&request_id, "file", &q.path, started, err, GENERIC);
    }
    let bytes_out = resp
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);
    audit_end(&request_id, "file", &q.path, "allow", "OK", elapsed_ms(started), bytes_out);
    resp.into_response()
}

/// Turns a query rejection into the same JSON error body every other failure uses.
fn path_param(query: Result<Query<PathQuery>, QueryRejection>) -> AppResult<PathQuery> {
    query.map(|Query(q)| q).map_err(|e| AppError::BadQuery(e.body_text()))
}

/// Runs filesystem work off the async workers.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}

fn json_reply<T: Serialize>(
    request_id: &str,
    endpoint: &str,
    path: &str,
    started: Instant,
    result: AppResult<T>,
    generic: &str,
) -> Response {
    let body = match result.and_then(|v| serde_json::to_vec(&v).map_err(|e| AppError::Internal(e.to_string()))) {
        Ok(body) => body,
        Err(e) => return fail(request_id, endpoint, path, started, e, generic),
    };
    audit_end(request_id, endpoint, path, "allow", "OK", elapsed_ms(started), body.len() as u64);
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn fail(request_id: &str, endpoint: &str, path: &str, started: Instant, err: AppError, generic: &str) -> Response {
    let outcome = if err.is_fault() { "error" } else { "deny" };
    audit_end(request_id, endpoint, path, outcome, err.code(), elapsed_ms(started), 0);
    err.masked(generic).into_response()
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn audit_end(request_id: &str, endpoint: &str, path: &str, outcome: &str, code: &str, duration_ms: u64, bytes_out: u64) {
    tracing::info!(
        request_id = request_id,
        endpoint = endpoint,
        path = path,
        outcome = outcome,
        code = code,
        duration_ms = duration_ms,
        bytes_out = bytes_out,
        "audit"
    );
}
