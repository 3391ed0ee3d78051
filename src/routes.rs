//! REST endpoints for threads, approvals, metrics, and export.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::approvals::{Approval, ApprovalRequest, ApprovalService, ApprovalState};
use crate::error::ApprovalError;
use crate::export;
use crate::metrics;
use crate::threads::CatalogEntry;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub approvals: Arc<ApprovalService>,
    /// Minutes credited per approval in the metrics view.
    pub minutes_per_approval: u64,
}

/// Build the Axum router.
pub fn app_routes(approvals: Arc<ApprovalService>, minutes_per_approval: u64) -> Router {
    let state = AppState {
        approvals,
        minutes_per_approval,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/threads", get(list_threads))
        .route("/api/threads/{id}", get(get_thread))
        .route("/api/approve", post(approve))
        .route("/api/metrics", get(get_metrics))
        .route("/export/json", get(export_json))
        .route("/export/csv", get(export_csv))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

fn store_failure(e: impl std::fmt::Display) -> Response {
    error!(error = %e, "Approval store failure");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Approval store unavailable")
}

impl IntoResponse for ApprovalError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApprovalError::MissingThreadId | ApprovalError::EmptySummary => {
                StatusCode::BAD_REQUEST
            }
            ApprovalError::ThreadNotFound { .. } => StatusCode::NOT_FOUND,
            ApprovalError::Unchanged { .. } => StatusCode::CONFLICT,
            ApprovalError::Store(e) => return store_failure(e),
        };
        error_response(status, self.to_string())
    }
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ce-assist"
    }))
}

// ── Threads ─────────────────────────────────────────────────────────────

/// A thread with its draft and current approval.
#[derive(Serialize)]
struct ThreadView<'a> {
    #[serde(flatten)]
    entry: &'a CatalogEntry,
    approval: Option<Approval>,
    approval_state: ApprovalState,
}

impl<'a> ThreadView<'a> {
    fn new(entry: &'a CatalogEntry, approval: Option<Approval>) -> Self {
        Self {
            entry,
            approval_state: ApprovalState::of(approval.as_ref()),
            approval,
        }
    }
}

async fn list_threads(State(state): State<AppState>) -> Response {
    let mut approvals = match state.approvals.store().snapshot().await {
        Ok(a) => a,
        Err(e) => return store_failure(e),
    };
    let catalog = state.approvals.catalog();
    let threads: Vec<ThreadView> = catalog
        .entries()
        .iter()
        .map(|entry| ThreadView::new(entry, approvals.remove(&entry.thread.thread_id)))
        .collect();
    Json(serde_json::json!({ "threads": threads })).into_response()
}

async fn get_thread(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let catalog = state.approvals.catalog();
    let Some(entry) = catalog.get(&id) else {
        return ApprovalError::ThreadNotFound { thread_id: id }.into_response();
    };
    match state.approvals.get(&id).await {
        Ok(approval) => Json(ThreadView::new(entry, approval)).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Approve ─────────────────────────────────────────────────────────────

async fn approve(
    State(state): State<AppState>,
    body: Result<Json<ApprovalRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Malformed approve request");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    match state.approvals.submit(body).await {
        Ok(approval) => {
            info!(thread_id = %approval.thread_id, "Approval accepted via API");
            Json(serde_json::json!({"ok": true, "approval": approval})).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// ── Metrics ─────────────────────────────────────────────────────────────

async fn get_metrics(State(state): State<AppState>) -> Response {
    match state.approvals.store().snapshot().await {
        Ok(approvals) => Json(metrics::compute(
            state.approvals.catalog(),
            &approvals,
            state.minutes_per_approval,
        ))
        .into_response(),
        Err(e) => store_failure(e),
    }
}

// ── Export ──────────────────────────────────────────────────────────────

async fn export_records(state: &AppState) -> Result<Vec<export::ExportRecord>, Response> {
    let approvals = state
        .approvals
        .store()
        .snapshot()
        .await
        .map_err(store_failure)?;
    Ok(export::export_records(state.approvals.catalog(), &approvals))
}

async fn export_json(State(state): State<AppState>) -> Response {
    let records = match export_records(&state).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match export::to_json(&records) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=approved_export.json",
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize export");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Export failed")
        }
    }
}

async fn export_csv(State(state): State<AppState>) -> Response {
    match export_records(&state).await {
        Ok(records) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=approved_export.csv",
                ),
            ],
            export::to_csv(&records),
        )
            .into_response(),
        Err(resp) => resp,
    }
}
