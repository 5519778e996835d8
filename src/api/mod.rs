//! HTTP surface: one webhook endpoint dispatching on `action`.
//!
//! `POST /` carries commit and registry events, `GET /` answers task
//! queries, and `GET /health` reports liveness. Every response body is
//! JSON with a `success` flag so script-based callers can branch on it.

mod dto;
mod error;

pub use dto::{
    EventAction, HealthResponse, HoursField, InboundEvent, MessageResponse, QueryParams,
    RecentTaskView, TaskRowView, TasksResponse,
};
pub use error::ApiError;

use crate::app::{Aggregator, RegistryManager};
use crate::worklog::services::MergeOutcome;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Shared state of the request handlers.
#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
    registry: Arc<RegistryManager>,
}

impl AppState {
    /// Creates handler state over the given services.
    #[must_use]
    pub const fn new(aggregator: Arc<Aggregator>, registry: Arc<RegistryManager>) -> Self {
        Self {
            aggregator,
            registry,
        }
    }
}

/// Builds the router with every route and the request trace layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_query).post(handle_event))
        .route("/health", get(|| async { Json(health()) }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `app` on `listener` until `shutdown` is cancelled.
///
/// In-flight requests finish before the future resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "worklog API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    tracing::info!("worklog API shut down");
    Ok(())
}

const fn health() -> HealthResponse {
    HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }
}

async fn handle_event(State(state): State<AppState>, body: Bytes) -> Response {
    match dispatch_event(&state, &body).await {
        Ok(message) => Json(MessageResponse::ok(message)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn dispatch_event(state: &AppState, body: &[u8]) -> Result<&'static str, ApiError> {
    let event: InboundEvent =
        serde_json::from_slice(body).map_err(|err| ApiError::InvalidPayload(err.to_string()))?;

    match EventAction::parse(event.action.as_deref())? {
        EventAction::LogCommit => {
            let recorded = state
                .aggregator
                .record_commit(event.into_commit_request()?)
                .await?;
            Ok(match recorded.outcome {
                MergeOutcome::Created => "Task logged successfully",
                MergeOutcome::Merged => "Task updated (appended to existing entry)",
            })
        }
        EventAction::CreateTask => {
            state
                .registry
                .create(event.task_name.as_deref().unwrap_or_default())
                .await?;
            Ok("Task created successfully")
        }
        EventAction::UpdateTask => {
            state
                .registry
                .rename(
                    event.old_name.as_deref().unwrap_or_default(),
                    event.new_name.as_deref().unwrap_or_default(),
                )
                .await?;
            Ok("Task updated successfully")
        }
        EventAction::DeleteTask => {
            state
                .registry
                .remove(event.task_name.as_deref().unwrap_or_default())
                .await?;
            Ok("Task deleted successfully")
        }
    }
}

async fn handle_query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, ApiError> {
    match params.action.as_deref().map(str::trim) {
        None | Some("") => Ok(Json(MessageResponse::ok("Worklog API")).into_response()),
        Some("getTasks") => {
            let entries = state.aggregator.list_entries().await?;
            let tasks: Vec<TaskRowView> = entries.iter().map(TaskRowView::from).collect();
            Ok(Json(TasksResponse::ok(tasks)).into_response())
        }
        Some("getRecentTasks") => {
            let entries = state.registry.list_recent().await?;
            let tasks: Vec<RecentTaskView> = entries.iter().map(RecentTaskView::from).collect();
            Ok(Json(TasksResponse::ok(tasks)).into_response())
        }
        Some(other) => Err(ApiError::UnknownAction(other.to_owned())),
    }
}
