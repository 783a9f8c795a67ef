//! Thin HTTP adapter over the service layer. Routing only; every
//! handler is a one-line delegation plus JSON shaping.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::error::PathRankError;
use crate::probe::ProbeResult;
use crate::service::{PathCount, PathRankService};

/// JSON error envelope: the taxonomy kind name plus a message.
#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl IntoResponse for PathRankError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        warn!(kind = body.kind, status = status.as_u16(), "request failed");
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(service: Arc<PathRankService>) -> Router {
    Router::new()
        .route("/api/{*path}", get(record_visit))
        .route("/test/{count}", post(run_load_test))
        .route("/stats", get(stats))
        .with_state(service)
}

async fn record_visit(
    State(service): State<Arc<PathRankService>>,
    Path(path): Path<String>,
) -> Result<Json<PathCount>, PathRankError> {
    service.record_visit(&path).map(Json)
}

async fn run_load_test(
    State(service): State<Arc<PathRankService>>,
    Path(count): Path<usize>,
) -> Result<Json<Vec<ProbeResult>>, PathRankError> {
    service.run_load_test(count).await.map(Json)
}

async fn stats(
    State(service): State<Arc<PathRankService>>,
) -> Result<Json<Vec<PathCount>>, PathRankError> {
    service.leaderboard().map(Json)
}
