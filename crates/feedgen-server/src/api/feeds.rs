use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// Serves the published feed file of one destination.
pub(super) async fn serve_feed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(destination): Path<String>,
) -> Response {
    let Some(dest) = state.orchestrator.config().destination(&destination) else {
        return ApiError::new(req_id.0, "not_found", format!("unknown destination \"{destination}\""))
            .into_response();
    };

    match tokio::fs::read(state.orchestrator.feed_path(dest)).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ApiError::new(
            req_id.0,
            "not_found",
            format!("feed for \"{destination}\" has not been generated yet"),
        )
        .into_response(),
        Err(e) => {
            tracing::error!(destination = %destination, error = %e, "failed to read feed file");
            ApiError::new(req_id.0, "internal_error", "failed to read feed file").into_response()
        }
    }
}
