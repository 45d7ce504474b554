use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
struct TriggerAccepted {
    status: &'static str,
}

/// Clears the running flag when the background run ends, including by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts a full run in the background and answers `202` immediately.
pub(super) async fn trigger_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    if state
        .running
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return ApiError::new(req_id.0, "conflict", "a feed run is already in progress")
            .into_response();
    }

    let guard = RunningGuard(Arc::clone(&state.running));
    let run = (state.runner)();
    tokio::spawn(async move {
        let _guard = guard;
        run.await;
    });
    tracing::info!(request_id = %req_id.0, "feed run triggered");

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: TriggerAccepted { status: "started" },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
        .into_response()
}
