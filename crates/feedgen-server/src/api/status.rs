use std::sync::atomic::Ordering;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use feedgen_pipeline::{read_metrics, MetricsDocument};
use serde::Serialize;

use super::{ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct FeedFileStatus {
    destination: String,
    feed_filename: String,
    enabled: bool,
    exists: bool,
    size_bytes: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(super) struct HealthReport {
    status: &'static str,
    running: bool,
    feeds: Vec<FeedFileStatus>,
    /// Contents of the last persisted metrics document.
    metrics: Option<MetricsDocument>,
}

/// Last run metrics plus the state of every configured feed file.
pub(super) async fn api_health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let orchestrator = &state.orchestrator;

    let mut feeds = Vec::new();
    for d in &orchestrator.config().destinations {
        let size_bytes = tokio::fs::metadata(orchestrator.feed_path(d))
            .await
            .ok()
            .filter(std::fs::Metadata::is_file)
            .map(|m| m.len());
        feeds.push(FeedFileStatus {
            destination: d.name.clone(),
            feed_filename: d.feed_filename.clone(),
            enabled: d.enabled,
            exists: size_bytes.is_some(),
            size_bytes,
        });
    }

    let metrics = match read_metrics(&orchestrator.metrics_path()) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "could not read metrics document");
            None
        }
    };

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthReport {
                status: "ok",
                running: state.running.load(Ordering::Acquire),
                feeds,
                metrics,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}
