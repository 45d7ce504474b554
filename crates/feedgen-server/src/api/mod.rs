mod feeds;
mod status;
mod trigger;

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use feedgen_pipeline::Orchestrator;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, require_bearer_auth, AuthState};

/// A full feed run, started in the background by the trigger endpoint.
pub type RunFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type Runner = Arc<dyn Fn() -> RunFuture + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub runner: Runner,
    /// Set while a triggered run is in progress in this process.
    pub running: Arc<AtomicBool>,
}

impl AppState {
    #[must_use]
    pub fn new(orchestrator: Arc<Orchestrator>, runner: Runner) -> Self {
        Self {
            orchestrator,
            runner,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let protected = Router::new()
        .route("/api/trigger", post(trigger::trigger_run))
        .layer(axum::middleware::from_fn_with_state(auth, require_bearer_auth));

    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(status::api_health))
        .route("/feed/{destination}", get(feeds::serve_feed))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Liveness {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(Liveness { status: "ok" })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
