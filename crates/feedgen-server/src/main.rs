mod api;
mod middleware;

use std::sync::Arc;

use feedgen_core::AppConfig;
use feedgen_pipeline::{run_configured, Orchestrator};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState, Runner},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(feedgen_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let feed_config = Arc::new(feedgen_core::load_feed_config(&config.config_path)?);
    let orchestrator = Arc::new(Orchestrator::new(
        feed_config,
        config.base_url.clone(),
        config.output_dir.clone(),
    ));

    let auth = AuthState::from_env(matches!(
        config.env,
        feedgen_core::Environment::Development
    ))?;
    let runner = pipeline_runner(Arc::clone(&config), Arc::clone(&orchestrator));
    let app = build_app(AppState::new(orchestrator, runner), auth);

    tracing::info!(addr = %config.bind_addr, source = %config.source, "listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// A full run over every enabled destination, logging its outcome.
fn pipeline_runner(config: Arc<AppConfig>, orchestrator: Arc<Orchestrator>) -> Runner {
    Arc::new(move || {
        let config = Arc::clone(&config);
        let orchestrator = Arc::clone(&orchestrator);
        Box::pin(async move {
            match run_configured(&config, &orchestrator, &[]).await {
                Ok(report) if report.success() => {
                    tracing::info!(destinations = report.destinations.len(), "triggered run finished");
                }
                Ok(report) => {
                    let failed = report.failed_destinations();
                    tracing::warn!(?failed, "triggered run finished with failures");
                }
                Err(e) => tracing::error!(error = %e, "triggered run failed"),
            }
        })
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
