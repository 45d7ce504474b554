//! Builds the configured catalog source and runs the orchestrator on it.

use feedgen_core::{AppConfig, DataSourceKind};
use feedgen_db::{BulkSource, DbError, PoolConfig, DEFAULT_CHUNK_SIZE};
use feedgen_shopify::{ClientSettings, ShopifyClient, ShopifySource};

use crate::error::PipelineError;
use crate::orchestrator::{Orchestrator, RunReport};

/// Runs `orchestrator` against the source selected by `FEEDGEN_SOURCE`.
///
/// # Errors
///
/// Returns an error when the source cannot be set up (missing credentials,
/// unreachable database) or when [`Orchestrator::run`] fails.
pub async fn run_configured(
    app: &AppConfig,
    orchestrator: &Orchestrator,
    filter: &[String],
) -> Result<RunReport, PipelineError> {
    tracing::info!(source = %app.source, "starting feed run");
    match app.source {
        DataSourceKind::Shopify => {
            let settings = ClientSettings::from_app_config(app)?;
            let client = ShopifyClient::new(&settings)?;
            let mut source = ShopifySource::new(client, app.page_size);
            orchestrator.run(&mut source, filter).await
        }
        DataSourceKind::Database => {
            let url = app
                .database_url
                .as_deref()
                .ok_or(DbError::MissingDatabaseUrl)?;
            let pool = feedgen_db::connect_pool(url, PoolConfig::from_env())
                .await
                .map_err(DbError::from)?;
            let mut source = BulkSource::new(pool, DEFAULT_CHUNK_SIZE);
            orchestrator.run(&mut source, filter).await
        }
    }
}
