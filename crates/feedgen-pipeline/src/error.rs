use feedgen_db::DbError;
use feedgen_shopify::ShopifyError;
use feedgen_writer::WriterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A destination-fatal failure reported by the catalog source.
    #[error("catalog source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write metrics to {path}: {source}")]
    Metrics {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode metrics: {0}")]
    MetricsEncode(#[from] serde_json::Error),

    #[error("unknown destination \"{0}\"")]
    UnknownDestination(String),

    #[error("destination \"{0}\" is disabled")]
    DisabledDestination(String),

    #[error("no enabled destinations to generate")]
    NoDestinations,

    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl PipelineError {
    pub(crate) fn source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PipelineError::Source(Box::new(err))
    }
}
