use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited on {url} (retry after {retry_after:?})")]
    RateLimited { url: String, retry_after: Duration },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("product {product_id} disappeared while it was being enriched")]
    ProductGone { product_id: i64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("normalization error for product {product_id}: {reason}")]
    Normalization { product_id: i64, reason: String },

    #[error("pagination limit reached: exceeded {max_pages} pages")]
    PaginationLimit { max_pages: usize },

    #[error("pagination cursor did not advance (since_id {since_id}, last id {last_id})")]
    CursorNotAdvancing { since_id: i64, last_id: i64 },

    #[error("invalid shop URL \"{shop_url}\": {reason}")]
    InvalidShopUrl { shop_url: String, reason: String },
}

impl ShopifyError {
    /// Returns `true` for transient upstream conditions worth retrying after
    /// a delay: quota exhaustion (429), server errors (5xx), and network
    /// timeouts or connection failures.
    ///
    /// Client errors (401/403/404 and other 4xx), malformed bodies and
    /// pagination guards are never retried.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            ShopifyError::RateLimited { .. } => true,
            ShopifyError::UnexpectedStatus { status, .. } => (500..600).contains(status),
            ShopifyError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            ShopifyError::Deserialize { .. }
            | ShopifyError::NotFound { .. }
            | ShopifyError::ProductGone { .. }
            | ShopifyError::Normalization { .. }
            | ShopifyError::PaginationLimit { .. }
            | ShopifyError::CursorNotAdvancing { .. }
            | ShopifyError::InvalidShopUrl { .. } => false,
        }
    }

    /// Returns `true` when the error only concerns one product, so the run
    /// can skip it and continue.
    #[must_use]
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            ShopifyError::ProductGone { .. } | ShopifyError::Normalization { .. }
        )
    }
}
