//! HTTP client for the Shopify Admin REST API.

mod enrich;
mod origin;
mod products;

use std::sync::Arc;
use std::time::Duration;

use feedgen_core::AppConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ShopifyError;
use crate::rate_limit::{
    retry_with_backoff, PacingPolicy, QuotaPacer, CALL_LIMIT_HEADER, MAX_RETRY_DELAY,
};

pub use origin::admin_base_url;
pub use products::FetchedPage;

/// Auth header for private/custom app tokens.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Wait used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Construction parameters for [`ShopifyClient`].
#[derive(Clone)]
pub struct ClientSettings {
    /// Shop host (`racoon-lab.myshopify.com`) or full origin.
    pub shop_url: String,
    pub access_token: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub min_request_interval_ms: u64,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("shop_url", &self.shop_url)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .finish()
    }
}

impl ClientSettings {
    /// Builds settings from the environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::InvalidShopUrl`] when the shop URL or access
    /// token is not configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ShopifyError> {
        let shop_url = config
            .shop_url
            .clone()
            .ok_or_else(|| ShopifyError::InvalidShopUrl {
                shop_url: String::new(),
                reason: "FEEDGEN_SHOP_URL is not set".to_string(),
            })?;
        let access_token =
            config
                .access_token
                .clone()
                .ok_or_else(|| ShopifyError::InvalidShopUrl {
                    shop_url: shop_url.clone(),
                    reason: "FEEDGEN_ACCESS_TOKEN is not set".to_string(),
                })?;
        Ok(Self {
            shop_url,
            access_token,
            api_version: config.api_version.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            min_request_interval_ms: config.min_request_interval_ms,
        })
    }
}

/// Authenticated Admin API client.
///
/// Every request goes through one shared [`QuotaPacer`] and is retried on
/// transient errors. Cloning is cheap and clones share the pacer, since the
/// quota belongs to the access token.
#[derive(Clone)]
pub struct ShopifyClient {
    http: Client,
    base: String,
    access_token: String,
    pacer: Arc<QuotaPacer>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ShopifyClient {
    /// # Errors
    ///
    /// - [`ShopifyError::InvalidShopUrl`] if the shop URL cannot be turned
    ///   into an Admin API base.
    /// - [`ShopifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(settings: &ClientSettings) -> Result<Self, ShopifyError> {
        let base = admin_base_url(&settings.shop_url, &settings.api_version)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        let policy =
            PacingPolicy::with_min_interval(Duration::from_millis(settings.min_request_interval_ms));
        Ok(Self {
            http,
            base,
            access_token: settings.access_token.clone(),
            pacer: Arc::new(QuotaPacer::new(policy)),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Admin API base URL, e.g. `https://shop.myshopify.com/admin/api/2024-10`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn pacer(&self) -> &QuotaPacer {
        &self.pacer
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ShopifyError> {
        reqwest::Url::parse(&format!("{}/{path}", self.base)).map_err(|e| {
            ShopifyError::InvalidShopUrl {
                shop_url: self.base.clone(),
                reason: format!("cannot build endpoint {path}: {e}"),
            }
        })
    }

    /// Paced, retried `GET` returning the parsed JSON body.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`] after all retries are exhausted.
    /// - [`ShopifyError::NotFound`] on 404 (not retried).
    /// - [`ShopifyError::UnexpectedStatus`] on other non-2xx (5xx retried).
    /// - [`ShopifyError::Http`] on network failure after all retries.
    /// - [`ShopifyError::Deserialize`] if the body does not match `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &reqwest::Url,
        context: &str,
    ) -> Result<T, ShopifyError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || async move {
            self.pacer.pace().await;

            let response = self
                .http
                .get(url.clone())
                .header(ACCESS_TOKEN_HEADER, &self.access_token)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;

            self.pacer.observe(
                response
                    .headers()
                    .get(CALL_LIMIT_HEADER)
                    .and_then(|v| v.to_str().ok()),
            );

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_retry_after)
                    .unwrap_or(DEFAULT_RETRY_AFTER);
                return Err(ShopifyError::RateLimited {
                    url: url.to_string(),
                    retry_after,
                });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ShopifyError::NotFound {
                    url: url.to_string(),
                });
            }

            if !status.is_success() {
                return Err(ShopifyError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| ShopifyError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
        })
        .await
    }
}

/// Parses a `Retry-After` value in (possibly fractional) seconds, capped at
/// [`MAX_RETRY_DELAY`].
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    if secs.is_nan() || secs < 0.0 {
        return None;
    }
    Some(
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY),
    )
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
