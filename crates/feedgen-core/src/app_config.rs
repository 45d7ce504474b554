use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where the catalog is read from for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// Paginated, quota-limited Shopify Admin REST API.
    Shopify,
    /// Bulk relational mirror of the catalog (`online_products` table).
    Database,
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSourceKind::Shopify => write!(f, "shopify"),
            DataSourceKind::Database => write!(f, "database"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub source: DataSourceKind,
    /// Admin host of the shop, e.g. `racoon-lab.myshopify.com`. Required for
    /// [`DataSourceKind::Shopify`].
    pub shop_url: Option<String>,
    pub access_token: Option<String>,
    /// Required for [`DataSourceKind::Database`].
    pub database_url: Option<String>,
    pub api_version: String,
    /// Public storefront URL used to build item links.
    pub base_url: String,
    pub output_dir: PathBuf,
    pub config_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub min_request_interval_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("source", &self.source)
            .field("shop_url", &self.shop_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("config_path", &self.config_path)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .finish()
    }
}
