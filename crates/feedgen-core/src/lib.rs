pub mod app_config;
pub mod config;
pub mod feeds;
pub mod item;
pub mod products;
pub mod source;

pub use app_config::{AppConfig, DataSourceKind, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use feeds::{
    load_feed_config, CategoryMap, DestinationConfig, DestinationKind, DetailRule, FeedConfig,
    Filters, InteriorImageRule, LabelLimits, OverrideDetail, PatternRule, ProductOverride,
    RunSettings, ShippingTiers, StaticValues,
};
pub use item::{Availability, FeedItem, Money, ProductDetail, ReviewSummary, Shipping};
pub use products::{Image, MetafieldBag, Product, Variant, PLATFORM_NAMESPACE};
pub use source::{CatalogSource, Page};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read feed config at {path}: {source}")]
    FeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feed config: {0}")]
    FeedFileParse(#[source] serde_yaml::Error),

    #[error("feed config validation failed: {0}")]
    Validation(String),
}
