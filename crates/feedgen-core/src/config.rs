use crate::app_config::{AppConfig, DataSourceKind, Environment};
use crate::ConfigError;

/// Shopify caps `products.json` pages at 250 records.
const MAX_PAGE_SIZE: u32 = 250;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not read `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("FEEDGEN_ENV", "development"))?;
    let source = parse_source(&or_default("FEEDGEN_SOURCE", "shopify"))
        .map_err(|reason| invalid("FEEDGEN_SOURCE", reason))?;

    let (shop_url, access_token, database_url) = match source {
        DataSourceKind::Shopify => (
            Some(require("FEEDGEN_SHOP_URL")?),
            Some(require("FEEDGEN_ACCESS_TOKEN")?),
            lookup("DATABASE_URL").ok(),
        ),
        DataSourceKind::Database => (
            lookup("FEEDGEN_SHOP_URL").ok(),
            lookup("FEEDGEN_ACCESS_TOKEN").ok(),
            Some(require("DATABASE_URL")?),
        ),
    };

    let bind_addr = or_default("FEEDGEN_BIND_ADDR", "0.0.0.0:10000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("FEEDGEN_BIND_ADDR", e.to_string()))?;

    let page_size = parse_u32("FEEDGEN_PAGE_SIZE", "250")?;
    if page_size == 0 {
        return Err(invalid(
            "FEEDGEN_PAGE_SIZE",
            "page size must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        source,
        shop_url,
        access_token,
        database_url,
        api_version: or_default("FEEDGEN_API_VERSION", "2024-10"),
        base_url: or_default("FEEDGEN_BASE_URL", "https://racoon-lab.it")
            .trim_end_matches('/')
            .to_string(),
        output_dir: PathBuf::from(or_default("FEEDGEN_OUTPUT_DIR", "./public")),
        config_path: PathBuf::from(or_default("FEEDGEN_CONFIG_PATH", "./config/feeds.yaml")),
        bind_addr,
        log_level: or_default("FEEDGEN_LOG_LEVEL", "info"),
        request_timeout_secs: parse_u64("FEEDGEN_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("FEEDGEN_USER_AGENT", "feedgen/0.1 (catalog-export)"),
        page_size: page_size.min(MAX_PAGE_SIZE),
        max_retries: parse_u32("FEEDGEN_MAX_RETRIES", "3")?,
        retry_backoff_base_ms: parse_u64("FEEDGEN_RETRY_BACKOFF_BASE_MS", "2000")?,
        min_request_interval_ms: parse_u64("FEEDGEN_MIN_REQUEST_INTERVAL_MS", "500")?,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FEEDGEN_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_source(s: &str) -> Result<DataSourceKind, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "shopify" | "api" => Ok(DataSourceKind::Shopify),
        "database" | "mysql" | "db" => Ok(DataSourceKind::Database),
        other => Err(format!(
            "unknown data source \"{other}\"; expected \"shopify\" or \"database\""
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
