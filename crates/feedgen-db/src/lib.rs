use std::{env, time::Duration};

use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use thiserror::Error;

pub mod group;
pub mod rows;
pub mod source;

pub use group::{group_rows, parse_collections, parse_images, split_tags, GroupedChunk};
pub use rows::{count_products, fetch_chunk, OnlineProductRow};
pub use source::{BulkSource, DEFAULT_CHUNK_SIZE};

const DEFAULT_MAX_CONNECTIONS: u32 = 2;
const DEFAULT_MIN_CONNECTIONS: u32 = 0;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    /// Reads `FEEDGEN_DB_*` overrides; unparsable values keep the default.
    pub fn from_env() -> Self {
        Self {
            max_connections: read_u32("FEEDGEN_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            min_connections: read_u32("FEEDGEN_DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS),
            acquire_timeout_secs: read_u64(
                "FEEDGEN_DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            ),
        }
    }
}

/// Every database failure is fatal for the destination being generated.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens the pool the bulk source reads from. The source issues one query
/// at a time, so a couple of connections is plenty.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the first connection cannot be established.
pub async fn connect_pool(
    database_url: &str,
    config: PoolConfig,
) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

fn read_u32(var: &str, default: u32) -> u32 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn read_u64(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
