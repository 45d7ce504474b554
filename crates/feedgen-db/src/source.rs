//! [`CatalogSource`] over the `online_products` mirror.

use feedgen_core::{CatalogSource, Page, Product};
use sqlx::MySqlPool;

use crate::group::group_rows;
use crate::rows::{count_products, fetch_chunk};
use crate::DbError;

/// Products per chunk.
pub const DEFAULT_CHUNK_SIZE: u32 = 250;

/// Reads the catalog in product-id-keyed chunks.
///
/// Rows already carry collections and metafields, so [`enrich`] does
/// nothing and no request pacing applies.
///
/// [`enrich`]: CatalogSource::enrich
pub struct BulkSource {
    pool: MySqlPool,
    chunk_size: u32,
    after_product_id: i64,
    done: bool,
}

impl BulkSource {
    #[must_use]
    pub fn new(pool: MySqlPool, chunk_size: u32) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
            after_product_id: 0,
            done: false,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl CatalogSource for BulkSource {
    type Error = DbError;

    fn data_source(&self) -> &'static str {
        "database"
    }

    fn rewind(&mut self) {
        self.after_product_id = 0;
        self.done = false;
    }

    async fn next_page(&mut self) -> Result<Option<Page>, DbError> {
        if self.done {
            return Ok(None);
        }

        let rows = fetch_chunk(&self.pool, self.after_product_id, self.chunk_size).await?;
        let Some(last_product_id) = rows.last().map(|r| r.product_id) else {
            self.done = true;
            return Ok(None);
        };

        let mut distinct = 0_u32;
        let mut previous = None;
        for row in &rows {
            if previous != Some(row.product_id) {
                distinct += 1;
                previous = Some(row.product_id);
            }
        }

        let row_count = rows.len();
        let chunk = group_rows(rows);

        tracing::debug!(
            after_product_id = self.after_product_id,
            last_product_id,
            rows = row_count,
            products = chunk.products.len(),
            skipped = chunk.skipped,
            "fetched product chunk"
        );

        self.after_product_id = last_product_id;
        if distinct < self.chunk_size {
            self.done = true;
        }

        Ok(Some(Page {
            products: chunk.products,
            skipped: chunk.skipped,
        }))
    }

    async fn enrich(&self, _product: &mut Product) -> Result<(), DbError> {
        Ok(())
    }

    async fn count(&self) -> Result<Option<u64>, DbError> {
        Ok(Some(count_products(&self.pool).await?))
    }
}
