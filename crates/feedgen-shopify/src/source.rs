//! [`CatalogSource`] over the Admin REST API.

use feedgen_core::{CatalogSource, Page, Product};

use crate::client::ShopifyClient;
use crate::error::ShopifyError;
use crate::pagination::SinceIdCursor;

/// Largest page the products endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Streams active products page by page with a `since_id` cursor.
pub struct ShopifySource {
    client: ShopifyClient,
    cursor: SinceIdCursor,
    page_size: u32,
}

impl ShopifySource {
    /// `page_size` is clamped to `1..=250`.
    #[must_use]
    pub fn new(client: ShopifyClient, page_size: u32) -> Self {
        Self {
            client,
            cursor: SinceIdCursor::new(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ShopifyClient {
        &self.client
    }

    #[must_use]
    pub fn cursor(&self) -> &SinceIdCursor {
        &self.cursor
    }
}

impl CatalogSource for ShopifySource {
    type Error = ShopifyError;

    fn data_source(&self) -> &'static str {
        "shopify"
    }

    fn rewind(&mut self) {
        self.cursor.reset();
    }

    async fn next_page(&mut self) -> Result<Option<Page>, ShopifyError> {
        if self.cursor.is_done() {
            return Ok(None);
        }

        let since_id = self.cursor.since_id();
        let fetched = self
            .client
            .fetch_products_page(since_id, self.page_size)
            .await?;

        let mut page = Page::default();
        for record in fetched.records {
            match record {
                Ok(product) => page.products.push(product),
                Err(err) => {
                    tracing::warn!(since_id, error = %err, "skipping unreadable product record");
                    page.skipped += 1;
                }
            }
        }

        self.cursor
            .advance(fetched.last_id, fetched.len, self.page_size)?;

        tracing::debug!(
            since_id,
            next_since_id = self.cursor.since_id(),
            products = page.products.len(),
            skipped = page.skipped,
            "fetched product page"
        );

        if fetched.len == 0 {
            return Ok(None);
        }
        Ok(Some(page))
    }

    async fn enrich(&self, product: &mut Product) -> Result<(), ShopifyError> {
        let metafields = self.client.fetch_metafields(product.id).await?;
        let collections = self.client.fetch_collections(product.id).await?;
        product.metafields.merge(&metafields);
        product.collections = collections;
        Ok(())
    }

    async fn count(&self) -> Result<Option<u64>, ShopifyError> {
        self.client.count_products().await.map(Some)
    }

    fn is_record_level(err: &ShopifyError) -> bool {
        err.is_record_level()
    }
}
