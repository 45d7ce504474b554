use std::future::Future;

use crate::products::Product;

/// One page of canonical products.
#[derive(Debug, Default)]
pub struct Page {
    pub products: Vec<Product>,
    /// Records on this page that could not be read and were dropped.
    pub skipped: usize,
}

/// A paginated catalog that yields canonical [`Product`] records one page at
/// a time.
///
/// Implementations hold their own cursor. A full pass is `rewind()` followed
/// by `next_page()` until it returns `Ok(None)`. Collections and metafields
/// are only loaded by `enrich()`, one product at a time, so a caller never
/// holds more than the current page.
pub trait CatalogSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short identifier recorded in run metrics (`"shopify"`, `"database"`).
    fn data_source(&self) -> &'static str;

    /// Resets the cursor to the start of the catalog.
    fn rewind(&mut self);

    /// Fetches the page after the current cursor and advances it.
    ///
    /// Returns `Ok(None)` once the catalog is exhausted. A failed call
    /// leaves the cursor where it was.
    fn next_page(
        &mut self,
    ) -> impl Future<Output = Result<Option<Page>, Self::Error>> + Send;

    /// Loads per-product collections and metafields into `product`.
    fn enrich(
        &self,
        product: &mut Product,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Total number of active products, when the source can report it cheaply.
    fn count(&self) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send {
        async { Ok(None) }
    }

    /// Whether `err` only affects the record being processed, so the run can
    /// skip that record and continue.
    fn is_record_level(_err: &Self::Error) -> bool {
        false
    }
}
