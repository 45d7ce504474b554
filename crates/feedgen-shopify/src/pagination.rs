//! Identity-based pagination for the Admin `products.json` endpoint.
//!
//! Pages are requested with `order=id asc&since_id=N`, where `N` is the
//! last product id of the previous page. Unlike `page_info` cursors, a
//! since-id cursor lets every page repeat the `status=active` filter.

use crate::error::ShopifyError;

/// Maximum number of pages in one pass before giving up.
///
/// At 250 products per page this covers half a million products; hitting
/// it means the cursor is cycling.
pub const MAX_PAGES: usize = 2_000;

/// Position of a pass through the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinceIdCursor {
    since_id: i64,
    pages: usize,
    done: bool,
}

impl SinceIdCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for the `since_id` query parameter; `0` before the first page.
    #[must_use]
    pub fn since_id(&self) -> i64 {
        self.since_id
    }

    #[must_use]
    pub fn pages(&self) -> usize {
        self.pages
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Moves past a fetched page.
    ///
    /// `last_id` is the id of the last record on the page (`None` for an
    /// empty page). A page shorter than `page_size` ends the pass.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::CursorNotAdvancing`] if `last_id` is not greater
    ///   than the current cursor.
    /// - [`ShopifyError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub fn advance(
        &mut self,
        last_id: Option<i64>,
        page_len: usize,
        page_size: u32,
    ) -> Result<(), ShopifyError> {
        let Some(last_id) = last_id else {
            self.done = true;
            return Ok(());
        };

        if last_id <= self.since_id {
            return Err(ShopifyError::CursorNotAdvancing {
                since_id: self.since_id,
                last_id,
            });
        }

        self.pages += 1;
        if self.pages > MAX_PAGES {
            return Err(ShopifyError::PaginationLimit {
                max_pages: MAX_PAGES,
            });
        }

        self.since_id = last_id;
        if page_len < page_size as usize {
            self.done = true;
        }
        Ok(())
    }
}
