use feedgen_core::Product;

use super::ShopifyClient;
use crate::error::ShopifyError;
use crate::normalize::normalize_product;
use crate::types::{CountResponse, ProductsPage, ShopifyProduct};

/// Fields requested on every product page.
const PRODUCT_FIELDS: &str =
    "id,title,handle,vendor,product_type,tags,body_html,variants,images,image,status";

/// One page of products, each decoded independently.
#[derive(Debug)]
pub struct FetchedPage {
    /// Raw record count, including records that failed to decode.
    pub len: usize,
    /// Id of the last record on the page, for the next `since_id`.
    pub last_id: Option<i64>,
    /// Decoded products in page order; failures are record-level errors.
    pub records: Vec<Result<Product, ShopifyError>>,
}

impl ShopifyClient {
    /// Fetches the active products with id greater than `since_id`, in id
    /// order.
    ///
    /// # Errors
    ///
    /// Propagates request errors from the paced, retried `GET`. Records that
    /// fail to decode are returned inside [`FetchedPage::records`] instead.
    pub async fn fetch_products_page(
        &self,
        since_id: i64,
        limit: u32,
    ) -> Result<FetchedPage, ShopifyError> {
        let mut url = self.endpoint("products.json")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("status", "active")
                .append_pair("limit", &limit.to_string())
                .append_pair("order", "id asc")
                .append_pair("fields", PRODUCT_FIELDS);
            if since_id > 0 {
                query.append_pair("since_id", &since_id.to_string());
            }
        }

        let page: ProductsPage = self
            .get_json(&url, &format!("products page after since_id={since_id}"))
            .await?;

        let len = page.products.len();
        let last_id = page
            .products
            .iter()
            .rev()
            .find_map(|value| value.get("id").and_then(serde_json::Value::as_i64));
        let records = page.products.into_iter().map(decode_product).collect();

        Ok(FetchedPage {
            len,
            last_id,
            records,
        })
    }

    /// Number of active products in the shop.
    ///
    /// # Errors
    ///
    /// Propagates request errors from the paced, retried `GET`.
    pub async fn count_products(&self) -> Result<u64, ShopifyError> {
        let mut url = self.endpoint("products/count.json")?;
        url.query_pairs_mut().append_pair("status", "active");
        let body: CountResponse = self.get_json(&url, "active product count").await?;
        Ok(body.count)
    }
}

fn decode_product(value: serde_json::Value) -> Result<Product, ShopifyError> {
    let product_id = value
        .get("id")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or_default();
    let raw: ShopifyProduct =
        serde_json::from_value(value).map_err(|e| ShopifyError::Normalization {
            product_id,
            reason: format!("unreadable product record: {e}"),
        })?;
    normalize_product(raw)
}
