//! Per-product sub-fetches: metafields and collection memberships.

use feedgen_core::MetafieldBag;

use super::ShopifyClient;
use crate::error::ShopifyError;
use crate::types::{CustomCollectionsResponse, MetafieldsResponse, SmartCollectionsResponse};

impl ShopifyClient {
    /// Metafields of one product as a namespace → key → value bag.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::ProductGone`] if the product no longer exists,
    /// otherwise propagates request errors.
    pub async fn fetch_metafields(&self, product_id: i64) -> Result<MetafieldBag, ShopifyError> {
        let mut url = self.endpoint(&format!("products/{product_id}/metafields.json"))?;
        url.query_pairs_mut().append_pair("limit", "250");

        let body: MetafieldsResponse = self
            .get_json(&url, &format!("metafields of product {product_id}"))
            .await
            .map_err(|e| gone_if_missing(e, product_id))?;

        let mut bag = MetafieldBag::new();
        for field in body.metafields {
            if let Some(value) = field.value_text() {
                bag.insert(field.namespace, field.key, value);
            }
        }
        Ok(bag)
    }

    /// Titles of the custom and smart collections containing the product,
    /// custom first. Blank titles are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::ProductGone`] if the product no longer exists,
    /// otherwise propagates request errors.
    pub async fn fetch_collections(&self, product_id: i64) -> Result<Vec<String>, ShopifyError> {
        let id = product_id.to_string();

        let mut custom_url = self.endpoint("custom_collections.json")?;
        custom_url.query_pairs_mut().append_pair("product_id", &id);
        let custom: CustomCollectionsResponse = self
            .get_json(&custom_url, &format!("custom collections of product {product_id}"))
            .await
            .map_err(|e| gone_if_missing(e, product_id))?;

        let mut smart_url = self.endpoint("smart_collections.json")?;
        smart_url.query_pairs_mut().append_pair("product_id", &id);
        let smart: SmartCollectionsResponse = self
            .get_json(&smart_url, &format!("smart collections of product {product_id}"))
            .await
            .map_err(|e| gone_if_missing(e, product_id))?;

        Ok(custom
            .custom_collections
            .into_iter()
            .chain(smart.smart_collections)
            .map(|c| c.title.trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect())
    }
}

fn gone_if_missing(err: ShopifyError, product_id: i64) -> ShopifyError {
    match err {
        ShopifyError::NotFound { .. } => ShopifyError::ProductGone { product_id },
        other => other,
    }
}
