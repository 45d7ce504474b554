//! The destination mapper contract and the per-product driver.

use std::sync::Arc;

use feedgen_core::{
    DestinationConfig, DestinationKind, FeedConfig, FeedItem, Filters, MetafieldBag, Product,
    Variant,
};

use crate::attributes::flatten_metafields;
use crate::error::MappingError;
use crate::filters::{is_customization_variant, product_drop_reason, DropReason};
use crate::google::GoogleMapper;
use crate::meta::MetaMapper;

/// Turns one (product, variant) pair into a destination item.
///
/// `transform` is pure: the same inputs always give the same item. Product
/// and variant filters are applied by [`map_product`] before it is called.
pub trait FeedMapper: Send + Sync {
    fn platform_name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns a [`MappingError`] when the pair cannot produce a valid item.
    fn transform(
        &self,
        product: &Product,
        variant: &Variant,
        metafields: &MetafieldBag,
        collections: &[String],
    ) -> Result<FeedItem, MappingError>;
}

/// Inputs every mapper needs besides the record itself.
#[derive(Debug, Clone)]
pub struct MapperContext {
    pub config: Arc<FeedConfig>,
    /// Storefront origin for item links, without a trailing slash.
    pub base_url: String,
    pub currency: String,
}

impl MapperContext {
    #[must_use]
    pub fn new(config: Arc<FeedConfig>, base_url: &str, destination: &DestinationConfig) -> Self {
        Self {
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
            currency: destination.currency.clone(),
        }
    }
}

/// The mapper for a destination kind.
#[must_use]
pub fn mapper_for(kind: DestinationKind, context: MapperContext) -> Box<dyn FeedMapper> {
    match kind {
        DestinationKind::Google => Box::new(GoogleMapper::new(context)),
        DestinationKind::Meta => Box::new(MetaMapper::new(context)),
    }
}

/// What one product produced.
#[derive(Debug, Default)]
pub struct ProductMapping {
    /// Items in variant order.
    pub items: Vec<FeedItem>,
    /// Set when the whole product was filtered out.
    pub dropped: Option<DropReason>,
    /// Variants dropped by the customization marker.
    pub customization_variants: usize,
    /// Variants whose transform failed; each is logged.
    pub failed_variants: usize,
}

/// Applies the filters to `product` and maps each surviving variant.
///
/// Product rules short-circuit: a dropped product never reaches
/// `transform`. A failing variant is logged and skipped without affecting
/// its siblings.
pub fn map_product(mapper: &dyn FeedMapper, filters: &Filters, product: &Product) -> ProductMapping {
    let mut out = ProductMapping::default();

    if let Some(reason) = product_drop_reason(product, filters) {
        tracing::debug!(
            product_id = product.id,
            reason = %reason,
            destination = mapper.platform_name(),
            "product filtered out"
        );
        out.dropped = Some(reason);
        return out;
    }

    for variant in &product.variants {
        if is_customization_variant(variant, &filters.customization_marker) {
            out.customization_variants += 1;
            continue;
        }

        let metafields = flatten_metafields(product, variant);
        match mapper.transform(product, variant, &metafields, &product.collections) {
            Ok(item) => out.items.push(item),
            Err(e) => {
                tracing::warn!(
                    product_id = product.id,
                    variant_id = variant.id,
                    destination = mapper.platform_name(),
                    error = %e,
                    "skipping variant that failed to map"
                );
                out.failed_variants += 1;
            }
        }
    }

    out
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
