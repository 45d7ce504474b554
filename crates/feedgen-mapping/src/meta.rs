//! Meta (Facebook and Instagram) catalog items.

use feedgen_core::{FeedItem, MetafieldBag, Product, Variant};

use crate::attributes::italian_gender;
use crate::common::{base_item, brand_and_model, custom_labels, size_suffix};
use crate::error::MappingError;
use crate::mapper::{FeedMapper, MapperContext};
use crate::pricing::shipping;
use crate::text::truncate_with_ellipsis;

pub const TITLE_LIMIT: usize = 65;
/// One primary plus 19 additional images.
pub const MAX_ADDITIONAL_IMAGES: usize = 19;
const SIZE_SYSTEM: &str = "EU";

pub struct MetaMapper {
    ctx: MapperContext,
}

impl MetaMapper {
    #[must_use]
    pub fn new(ctx: MapperContext) -> Self {
        Self { ctx }
    }

    /// `Brand Model [Donna|Uomo|Unisex] Taglia {size}`, capped at
    /// [`TITLE_LIMIT`]. The gender word only appears when the merchant set
    /// one in metafields.
    fn title(product: &Product, variant: &Variant, metafields: &MetafieldBag) -> String {
        let mut parts = brand_and_model(product);
        if let Some(gender) = italian_gender(metafields) {
            parts.push(gender);
        }
        if let Some(size) = size_suffix(variant) {
            parts.push(size);
        }
        truncate_with_ellipsis(&parts.join(" "), TITLE_LIMIT)
    }

    /// One label per tag, then one per collection.
    fn internal_labels(product: &Product, collections: &[String]) -> Vec<String> {
        product
            .tags
            .iter()
            .chain(collections)
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl FeedMapper for MetaMapper {
    fn platform_name(&self) -> &'static str {
        "meta"
    }

    fn transform(
        &self,
        product: &Product,
        variant: &Variant,
        metafields: &MetafieldBag,
        collections: &[String],
    ) -> Result<FeedItem, MappingError> {
        let mut item = base_item(&self.ctx, product, variant, metafields, MAX_ADDITIONAL_IMAGES)?;

        item.title = Self::title(product, variant, metafields);
        item.size_system = Some(SIZE_SYSTEM.to_string());
        item.shipping = Some(shipping(
            variant.price,
            &self.ctx.config.shipping,
            &self.ctx.currency,
        ));
        item.status = Some("active".to_string());
        item.inventory = Some(1);
        item.custom_labels = custom_labels(&self.ctx, collections);
        item.internal_labels = Self::internal_labels(product, collections);
        item.rich_text_description = product
            .body_html
            .clone()
            .filter(|html| !html.trim().is_empty());

        Ok(item)
    }
}

#[cfg(test)]
#[path = "meta_test.rs"]
mod tests;
