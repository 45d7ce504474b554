//! Google Merchant Center items.

use feedgen_core::{FeedItem, MetafieldBag, Product, ProductDetail, Variant};

use crate::attributes::platform_attr;
use crate::common::{base_item, brand_and_model, custom_labels, size_suffix};
use crate::error::MappingError;
use crate::mapper::{FeedMapper, MapperContext};
use crate::tags::tag_details;
use crate::text::{non_blank, truncate_with_ellipsis};

pub const TITLE_LIMIT: usize = 150;
pub const MAX_ADDITIONAL_IMAGES: usize = 10;
/// Feature tags appended to the title, at most.
const MAX_TITLE_FEATURES: usize = 2;

/// Tags containing one of these read as a color or style feature worth
/// putting in the title.
const FEATURE_KEYWORDS: &[&str] = &[
    "burgundy",
    "bordeaux",
    "pizzo",
    "kawaii",
    "glitter",
    "charms",
    "fiocco",
    "metallizzato",
    "vintage",
    "patent",
    "nero",
    "bianco",
    "rosa",
    "blu",
    "verde",
    "rosso",
];

pub struct GoogleMapper {
    ctx: MapperContext,
}

impl GoogleMapper {
    #[must_use]
    pub fn new(ctx: MapperContext) -> Self {
        Self { ctx }
    }

    /// `Brand Model [Color] [features] Taglia {size}`, capped at
    /// [`TITLE_LIMIT`].
    fn title(product: &Product, variant: &Variant, metafields: &MetafieldBag) -> String {
        let mut parts = brand_and_model(product);
        if let Some(color) = platform_attr(metafields, "color") {
            parts.push(color.to_string());
        }

        let present: Vec<String> = parts.iter().map(|p| p.to_lowercase()).collect();
        let features = product
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| {
                let lowered = tag.to_lowercase();
                FEATURE_KEYWORDS
                    .iter()
                    .any(|kw| lowered.contains(kw) && !present.iter().any(|p| p == kw))
            })
            .take(MAX_TITLE_FEATURES)
            .map(str::to_string)
            .collect::<Vec<_>>();
        parts.extend(features);

        if let Some(size) = size_suffix(variant) {
            parts.push(size);
        }
        truncate_with_ellipsis(&parts.join(" "), TITLE_LIMIT)
    }

    fn highlights(&self, product: &Product, variant: &Variant) -> Vec<String> {
        if let Some(curated) = self.override_for(product, variant) {
            if !curated.highlights.is_empty() {
                return curated.highlights.clone();
            }
        }

        let mut highlights = Vec::with_capacity(3);
        if let Some(brand) = non_blank(product.vendor.as_deref()) {
            highlights.push(format!("{brand} Original"));
        }
        highlights.push("100% Personalizzabili".to_string());
        highlights.push("Fatto a mano in Italia".to_string());
        highlights
    }

    fn details(&self, product: &Product, variant: &Variant) -> Vec<ProductDetail> {
        if let Some(curated) = self.override_for(product, variant) {
            if !curated.details.is_empty() {
                return curated
                    .details
                    .iter()
                    .map(|d| ProductDetail {
                        name: d.name.clone(),
                        value: d.value.clone(),
                    })
                    .collect();
            }
        }
        tag_details(&product.tags, &self.ctx.config.product_details)
    }

    fn override_for(
        &self,
        product: &Product,
        variant: &Variant,
    ) -> Option<&feedgen_core::ProductOverride> {
        let sku = non_blank(variant.sku.as_deref())?;
        self.ctx.config.product_override(product.handle.trim(), sku)
    }
}

impl FeedMapper for GoogleMapper {
    fn platform_name(&self) -> &'static str {
        "google"
    }

    fn transform(
        &self,
        product: &Product,
        variant: &Variant,
        metafields: &MetafieldBag,
        collections: &[String],
    ) -> Result<FeedItem, MappingError> {
        let statics = &self.ctx.config.static_values;
        let mut item = base_item(&self.ctx, product, variant, metafields, MAX_ADDITIONAL_IMAGES)?;

        item.title = Self::title(product, variant, metafields);
        item.size_system = non_blank(Some(statics.size_system.as_str())).map(str::to_string);
        item.product_details = self.details(product, variant);
        item.product_highlights = self.highlights(product, variant);
        item.custom_labels = custom_labels(&self.ctx, collections);
        // Shoes are sold as a pair.
        item.is_bundle = Some(true);

        Ok(item)
    }
}

#[cfg(test)]
#[path = "google_test.rs"]
mod tests;
