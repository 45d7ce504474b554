//! Fields every destination fills the same way.

use feedgen_core::{Availability, FeedItem, MetafieldBag, Product, Variant};

use crate::attributes::{age_group, gender, platform_attr};
use crate::category::hierarchical_product_type;
use crate::error::MappingError;
use crate::images::select_images;
use crate::labels::split_collection_labels;
use crate::mapper::MapperContext;
use crate::pricing::price_pair;
use crate::reviews::review_summary;
use crate::tags::match_pattern;
use crate::text::{clean_html, non_blank};

/// Builds the shared part of an item. The caller sets the title and any
/// destination-only fields.
pub(crate) fn base_item(
    ctx: &MapperContext,
    product: &Product,
    variant: &Variant,
    metafields: &MetafieldBag,
    max_additional_images: usize,
) -> Result<FeedItem, MappingError> {
    let config = &ctx.config;
    let statics = &config.static_values;

    let handle = non_blank(Some(product.handle.as_str())).ok_or(MappingError::MissingHandle {
        product_id: product.id,
    })?;
    let images = select_images(product, &config.interior_images, max_additional_images).ok_or(
        MappingError::MissingImage {
            product_id: product.id,
        },
    )?;
    let (price, sale_price) = price_pair(variant, &ctx.currency)?;

    let mut item = FeedItem::new(variant.id.to_string(), price);
    item.sale_price = sale_price;
    item.description = clean_html(product.body_html.as_deref().unwrap_or_default());
    item.link = product_link(&ctx.base_url, handle, variant.id);
    item.image_link = images.primary;
    item.additional_image_links = images.additional;
    item.availability = Availability::from_quantity(variant.inventory_quantity);
    item.brand = brand(product, &statics.fallback_brand);
    item.condition.clone_from(&statics.condition);
    item.gtin = non_blank(variant.barcode.as_deref()).map(str::to_string);
    item.mpn = non_blank(variant.sku.as_deref()).map(str::to_string);
    item.google_product_category
        .clone_from(&statics.google_product_category);
    item.product_type = Some(hierarchical_product_type(product, &config.categories));
    item.gender = gender(metafields, statics);
    item.age_group = age_group(metafields, statics);
    item.color = platform_attr(metafields, "color").map(str::to_string);
    item.material = platform_attr(metafields, "material").map(str::to_string);
    item.size = non_blank(variant.option1.as_deref()).map(str::to_string);
    item.pattern = match_pattern(&product.tags, &config.patterns).map(str::to_string);
    item.item_group_id = Some(product.id.to_string());
    item.reviews = review_summary(metafields);

    Ok(item)
}

/// `{base}/products/{handle}?variant={id}`.
#[must_use]
pub fn product_link(base_url: &str, handle: &str, variant_id: i64) -> String {
    format!(
        "{}/products/{handle}?variant={variant_id}",
        base_url.trim_end_matches('/')
    )
}

/// Vendor, or the configured fallback when the product has none.
pub(crate) fn brand(product: &Product, fallback: &str) -> String {
    non_blank(product.vendor.as_deref())
        .unwrap_or(fallback)
        .to_string()
}

/// `custom_label_0`/`1` from the collection split, `2`..`4` from static
/// values. Empty values are left unset.
pub(crate) fn custom_labels(ctx: &MapperContext, collections: &[String]) -> [Option<String>; 5] {
    let statics = &ctx.config.static_values;
    let (short, long) = split_collection_labels(collections, ctx.config.labels);
    [
        short,
        long,
        statics.custom_label_2.clone(),
        statics.custom_label_3.clone(),
        statics.custom_label_4.clone(),
    ]
    .map(|label| {
        let trimmed = label.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Title parts shared by every destination: brand then model, both only
/// when present.
pub(crate) fn brand_and_model(product: &Product) -> Vec<String> {
    [product.vendor.as_deref(), product.product_type.as_deref()]
        .into_iter()
        .filter_map(non_blank)
        .map(str::to_string)
        .collect()
}

/// `Taglia {size}` from option 1.
pub(crate) fn size_suffix(variant: &Variant) -> Option<String> {
    non_blank(variant.option1.as_deref()).map(|size| format!("Taglia {size}"))
}
