//! Conversion from raw Admin API types to the canonical [`Product`].

use std::str::FromStr;

use feedgen_core::{Image, MetafieldBag, Product, Variant};
use rust_decimal::Decimal;

use crate::error::ShopifyError;
use crate::types::{ShopifyImage, ShopifyProduct, ShopifyVariant};

/// Normalizes a raw [`ShopifyProduct`] into a canonical [`Product`].
///
/// Collections and metafields are left empty; they are filled in by
/// enrichment.
///
/// # Errors
///
/// Returns [`ShopifyError::Normalization`] if the product has no variants
/// or a variant price is not a decimal.
pub fn normalize_product(raw: ShopifyProduct) -> Result<Product, ShopifyError> {
    if raw.variants.is_empty() {
        return Err(ShopifyError::Normalization {
            product_id: raw.id,
            reason: "product has no variants".into(),
        });
    }

    let product_id = raw.id;
    let variants = raw
        .variants
        .into_iter()
        .map(|v| normalize_variant(v, product_id))
        .collect::<Result<Vec<_>, _>>()?;

    let mut images: Vec<Image> = raw.images.into_iter().map(normalize_image).collect();
    if images.is_empty() {
        if let Some(featured) = raw.image {
            images.push(normalize_image(featured));
        }
    }

    let mut product = Product {
        id: raw.id,
        title: raw.title,
        handle: raw.handle,
        vendor: non_blank(raw.vendor),
        product_type: non_blank(raw.product_type),
        tags: raw.tags,
        status: non_blank(raw.status).unwrap_or_else(|| "active".to_string()),
        body_html: raw.body_html,
        images,
        collections: Vec::new(),
        metafields: MetafieldBag::new(),
        variants,
    };
    product.sort_images();
    Ok(product)
}

fn normalize_variant(raw: ShopifyVariant, product_id: i64) -> Result<Variant, ShopifyError> {
    let price = parse_price(&raw.price).ok_or_else(|| ShopifyError::Normalization {
        product_id,
        reason: format!("variant {} has invalid price \"{}\"", raw.id, raw.price),
    })?;

    let compare_at_price = match non_blank(raw.compare_at_price) {
        None => None,
        Some(text) => Some(parse_price(&text).ok_or_else(|| ShopifyError::Normalization {
            product_id,
            reason: format!("variant {} has invalid compare_at_price \"{text}\"", raw.id),
        })?),
    };

    Ok(Variant {
        id: raw.id,
        sku: non_blank(raw.sku),
        barcode: non_blank(raw.barcode),
        price,
        compare_at_price,
        option1: non_blank(raw.option1),
        option2: non_blank(raw.option2),
        option3: non_blank(raw.option3),
        inventory_quantity: raw.inventory_quantity.unwrap_or(0),
        metafields: MetafieldBag::new(),
    })
}

fn normalize_image(raw: ShopifyImage) -> Image {
    Image {
        src: raw.src,
        position: raw.position,
    }
}

fn parse_price(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim()).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
