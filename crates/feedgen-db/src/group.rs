//! Folding variant rows into canonical products.

use feedgen_core::{Image, MetafieldBag, Product, Variant};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::rows::OnlineProductRow;

/// Products built from one chunk of rows.
#[derive(Debug, Default)]
pub struct GroupedChunk {
    pub products: Vec<Product>,
    /// Variant rows dropped because they could not be read.
    pub skipped: usize,
}

/// Groups rows, already ordered by product id, into products.
///
/// Product-level columns are taken from a product's first row. Each row's
/// `MF_Google_*` columns become that variant's metafields. A row without a
/// usable price is skipped; a product left with no variants is dropped.
#[must_use]
pub fn group_rows(rows: Vec<OnlineProductRow>) -> GroupedChunk {
    let mut chunk = GroupedChunk::default();
    let mut current: Option<Product> = None;

    for row in rows {
        if current.as_ref().is_some_and(|p| p.id != row.product_id) {
            push_product(&mut chunk, current.take());
        }
        let product = current.get_or_insert_with(|| product_from_row(&row));

        match variant_from_row(&row) {
            Some(variant) => product.variants.push(variant),
            None => {
                tracing::warn!(
                    product_id = row.product_id,
                    variant_id = row.variant_id,
                    "skipping variant row without a valid price"
                );
                chunk.skipped += 1;
            }
        }
    }
    push_product(&mut chunk, current);
    chunk
}

fn push_product(chunk: &mut GroupedChunk, product: Option<Product>) {
    if let Some(product) = product.filter(|p| !p.variants.is_empty()) {
        chunk.products.push(product);
    }
}

fn product_from_row(row: &OnlineProductRow) -> Product {
    let mut product = Product {
        id: row.product_id,
        title: row.product_title.clone().unwrap_or_default(),
        handle: row
            .product_handle
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        vendor: non_blank(row.vendor.as_deref()),
        product_type: non_blank(row.product_type.as_deref()),
        tags: split_tags(row.tags.as_deref()),
        // The mirror only holds active products.
        status: "active".to_string(),
        body_html: row.body_html.clone(),
        images: parse_images(row.product_id, row.product_images.as_deref()),
        collections: parse_collections(row.collections.as_deref()),
        metafields: MetafieldBag::new(),
        variants: Vec::new(),
    };
    product.sort_images();
    product
}

fn variant_from_row(row: &OnlineProductRow) -> Option<Variant> {
    let price = row.price.filter(|p| *p >= Decimal::ZERO)?;
    Some(Variant {
        id: row.variant_id,
        sku: non_blank(row.sku.as_deref()),
        barcode: non_blank(row.barcode.as_deref()),
        price,
        compare_at_price: row.compare_at_price,
        option1: non_blank(row.variant_title.as_deref()),
        option2: None,
        option3: None,
        inventory_quantity: row.stock.unwrap_or(0),
        metafields: row.metafields(),
    })
}

/// Splits a comma-separated tag string into trimmed, non-empty tags.
#[must_use]
pub fn split_tags(tags: Option<&str>) -> Vec<String> {
    split_list(tags)
}

/// Splits the comma-separated collections column.
#[must_use]
pub fn parse_collections(collections: Option<&str>) -> Vec<String> {
    split_list(collections)
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
struct ImagesDocument {
    #[serde(default)]
    images: Vec<ImageEntry>,
}

#[derive(Deserialize)]
struct ImageEntry {
    #[serde(default)]
    src: Option<String>,
    #[serde(default)]
    position: Option<i32>,
}

/// Parses the images JSON column. A malformed document yields no images.
#[must_use]
pub fn parse_images(product_id: i64, json: Option<&str>) -> Vec<Image> {
    let Some(json) = json.map(str::trim).filter(|j| !j.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<ImagesDocument>(json) {
        Ok(doc) => doc
            .images
            .into_iter()
            .filter_map(|img| {
                let src = img.src?.trim().to_string();
                (!src.is_empty()).then_some(Image {
                    src,
                    position: img.position,
                })
            })
            .collect(),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "could not parse product images");
            Vec::new()
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "group_test.rs"]
mod tests;
