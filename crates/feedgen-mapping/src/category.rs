//! Hierarchical product type built from the configured category map.

use feedgen_core::{CategoryMap, Product};

use crate::text::non_blank;

/// `Macro > Brand > Model`, e.g. `Sneakers > Adidas > Samba`.
///
/// The macro category comes from the product type through `categories`.
/// Brand is omitted when the product has no vendor; model is omitted when
/// blank or equal to the macro category.
#[must_use]
pub fn hierarchical_product_type(product: &Product, categories: &CategoryMap) -> String {
    let model = non_blank(product.product_type.as_deref());
    let macro_category = categories.macro_category(model.unwrap_or_default());

    let mut parts = vec![macro_category];
    if let Some(brand) = non_blank(product.vendor.as_deref()) {
        parts.push(brand);
    }
    if let Some(model) = model.filter(|m| *m != macro_category) {
        parts.push(model);
    }
    parts.join(" > ")
}
