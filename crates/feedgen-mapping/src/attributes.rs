//! Attributes read from the flattened metafield bag.

use feedgen_core::{MetafieldBag, Product, StaticValues, Variant};

use crate::text::non_blank;

pub use feedgen_core::PLATFORM_NAMESPACE;

const GENDERS: &[&str] = &["male", "female", "unisex"];
const AGE_GROUPS: &[&str] = &["newborn", "infant", "toddler", "kids", "adult"];

/// Product metafields overlaid with the variant's own, which win on
/// conflicting keys.
#[must_use]
pub fn flatten_metafields(product: &Product, variant: &Variant) -> MetafieldBag {
    let mut bag = product.metafields.clone();
    bag.merge(&variant.metafields);
    bag
}

/// A trimmed, non-empty platform attribute.
#[must_use]
pub fn platform_attr<'a>(metafields: &'a MetafieldBag, key: &str) -> Option<&'a str> {
    non_blank(metafields.get(PLATFORM_NAMESPACE, key))
}

/// The metafield gender when it is one of the accepted values, otherwise
/// the configured default. Always lowercase.
#[must_use]
pub fn gender(metafields: &MetafieldBag, statics: &StaticValues) -> String {
    vocabulary_value(metafields, "gender", GENDERS, &statics.default_gender)
}

#[must_use]
pub fn age_group(metafields: &MetafieldBag, statics: &StaticValues) -> String {
    vocabulary_value(metafields, "age_group", AGE_GROUPS, &statics.default_age_group)
}

fn vocabulary_value(
    metafields: &MetafieldBag,
    key: &str,
    accepted: &[&str],
    default: &str,
) -> String {
    match platform_attr(metafields, key).map(str::to_lowercase) {
        Some(value) if accepted.contains(&value.as_str()) => value,
        Some(value) => {
            tracing::debug!(key, value = %value, default, "unrecognized metafield value, using default");
            default.to_lowercase()
        }
        None => default.to_lowercase(),
    }
}

/// Italian label for a gender metafield (`female` → `Donna`). Unknown values
/// pass through unchanged; `None` when the metafield is absent.
#[must_use]
pub fn italian_gender(metafields: &MetafieldBag) -> Option<String> {
    let raw = platform_attr(metafields, "gender")?;
    let label = match raw.to_lowercase().as_str() {
        "female" => "Donna".to_string(),
        "male" => "Uomo".to_string(),
        "unisex" => "Unisex".to_string(),
        _ => raw.to_string(),
    };
    Some(label)
}
