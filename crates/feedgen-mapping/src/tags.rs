//! Tag-driven attributes: pattern label and structured product details.

use feedgen_core::{DetailRule, PatternRule, ProductDetail};

/// Most `product_detail` entries derived from tags for one item.
pub const MAX_TAG_DETAILS: usize = 3;

/// Returns the label of the first rule whose needle occurs in any tag.
///
/// Rules are tried in order, so table order is precedence. Matching is a
/// case-insensitive substring test.
#[must_use]
pub fn match_pattern<'a>(tags: &[String], rules: &'a [PatternRule]) -> Option<&'a str> {
    let lowered: Vec<String> = tags.iter().map(|t| t.trim().to_lowercase()).collect();
    rules.iter().find_map(|rule| {
        let needle = rule.needle.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        lowered
            .iter()
            .any(|tag| tag.contains(&needle))
            .then_some(rule.label.as_str())
    })
}

/// Details for tags that equal a rule's tag (trimmed, case-insensitive), in
/// tag order, at most [`MAX_TAG_DETAILS`].
#[must_use]
pub fn tag_details(tags: &[String], rules: &[DetailRule]) -> Vec<ProductDetail> {
    tags.iter()
        .filter_map(|tag| {
            let tag = tag.trim().to_lowercase();
            rules
                .iter()
                .find(|rule| rule.tag.trim().to_lowercase() == tag)
        })
        .take(MAX_TAG_DETAILS)
        .map(|rule| ProductDetail {
            name: rule.name.clone(),
            value: rule.value.clone(),
        })
        .collect()
}
