//! Review rating and count from third-party review app metafields.

use feedgen_core::{MetafieldBag, ReviewSummary};

/// Review apps, in lookup order.
const REVIEW_NAMESPACES: &[&str] = &["stamped", "reviews", "judgeme", "loox", "spr"];

const RATING_KEYS: &[&str] = &[
    "reviews_average",
    "rating",
    "reviews_rating",
    "avg_rating",
    "product_rating",
    "average_rating",
];

const COUNT_KEYS: &[&str] = &[
    "reviews_count",
    "count",
    "review_count",
    "num_reviews",
    "number_of_reviews",
    "total_reviews",
];

/// The first rating in `0..=5` and the first positive count found across the
/// known review namespaces. Both or neither: a rating without a count (or
/// the reverse) yields `None`.
#[must_use]
pub fn review_summary(metafields: &MetafieldBag) -> Option<ReviewSummary> {
    let rating = find_value(metafields, RATING_KEYS, parse_rating)?;
    let count = find_value(metafields, COUNT_KEYS, parse_count)?;
    Some(ReviewSummary { rating, count })
}

fn find_value<T>(
    metafields: &MetafieldBag,
    keys: &[&str],
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    REVIEW_NAMESPACES.iter().find_map(|ns| {
        keys.iter()
            .find_map(|key| metafields.get(ns, key).and_then(&parse))
    })
}

fn parse_rating(raw: &str) -> Option<f64> {
    let value = scalar(raw).parse::<f64>().ok()?;
    (value.is_finite() && (0.0..=5.0).contains(&value)).then_some(value)
}

fn parse_count(raw: &str) -> Option<u32> {
    let text = scalar(raw);
    let count = match text.parse::<u32>() {
        Ok(count) => count,
        Err(_) => {
            // Some apps store counts as floats ("12.0").
            let f = text.parse::<f64>().ok()?;
            if f.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&f) {
                return None;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = f as u32;
            whole
        }
    };
    (count > 0).then_some(count)
}

/// Strips JSON string quoting that typed metafields sometimes carry.
fn scalar(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}
