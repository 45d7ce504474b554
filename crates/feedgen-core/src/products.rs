use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metafield namespace holding merchant-curated shopping attributes
/// (gender, color, material, ...).
pub const PLATFORM_NAMESPACE: &str = "mm-google-shopping";

/// Namespaced key/value attributes attached to a product or variant.
///
/// Keys are stored as `namespace -> key -> value`. The bag is ordered so
/// that iteration (and therefore any derived output) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetafieldBag(BTreeMap<String, BTreeMap<String, String>>);

impl MetafieldBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any existing value under the same
    /// namespace and key.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.0
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, namespace: &str, key: &str) -> Option<&str> {
        self.0
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .map(String::as_str)
    }

    /// All key/value pairs of one namespace, in key order.
    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Option<&BTreeMap<String, String>> {
        self.0.get(namespace)
    }

    /// Copies every entry of `other` into `self`; entries of `other` win.
    pub fn merge(&mut self, other: &MetafieldBag) {
        for (ns, entries) in &other.0 {
            let target = self.0.entry(ns.clone()).or_default();
            for (k, v) in entries {
                target.insert(k.clone(), v.clone());
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().flat_map(|(ns, entries)| {
            entries
                .iter()
                .map(move |(k, v)| (ns.as_str(), k.as_str(), v.as_str()))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    /// 1-based display position; images without one sort last.
    pub position: Option<i32>,
}

/// A catalog product in source-independent form.
///
/// Both the Shopify connector and the bulk database reader produce this
/// shape, so mapping never needs to know where a record came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub handle: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    /// Individual tags, already split and trimmed.
    pub tags: Vec<String>,
    /// Source lifecycle status: `"active"`, `"archived"`, or `"draft"`.
    pub status: String,
    /// Raw HTML description.
    pub body_html: Option<String>,
    /// Ordered by position; the first entry is the featured image.
    pub images: Vec<Image>,
    /// Titles of every collection the product belongs to. Empty until the
    /// product has been enriched.
    pub collections: Vec<String>,
    pub metafields: MetafieldBag,
    pub variants: Vec<Variant>,
}

impl Product {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }

    /// Returns `true` if at least one variant has stock on hand.
    #[must_use]
    pub fn has_stock(&self) -> bool {
        self.variants.iter().any(Variant::in_stock)
    }

    /// Sorts images by position, keeping source order for ties and for
    /// images without a position.
    pub fn sort_images(&mut self) {
        self.images
            .sort_by_key(|img| img.position.unwrap_or(i32::MAX));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub inventory_quantity: i64,
    pub metafields: MetafieldBag,
}

impl Variant {
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.inventory_quantity > 0
    }

    /// The non-empty option values, in option order.
    pub fn options(&self) -> impl Iterator<Item = &str> {
        [&self.option1, &self.option2, &self.option3]
            .into_iter()
            .filter_map(|o| o.as_deref())
            .filter(|o| !o.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(qty: i64) -> Variant {
        Variant {
            id: 1,
            sku: None,
            barcode: None,
            price: Decimal::new(1000, 2),
            compare_at_price: None,
            option1: Some("38".to_string()),
            option2: Some(String::new()),
            option3: Some("Personalizzazione".to_string()),
            inventory_quantity: qty,
            metafields: MetafieldBag::new(),
        }
    }

    #[test]
    fn metafield_merge_prefers_incoming_values() {
        let mut base = MetafieldBag::new();
        base.insert("mm-google-shopping", "color", "nero");
        base.insert("mm-google-shopping", "size", "38");

        let mut overlay = MetafieldBag::new();
        overlay.insert("mm-google-shopping", "color", "rosa");
        overlay.insert("reviews", "rating", "4.5");

        base.merge(&overlay);
        assert_eq!(base.get("mm-google-shopping", "color"), Some("rosa"));
        assert_eq!(base.get("mm-google-shopping", "size"), Some("38"));
        assert_eq!(base.get("reviews", "rating"), Some("4.5"));
    }

    #[test]
    fn metafield_iter_is_ordered() {
        let mut bag = MetafieldBag::new();
        bag.insert("b", "y", "2");
        bag.insert("a", "z", "1");
        bag.insert("b", "x", "3");
        let keys: Vec<_> = bag.iter().map(|(ns, k, _)| format!("{ns}.{k}")).collect();
        assert_eq!(keys, vec!["a.z", "b.x", "b.y"]);
    }

    #[test]
    fn empty_bag_reports_empty() {
        assert!(MetafieldBag::new().is_empty());
    }

    #[test]
    fn options_skip_blank_values() {
        let v = variant(1);
        let opts: Vec<_> = v.options().collect();
        assert_eq!(opts, vec!["38", "Personalizzazione"]);
    }

    #[test]
    fn stock_requires_positive_quantity() {
        assert!(variant(1).in_stock());
        assert!(!variant(0).in_stock());
        assert!(!variant(-3).in_stock());
    }

    #[test]
    fn sort_images_puts_unpositioned_last() {
        let mut p = Product {
            id: 1,
            title: "t".to_string(),
            handle: "t".to_string(),
            vendor: None,
            product_type: None,
            tags: vec![],
            status: "Active".to_string(),
            body_html: None,
            images: vec![
                Image { src: "c".to_string(), position: None },
                Image { src: "b".to_string(), position: Some(2) },
                Image { src: "a".to_string(), position: Some(1) },
            ],
            collections: vec![],
            metafields: MetafieldBag::new(),
            variants: vec![variant(0)],
        };
        p.sort_images();
        let order: Vec<_> = p.images.iter().map(|i| i.src.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(p.is_active());
        assert!(!p.has_stock());
    }
}
