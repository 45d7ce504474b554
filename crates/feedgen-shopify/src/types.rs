//! Admin REST API response types.
//!
//! ### Tags
//! The Admin API returns `tags` as one comma-separated string
//! (`"pizzo, nero, Converse"`); some proxies and older exports return an
//! array. Both shapes are accepted.
//!
//! ### Prices
//! Decimal strings (`"89.00"`). `compare_at_price` is `null` or `""` when
//! the variant is not on sale.
//!
//! ### Metafield values
//! Strings for most types, but JSON numbers and objects occur for typed
//! metafields (`rating`, `number_integer`). Values are kept as raw JSON and
//! rendered to text during normalization.

use serde::{Deserialize, Deserializer};

/// Top-level response from `GET products.json`, with each product left as
/// raw JSON so one malformed record does not fail the whole page.
#[derive(Debug, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub images: Vec<ShopifyImage>,
    /// Featured image; used when `images` is empty.
    #[serde(default)]
    pub image: Option<ShopifyImage>,
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyVariant {
    pub id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    pub price: String,
    #[serde(default)]
    pub compare_at_price: Option<String>,
    #[serde(default)]
    pub option1: Option<String>,
    #[serde(default)]
    pub option2: Option<String>,
    #[serde(default)]
    pub option3: Option<String>,
    /// Absent when inventory is not tracked; treated as zero.
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyImage {
    pub src: String,
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldsResponse {
    #[serde(default)]
    pub metafields: Vec<ShopifyMetafield>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyMetafield {
    pub namespace: String,
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl ShopifyMetafield {
    /// The value as text; `None` for `null`.
    #[must_use]
    pub fn value_text(&self) -> Option<String> {
        match &self.value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CollectionTitle {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomCollectionsResponse {
    #[serde(default)]
    pub custom_collections: Vec<CollectionTitle>,
}

#[derive(Debug, Deserialize)]
pub struct SmartCollectionsResponse {
    #[serde(default)]
    pub smart_collections: Vec<CollectionTitle>,
}

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    Text(String),
    List(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrList>::deserialize(deserializer)?;
    let items = match raw {
        None => Vec::new(),
        Some(StringOrList::Text(s)) => s.split(',').map(str::to_owned).collect(),
        Some(StringOrList::List(v)) => v,
    };
    Ok(items
        .into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect())
}
