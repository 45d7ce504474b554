//! The `online_products` table: one row per in-stock variant.

use feedgen_core::{MetafieldBag, PLATFORM_NAMESPACE};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

/// A row from `online_products`.
///
/// Integer columns are cast to `SIGNED` and the images column to `CHAR` in
/// the query, so the mapping does not depend on the mirror's exact column
/// types.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct OnlineProductRow {
    #[sqlx(rename = "Variant_id")]
    pub variant_id: i64,
    /// Holds the size (`"42"`).
    #[sqlx(rename = "Variant_Title")]
    pub variant_title: Option<String>,
    #[sqlx(rename = "SKU")]
    pub sku: Option<String>,
    #[sqlx(rename = "Barcode")]
    pub barcode: Option<String>,
    #[sqlx(rename = "Product_id")]
    pub product_id: i64,
    #[sqlx(rename = "Product_title")]
    pub product_title: Option<String>,
    #[sqlx(rename = "Product_handle")]
    pub product_handle: Option<String>,
    #[sqlx(rename = "Vendor")]
    pub vendor: Option<String>,
    #[sqlx(rename = "Product_Type")]
    pub product_type: Option<String>,
    #[sqlx(rename = "Price")]
    pub price: Option<Decimal>,
    #[sqlx(rename = "Compare_AT_Price")]
    pub compare_at_price: Option<Decimal>,
    #[sqlx(rename = "Stock_Magazzino")]
    pub stock: Option<i64>,
    /// Comma-separated.
    #[sqlx(rename = "Tags")]
    pub tags: Option<String>,
    /// Comma-separated collection titles.
    #[sqlx(rename = "Collections")]
    pub collections: Option<String>,
    #[sqlx(rename = "Body_HTML")]
    pub body_html: Option<String>,
    /// JSON document `{"images": [{"src": ..., "position": ...}]}`.
    #[sqlx(rename = "Product_Images")]
    pub product_images: Option<String>,
    #[sqlx(rename = "MF_Google_Gender")]
    pub mf_gender: Option<String>,
    #[sqlx(rename = "MF_Google_Age_Group")]
    pub mf_age_group: Option<String>,
    #[sqlx(rename = "MF_Google_Condition")]
    pub mf_condition: Option<String>,
    #[sqlx(rename = "MF_Google_Color")]
    pub mf_color: Option<String>,
    #[sqlx(rename = "MF_Google_Size")]
    pub mf_size: Option<String>,
    #[sqlx(rename = "MF_Google_Material")]
    pub mf_material: Option<String>,
    #[sqlx(rename = "MF_Google_MPN")]
    pub mf_mpn: Option<String>,
    #[sqlx(rename = "MF_Google_Size_System")]
    pub mf_size_system: Option<String>,
    #[sqlx(rename = "MF_Google_Size_Type")]
    pub mf_size_type: Option<String>,
    #[sqlx(rename = "MF_Google_Custom_Label_0")]
    pub mf_custom_label_0: Option<String>,
    #[sqlx(rename = "MF_Google_Custom_Label_1")]
    pub mf_custom_label_1: Option<String>,
    #[sqlx(rename = "MF_Google_Custom_Label_2")]
    pub mf_custom_label_2: Option<String>,
    #[sqlx(rename = "MF_Google_Custom_Label_3")]
    pub mf_custom_label_3: Option<String>,
    #[sqlx(rename = "MF_Google_Custom_Label_4")]
    pub mf_custom_label_4: Option<String>,
    #[sqlx(rename = "MF_Google_Product_Category")]
    pub mf_product_category: Option<String>,
}

impl OnlineProductRow {
    /// The `MF_Google_*` columns as platform-namespace metafields. Null and
    /// blank columns are left out.
    #[must_use]
    pub fn metafields(&self) -> MetafieldBag {
        let columns = [
            ("gender", &self.mf_gender),
            ("age_group", &self.mf_age_group),
            ("condition", &self.mf_condition),
            ("color", &self.mf_color),
            ("size", &self.mf_size),
            ("material", &self.mf_material),
            ("mpn", &self.mf_mpn),
            ("size_system", &self.mf_size_system),
            ("size_type", &self.mf_size_type),
            ("custom_label_0", &self.mf_custom_label_0),
            ("custom_label_1", &self.mf_custom_label_1),
            ("custom_label_2", &self.mf_custom_label_2),
            ("custom_label_3", &self.mf_custom_label_3),
            ("custom_label_4", &self.mf_custom_label_4),
            ("google_product_category", &self.mf_product_category),
        ];

        let mut bag = MetafieldBag::new();
        for (key, value) in columns {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                bag.insert(PLATFORM_NAMESPACE, key, v);
            }
        }
        bag
    }
}

/// Rows of the next `limit` in-stock products with an id above
/// `after_product_id`, ordered by product then variant.
///
/// The derived table bounds the chunk by product, so a product's variants
/// are never split across two chunks.
const CHUNK_QUERY: &str = "\
SELECT
    CAST(op.Variant_id AS SIGNED) AS Variant_id,
    op.Variant_Title, op.SKU, op.Barcode,
    CAST(op.Product_id AS SIGNED) AS Product_id,
    op.Product_title, op.Product_handle, op.Vendor, op.Product_Type,
    op.Price, op.Compare_AT_Price,
    CAST(op.Stock_Magazzino AS SIGNED) AS Stock_Magazzino,
    op.Tags, op.Collections, op.Body_HTML,
    CAST(op.Product_Images AS CHAR) AS Product_Images,
    op.MF_Google_Gender, op.MF_Google_Age_Group, op.MF_Google_Condition,
    op.MF_Google_Color, op.MF_Google_Size, op.MF_Google_Material, op.MF_Google_MPN,
    op.MF_Google_Size_System, op.MF_Google_Size_Type,
    op.MF_Google_Custom_Label_0, op.MF_Google_Custom_Label_1,
    op.MF_Google_Custom_Label_2, op.MF_Google_Custom_Label_3,
    op.MF_Google_Custom_Label_4, op.MF_Google_Product_Category
FROM online_products op
JOIN (
    SELECT DISTINCT Product_id
    FROM online_products
    WHERE Stock_Magazzino > 0 AND Product_id > ?
    ORDER BY Product_id
    LIMIT ?
) chunk ON chunk.Product_id = op.Product_id
WHERE op.Stock_Magazzino > 0
ORDER BY op.Product_id, op.Variant_id";

/// Fetches one product-keyed chunk of rows.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails or a row cannot be decoded.
pub async fn fetch_chunk(
    pool: &MySqlPool,
    after_product_id: i64,
    limit: u32,
) -> Result<Vec<OnlineProductRow>, sqlx::Error> {
    sqlx::query_as::<_, OnlineProductRow>(CHUNK_QUERY)
        .bind(after_product_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Number of distinct in-stock products.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_products(pool: &MySqlPool) -> Result<u64, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT Product_id) FROM online_products WHERE Stock_Magazzino > 0",
    )
    .fetch_one(pool)
    .await?;
    Ok(u64::try_from(count).unwrap_or(0))
}
