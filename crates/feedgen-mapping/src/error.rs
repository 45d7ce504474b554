use thiserror::Error;

/// A variant that could not be turned into a feed item.
///
/// Always record-level: the caller logs it with the ids and moves on to the
/// next variant.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("product {product_id} has no handle; cannot build a product link")]
    MissingHandle { product_id: i64 },

    #[error("product {product_id} has no images; image_link is required")]
    MissingImage { product_id: i64 },

    #[error("variant {variant_id} has a negative price {price}")]
    NegativePrice {
        variant_id: i64,
        price: rust_decimal::Decimal,
    },
}
