pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod rate_limit;
pub mod source;
pub mod types;

pub use client::{admin_base_url, ClientSettings, FetchedPage, ShopifyClient};
pub use error::ShopifyError;
pub use normalize::normalize_product;
pub use pagination::SinceIdCursor;
pub use rate_limit::{PacingPolicy, QuotaPacer};
pub use source::{ShopifySource, MAX_PAGE_SIZE};
pub use types::{ShopifyImage, ShopifyProduct, ShopifyVariant};
