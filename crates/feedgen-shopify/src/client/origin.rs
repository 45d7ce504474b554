//! Admin API base URL construction.

use crate::error::ShopifyError;

/// Builds `{origin}/admin/api/{version}` from a configured shop URL.
///
/// Accepts a bare host (`racoon-lab.myshopify.com`, https is assumed) or a
/// full URL; any path on the configured value is dropped.
///
/// # Errors
///
/// Returns [`ShopifyError::InvalidShopUrl`] if the value is empty or has no
/// host.
pub fn admin_base_url(shop_url: &str, api_version: &str) -> Result<String, ShopifyError> {
    let trimmed = shop_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ShopifyError::InvalidShopUrl {
            shop_url: shop_url.to_owned(),
            reason: "shop URL is empty".to_owned(),
        });
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = reqwest::Url::parse(&with_scheme).map_err(|e| ShopifyError::InvalidShopUrl {
        shop_url: shop_url.to_owned(),
        reason: e.to_string(),
    })?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ShopifyError::InvalidShopUrl {
            shop_url: shop_url.to_owned(),
            reason: "shop URL has no host".to_owned(),
        });
    }

    let version = api_version.trim().trim_matches('/');
    Ok(format!(
        "{}/admin/api/{version}",
        parsed.origin().ascii_serialization()
    ))
}
