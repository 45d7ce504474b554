//! Product- and variant-level exclusion rules, applied before any mapping.

use feedgen_core::{Filters, Product, Variant};

/// Why a product or variant produced no feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Inactive,
    ExcludedTitle,
    ExcludedProductType,
    NoStock,
    Customization,
}

impl DropReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::Inactive => "inactive",
            DropReason::ExcludedTitle => "excluded_title",
            DropReason::ExcludedProductType => "excluded_product_type",
            DropReason::NoStock => "no_stock",
            DropReason::Customization => "customization_variant",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks the whole-product rules in order: status, title markers, product
/// type markers, then stock. The first failing rule is returned.
#[must_use]
pub fn product_drop_reason(product: &Product, filters: &Filters) -> Option<DropReason> {
    if !product.is_active() {
        return Some(DropReason::Inactive);
    }

    if contains_any(&product.title, &filters.excluded_title_markers) {
        return Some(DropReason::ExcludedTitle);
    }

    if let Some(product_type) = product.product_type.as_deref() {
        if contains_any(product_type, &filters.excluded_product_types) {
            return Some(DropReason::ExcludedProductType);
        }
    }

    if !product.has_stock() {
        return Some(DropReason::NoStock);
    }

    None
}

/// `true` when any option value of the variant contains the customization
/// marker, case-insensitively.
#[must_use]
pub fn is_customization_variant(variant: &Variant, marker: &str) -> bool {
    let marker = marker.trim().to_lowercase();
    if marker.is_empty() {
        return false;
    }
    variant
        .options()
        .any(|value| value.to_lowercase().contains(&marker))
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .map(|n| n.trim().to_lowercase())
        .any(|n| !n.is_empty() && haystack.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, variant};

    #[test]
    fn active_stocked_product_passes() {
        let p = product(vec![variant(1, 2)]);
        assert_eq!(product_drop_reason(&p, &Filters::default()), None);
    }

    #[test]
    fn inactive_product_is_dropped_first() {
        let mut p = product(vec![variant(1, 0)]);
        p.status = "draft".to_string();
        p.title = "Outlet Samba".to_string();
        assert_eq!(
            product_drop_reason(&p, &Filters::default()),
            Some(DropReason::Inactive)
        );
    }

    #[test]
    fn status_comparison_ignores_case() {
        let mut p = product(vec![variant(1, 1)]);
        p.status = "ACTIVE".to_string();
        assert_eq!(product_drop_reason(&p, &Filters::default()), None);
    }

    #[test]
    fn title_marker_excludes_product() {
        let mut p = product(vec![variant(1, 1)]);
        p.title = "Samba OUTLET pizzo".to_string();
        assert_eq!(
            product_drop_reason(&p, &Filters::default()),
            Some(DropReason::ExcludedTitle)
        );
    }

    #[test]
    fn product_type_marker_excludes_product() {
        let mut p = product(vec![variant(1, 1)]);
        p.product_type = Some("Gift Card".to_string());
        assert_eq!(
            product_drop_reason(&p, &Filters::default()),
            Some(DropReason::ExcludedProductType)
        );
    }

    #[test]
    fn product_without_stock_is_dropped() {
        let p = product(vec![variant(1, 0), variant(2, -3)]);
        assert_eq!(
            product_drop_reason(&p, &Filters::default()),
            Some(DropReason::NoStock)
        );
    }

    #[test]
    fn customization_marker_matches_any_option_slot() {
        let mut v = variant(1, 1);
        assert!(!is_customization_variant(&v, "personalizzazione"));

        v.option3 = Some("Con PERSONALIZZAZIONE nome".to_string());
        assert!(is_customization_variant(&v, "personalizzazione"));

        v.option3 = None;
        v.option2 = Some("Personalizzazione".to_string());
        assert!(is_customization_variant(&v, "Personalizzazione"));
    }

    #[test]
    fn blank_marker_never_matches() {
        let v = variant(1, 1);
        assert!(!is_customization_variant(&v, "  "));
    }
}
