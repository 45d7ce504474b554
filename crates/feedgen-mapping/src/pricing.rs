//! Price pair and flat-rate shipping.

use feedgen_core::{Money, Shipping, ShippingTiers, Variant};
use rust_decimal::Decimal;

use crate::error::MappingError;

/// Regular and sale price for a variant.
///
/// With a positive compare-at price, that amount is the regular price and
/// the unit price is the sale price. Otherwise only the unit price is set.
///
/// # Errors
///
/// Returns [`MappingError::NegativePrice`] if the unit price is negative.
pub fn price_pair(variant: &Variant, currency: &str) -> Result<(Money, Option<Money>), MappingError> {
    if variant.price < Decimal::ZERO {
        return Err(MappingError::NegativePrice {
            variant_id: variant.id,
            price: variant.price,
        });
    }

    match variant.compare_at_price {
        Some(compare_at) if compare_at > Decimal::ZERO => Ok((
            Money::new(compare_at, currency),
            Some(Money::new(variant.price, currency)),
        )),
        _ => Ok((Money::new(variant.price, currency), None)),
    }
}

/// Three-tier flat shipping cost for a unit price: free at or above the
/// free threshold, the mid rate strictly above the mid threshold, the base
/// rate otherwise.
#[must_use]
pub fn shipping_cost(unit_price: Decimal, tiers: &ShippingTiers) -> Decimal {
    if unit_price >= tiers.free_threshold {
        Decimal::ZERO
    } else if unit_price > tiers.mid_threshold {
        tiers.mid_rate
    } else {
        tiers.base_rate
    }
}

#[must_use]
pub fn shipping(unit_price: Decimal, tiers: &ShippingTiers, currency: &str) -> Shipping {
    Shipping {
        country: tiers.country.clone(),
        price: Money::new(shipping_cost(unit_price, tiers), currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::variant;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn compare_at_becomes_price_and_unit_price_becomes_sale() {
        let mut v = variant(1, 1);
        v.price = dec("89.00");
        v.compare_at_price = Some(dec("120.00"));
        let (price, sale) = price_pair(&v, "EUR").unwrap();
        assert_eq!(price.to_string(), "120.00 EUR");
        assert_eq!(sale.unwrap().to_string(), "89.00 EUR");
    }

    #[test]
    fn zero_or_missing_compare_at_has_no_sale_price() {
        let mut v = variant(1, 1);
        v.price = dec("89");

        v.compare_at_price = Some(Decimal::ZERO);
        let (price, sale) = price_pair(&v, "EUR").unwrap();
        assert_eq!(price.to_string(), "89.00 EUR");
        assert!(sale.is_none());

        v.compare_at_price = None;
        assert!(price_pair(&v, "EUR").unwrap().1.is_none());
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut v = variant(7, 1);
        v.price = dec("-1.00");
        assert!(matches!(
            price_pair(&v, "EUR"),
            Err(MappingError::NegativePrice { variant_id: 7, .. })
        ));
    }

    #[test]
    fn shipping_tiers() {
        let tiers = ShippingTiers::default();
        assert_eq!(shipping_cost(dec("89.00"), &tiers), Decimal::ZERO);
        assert_eq!(shipping_cost(dec("150"), &tiers), Decimal::ZERO);
        assert_eq!(shipping_cost(dec("88.99"), &tiers), dec("10"));
        assert_eq!(shipping_cost(dec("30.01"), &tiers), dec("10"));
        assert_eq!(shipping_cost(dec("30.00"), &tiers), dec("6"));
        assert_eq!(shipping_cost(dec("5"), &tiers), dec("6"));
    }

    #[test]
    fn shipping_renders_country_and_cost() {
        let tiers = ShippingTiers::default();
        assert_eq!(shipping(dec("25"), &tiers, "EUR").to_string(), "IT:::6.00 EUR");
        assert_eq!(shipping(dec("95"), &tiers, "EUR").to_string(), "IT:::0.00 EUR");
    }
}
