use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability {
    InStock,
    OutOfStock,
}

impl Availability {
    #[must_use]
    pub fn from_quantity(quantity: i64) -> Self {
        if quantity > 0 {
            Availability::InStock
        } else {
            Availability::OutOfStock
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::InStock => "in stock",
            Availability::OutOfStock => "out of stock",
        }
    }
}

/// An amount with its ISO 4217 currency code.
///
/// Always rendered with exactly two decimals, e.g. `120.00 EUR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// The amount alone, with two decimals (`"6.00"`).
    #[must_use]
    pub fn amount_str(&self) -> String {
        let mut rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        rounded.to_string()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount_str(), self.currency)
    }
}

/// A single flat shipping rate for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipping {
    pub country: String,
    pub price: Money,
}

impl std::fmt::Display for Shipping {
    /// Renders the compact `COUNTRY:::PRICE` form, e.g. `IT:::6.00 EUR`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:::{}", self.country, self.price)
    }
}

/// A structured name/value attribute (`product_detail`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewSummary {
    /// Average rating in `0.0..=5.0`.
    pub rating: f64,
    /// Always positive.
    pub count: u32,
}

impl ReviewSummary {
    #[must_use]
    pub fn rating_str(&self) -> String {
        format!("{:.1}", self.rating)
    }
}

/// One destination-ready record for a (Product, Variant) pair.
///
/// Required fields are plain values; optional fields are omitted from the
/// output when `None` or empty. List fields emit one element per entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub image_link: String,
    pub additional_image_links: Vec<String>,
    pub availability: Availability,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub brand: String,
    pub condition: String,
    pub gtin: Option<String>,
    pub mpn: Option<String>,
    pub google_product_category: String,
    pub product_type: Option<String>,
    pub gender: String,
    pub age_group: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub size_system: Option<String>,
    pub material: Option<String>,
    pub pattern: Option<String>,
    pub product_details: Vec<ProductDetail>,
    pub product_highlights: Vec<String>,
    pub item_group_id: Option<String>,
    pub shipping: Option<Shipping>,
    /// `custom_label_0` through `custom_label_4`.
    pub custom_labels: [Option<String>; 5],
    pub reviews: Option<ReviewSummary>,
    pub is_bundle: Option<bool>,
    pub status: Option<String>,
    pub inventory: Option<u32>,
    pub internal_labels: Vec<String>,
    pub rich_text_description: Option<String>,
}

impl FeedItem {
    /// An item with every required field set and every optional field empty.
    #[must_use]
    pub fn new(id: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            link: String::new(),
            image_link: String::new(),
            additional_image_links: Vec::new(),
            availability: Availability::OutOfStock,
            price,
            sale_price: None,
            brand: String::new(),
            condition: "new".to_string(),
            gtin: None,
            mpn: None,
            google_product_category: String::new(),
            product_type: None,
            gender: String::new(),
            age_group: String::new(),
            color: None,
            size: None,
            size_system: None,
            material: None,
            pattern: None,
            product_details: Vec::new(),
            product_highlights: Vec::new(),
            item_group_id: None,
            shipping: None,
            custom_labels: Default::default(),
            reviews: None,
            is_bundle: None,
            status: None,
            inventory: None,
            internal_labels: Vec::new(),
            rich_text_description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_renders_two_decimals() {
        assert_eq!(Money::new(Decimal::new(120, 0), "EUR").to_string(), "120.00 EUR");
        assert_eq!(Money::new(Decimal::new(895, 1), "EUR").to_string(), "89.50 EUR");
        assert_eq!(Money::new(Decimal::new(12_345, 3), "EUR").to_string(), "12.35 EUR");
    }

    #[test]
    fn shipping_renders_compact_form() {
        let s = Shipping {
            country: "IT".to_string(),
            price: Money::new(Decimal::ZERO, "EUR"),
        };
        assert_eq!(s.to_string(), "IT:::0.00 EUR");
    }

    #[test]
    fn availability_follows_quantity() {
        assert_eq!(Availability::from_quantity(2).as_str(), "in stock");
        assert_eq!(Availability::from_quantity(0).as_str(), "out of stock");
    }

    #[test]
    fn rating_renders_one_decimal() {
        let r = ReviewSummary { rating: 4.76, count: 12 };
        assert_eq!(r.rating_str(), "4.8");
    }
}
