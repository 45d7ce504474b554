//! Fixtures shared by the unit tests.

use feedgen_core::{Image, MetafieldBag, Product, Variant};
use rust_decimal::Decimal;

pub(crate) fn variant(id: i64, inventory_quantity: i64) -> Variant {
    Variant {
        id,
        sku: Some(format!("RL-SAMBA-{id}")),
        barcode: None,
        price: Decimal::new(8900, 2),
        compare_at_price: None,
        option1: Some("38".to_string()),
        option2: None,
        option3: None,
        inventory_quantity,
        metafields: MetafieldBag::new(),
    }
}

pub(crate) fn product(variants: Vec<Variant>) -> Product {
    Product {
        id: 42,
        title: "Adidas Samba OG Pizzo".to_string(),
        handle: "samba-og-pizzo".to_string(),
        vendor: Some("Adidas".to_string()),
        product_type: Some("Samba".to_string()),
        tags: vec!["pizzo nero".to_string(), "Sneakers".to_string()],
        status: "active".to_string(),
        body_html: Some("<p>Sneakers <b>personalizzate</b> a mano</p>".to_string()),
        images: vec![
            Image {
                src: "https://cdn.example.com/samba_1.jpg".to_string(),
                position: Some(1),
            },
            Image {
                src: "https://cdn.example.com/samba_2.jpg".to_string(),
                position: Some(2),
            },
        ],
        collections: vec!["Sposa".to_string(), "Novità".to_string()],
        metafields: MetafieldBag::new(),
        variants,
    }
}
