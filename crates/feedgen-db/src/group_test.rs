use feedgen_core::PLATFORM_NAMESPACE;

use super::*;

fn row(product_id: i64, variant_id: i64, size: &str) -> OnlineProductRow {
    OnlineProductRow {
        variant_id,
        variant_title: Some(size.to_string()),
        sku: Some(format!("RL-{variant_id}")),
        barcode: Some(String::new()),
        product_id,
        product_title: Some(format!("Product {product_id}")),
        product_handle: Some(format!("product-{product_id}")),
        vendor: Some("Nike".to_string()),
        product_type: Some("Air Force 1".to_string()),
        price: Some(Decimal::new(14_900, 2)),
        compare_at_price: None,
        stock: Some(2),
        tags: Some("pizzo nero, Sneakers,, ".to_string()),
        collections: Some("Sposa, Novità".to_string()),
        body_html: Some("<p>Ciao</p>".to_string()),
        product_images: Some(
            r#"{"count": 2, "images": [
                {"id": 9, "src": "https://cdn.example.com/b.jpg", "position": 2},
                {"id": 8, "src": "https://cdn.example.com/a.jpg", "position": 1}
            ], "featured": "https://cdn.example.com/a.jpg"}"#
                .to_string(),
        ),
        ..OnlineProductRow::default()
    }
}

#[test]
fn consecutive_rows_become_one_product() {
    let rows = vec![row(1, 10, "38"), row(1, 11, "39"), row(2, 20, "40")];
    let chunk = group_rows(rows);

    assert_eq!(chunk.products.len(), 2);
    assert_eq!(chunk.skipped, 0);
    let first = &chunk.products[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.status, "active");
    let sizes: Vec<_> = first
        .variants
        .iter()
        .map(|v| v.option1.as_deref().unwrap())
        .collect();
    assert_eq!(sizes, vec!["38", "39"]);
    assert_eq!(chunk.products[1].variants[0].id, 20);
}

#[test]
fn product_columns_are_normalized() {
    let chunk = group_rows(vec![row(1, 10, "38")]);
    let p = &chunk.products[0];

    assert_eq!(p.tags, vec!["pizzo nero", "Sneakers"]);
    assert_eq!(p.collections, vec!["Sposa", "Novità"]);
    assert_eq!(p.vendor.as_deref(), Some("Nike"));
    let srcs: Vec<_> = p.images.iter().map(|i| i.src.as_str()).collect();
    assert_eq!(
        srcs,
        vec!["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.jpg"]
    );

    let v = &p.variants[0];
    assert_eq!(v.barcode, None);
    assert_eq!(v.sku.as_deref(), Some("RL-10"));
    assert_eq!(v.inventory_quantity, 2);
}

#[test]
fn google_columns_become_variant_metafields() {
    let mut r = row(1, 10, "38");
    r.mf_gender = Some("female".to_string());
    r.mf_color = Some(" Nero ".to_string());
    r.mf_material = Some("  ".to_string());
    let chunk = group_rows(vec![r]);

    let v = &chunk.products[0].variants[0];
    assert_eq!(v.metafields.get(PLATFORM_NAMESPACE, "gender"), Some("female"));
    assert_eq!(v.metafields.get(PLATFORM_NAMESPACE, "color"), Some("Nero"));
    assert_eq!(v.metafields.get(PLATFORM_NAMESPACE, "material"), None);
    assert!(chunk.products[0].metafields.is_empty());
}

#[test]
fn row_without_price_is_skipped() {
    let mut broken = row(1, 11, "39");
    broken.price = None;
    let chunk = group_rows(vec![row(1, 10, "38"), broken]);

    assert_eq!(chunk.skipped, 1);
    assert_eq!(chunk.products[0].variants.len(), 1);
}

#[test]
fn product_with_no_readable_variant_is_dropped() {
    let mut broken = row(1, 10, "38");
    broken.price = Some(Decimal::new(-1, 0));
    let chunk = group_rows(vec![broken, row(2, 20, "40")]);

    assert_eq!(chunk.skipped, 1);
    assert_eq!(chunk.products.len(), 1);
    assert_eq!(chunk.products[0].id, 2);
}

#[test]
fn no_rows_no_products() {
    let chunk = group_rows(Vec::new());
    assert!(chunk.products.is_empty());
    assert_eq!(chunk.skipped, 0);
}

#[test]
fn malformed_images_json_yields_no_images() {
    assert!(parse_images(1, Some("{not json")).is_empty());
    assert!(parse_images(1, None).is_empty());
    assert!(parse_images(1, Some(r#"{"images": [{"src": ""}, {"position": 1}]}"#)).is_empty());
}

#[test]
fn empty_lists_split_to_nothing() {
    assert!(split_tags(None).is_empty());
    assert!(parse_collections(Some(" , ,")).is_empty());
}
