//! Integration tests for `ShopifyClient` and `ShopifySource`.
//!
//! Each test stands up a local `wiremock` server; pacing and backoff are
//! set to zero so nothing sleeps.

use feedgen_core::CatalogSource;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedgen_shopify::{ClientSettings, ShopifyClient, ShopifyError, ShopifySource};

const API: &str = "/admin/api/2024-10";

fn settings(server: &MockServer, max_retries: u32) -> ClientSettings {
    ClientSettings {
        shop_url: server.uri(),
        access_token: "shpat_test".to_owned(),
        api_version: "2024-10".to_owned(),
        timeout_secs: 5,
        user_agent: "feedgen-test/0.1".to_owned(),
        max_retries,
        backoff_base_ms: 0,
        min_request_interval_ms: 0,
    }
}

fn test_client(server: &MockServer) -> ShopifyClient {
    ShopifyClient::new(&settings(server, 0)).expect("failed to build test client")
}

fn test_client_with_retries(server: &MockServer, max_retries: u32) -> ShopifyClient {
    ShopifyClient::new(&settings(server, max_retries)).expect("failed to build test client")
}

fn product_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Converse Chuck {id}"),
        "handle": format!("converse-chuck-{id}"),
        "vendor": "Converse",
        "product_type": "Sneakers",
        "tags": "pizzo, nero",
        "status": "active",
        "body_html": "<p>Fatte a mano</p>",
        "images": [{"src": format!("https://cdn.example.com/{id}.jpg"), "position": 1}],
        "variants": [{
            "id": id * 100,
            "sku": format!("SKU-{id}"),
            "price": "89.00",
            "compare_at_price": null,
            "option1": "38",
            "inventory_quantity": 2
        }]
    })
}

fn page_json(ids: &[i64]) -> serde_json::Value {
    json!({ "products": ids.iter().map(|id| product_json(*id)).collect::<Vec<_>>() })
}

async fn drain(source: &mut ShopifySource) -> (Vec<i64>, usize) {
    let mut ids = Vec::new();
    let mut skipped = 0;
    while let Some(page) = source.next_page().await.expect("page should load") {
        ids.extend(page.products.iter().map(|p| p.id));
        skipped += page.skipped;
    }
    (ids, skipped)
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pages_are_chained_by_since_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .and(query_param("since_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[3])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1, 2])))
        .expect(1)
        .mount(&server)
        .await;

    let mut source = ShopifySource::new(test_client(&server), 2);
    let (ids, skipped) = drain(&mut source).await;

    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(skipped, 0);
    assert!(source.cursor().is_done());
}

#[tokio::test]
async fn empty_catalog_yields_no_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;

    let mut source = ShopifySource::new(test_client(&server), 250);
    assert!(source.next_page().await.unwrap().is_none());
    assert!(source.next_page().await.unwrap().is_none());
}

#[tokio::test]
async fn rewind_starts_a_new_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[7])))
        .expect(2)
        .mount(&server)
        .await;

    let mut source = ShopifySource::new(test_client(&server), 250);
    let (first, _) = drain(&mut source).await;
    source.rewind();
    let (second, _) = drain(&mut source).await;

    assert_eq!(first, vec![7]);
    assert_eq!(second, vec![7]);
}

#[tokio::test]
async fn malformed_record_is_skipped_and_cursor_still_advances() {
    let server = MockServer::start().await;
    let body = json!({
        "products": [
            product_json(1),
            {"id": 2, "title": "Broken", "handle": "broken", "variants": [{"id": 200, "price": "abc"}]},
            {"id": 3, "handle": "no-title"}
        ]
    });
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .and(query_param("since_id", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let mut source = ShopifySource::new(test_client(&server), 3);
    let (ids, skipped) = drain(&mut source).await;

    assert_eq!(ids, vec![1]);
    assert_eq!(skipped, 2);
    assert_eq!(source.cursor().since_id(), 3);
}

// ---------------------------------------------------------------------------
// Retries and quota
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_request_is_repeated_with_same_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 2);
    let page = client.fetch_products_page(0, 250).await.unwrap();
    assert_eq!(page.last_id, Some(1));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.query(), requests[1].url.query());
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products/count.json")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products/count.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 412})))
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 3);
    assert_eq!(client.count_products().await.unwrap(), 412);
}

#[tokio::test]
async fn server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 2);
    let err = client.fetch_products_page(0, 250).await.unwrap_err();
    assert!(
        matches!(err, ShopifyError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn client_error_fails_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 3);
    let err = client.fetch_products_page(0, 250).await.unwrap_err();
    assert!(
        matches!(err, ShopifyError::UnexpectedStatus { status: 401, .. }),
        "expected UnexpectedStatus(401), got: {err:?}"
    );
}

#[tokio::test]
async fn call_limit_header_is_observed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "36/40")
                .set_body_json(json!({"products": []})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.fetch_products_page(0, 250).await.unwrap();
    assert_eq!(client.pacer().last_quota(), Some((4, 40)));
}

#[tokio::test]
async fn unparseable_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_products_page(0, 250)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ShopifyError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enrich_loads_metafields_and_collections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[5])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products/5/metafields.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metafields": [
                {"namespace": "mm-google-shopping", "key": "gender", "value": "female"},
                {"namespace": "reviews", "key": "rating", "value": 4.6},
                {"namespace": "reviews", "key": "count", "value": 12}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/custom_collections.json")))
        .and(query_param("product_id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "custom_collections": [{"title": "Sposa"}, {"title": "  "}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/smart_collections.json")))
        .and(query_param("product_id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "smart_collections": [{"title": "Novità"}]
        })))
        .mount(&server)
        .await;

    let mut source = ShopifySource::new(test_client(&server), 250);
    let mut page = source.next_page().await.unwrap().expect("one page");
    let product = &mut page.products[0];
    source.enrich(product).await.unwrap();

    assert_eq!(product.collections, vec!["Sposa", "Novità"]);
    assert_eq!(
        product.metafields.get("mm-google-shopping", "gender"),
        Some("female")
    );
    assert_eq!(product.metafields.get("reviews", "rating"), Some("4.6"));
    assert_eq!(product.metafields.get("reviews", "count"), Some("12"));
}

#[tokio::test]
async fn enrich_of_deleted_product_is_record_level() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/products/9/metafields.json")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.fetch_metafields(9).await.unwrap_err();
    assert!(
        matches!(err, ShopifyError::ProductGone { product_id: 9 }),
        "expected ProductGone, got: {err:?}"
    );
    assert!(ShopifySource::is_record_level(&err));
}
