use chrono::{TimeZone, Utc};
use feedgen_core::{
    Availability, FeedItem, Money, ProductDetail, ReviewSummary, Shipping,
};
use feedgen_writer::{
    ChannelInfo, FeedFormat, StreamWriter, ATOM_NS, GOOGLE_NS, WRITE_BUFFER_BYTES,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn channel() -> ChannelInfo {
    ChannelInfo {
        title: "Racoon Lab".to_string(),
        link: "https://racoon-lab.it".to_string(),
        description: "Sneakers personalizzate".to_string(),
        updated: Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap(),
    }
}

fn eur(cents: i64) -> Money {
    Money::new(Decimal::new(cents, 2), "EUR")
}

fn full_item() -> FeedItem {
    let mut item = FeedItem::new("4401", eur(12_000));
    item.title = "Adidas Samba Taglia 38".to_string();
    item.description = "Sneakers personalizzate a mano".to_string();
    item.link = "https://racoon-lab.it/products/samba?variant=4401".to_string();
    item.image_link = "https://cdn.example.com/samba_1.jpg".to_string();
    item.additional_image_links = vec![
        "https://cdn.example.com/samba_2.jpg".to_string(),
        "https://cdn.example.com/samba_3.jpg".to_string(),
    ];
    item.availability = Availability::InStock;
    item.sale_price = Some(eur(8900));
    item.brand = "Adidas".to_string();
    item.gtin = Some("8051234567890".to_string());
    item.mpn = Some("RL-SAMBA-4401".to_string());
    item.google_product_category = "187".to_string();
    item.product_type = Some("Sneakers > Adidas > Samba".to_string());
    item.gender = "unisex".to_string();
    item.age_group = "adult".to_string();
    item.size = Some("38".to_string());
    item.pattern = Some("Pizzo".to_string());
    item.product_details = vec![ProductDetail {
        name: "Materiale".to_string(),
        value: "Pizzo".to_string(),
    }];
    item.product_highlights = vec!["Adidas Original".to_string()];
    item.item_group_id = Some("42".to_string());
    item.shipping = Some(Shipping {
        country: "IT".to_string(),
        price: eur(0),
    });
    item.custom_labels[0] = Some("Sposa, Novità".to_string());
    item.custom_labels[2] = Some("Personalizzate".to_string());
    item.is_bundle = Some(true);
    item.reviews = Some(ReviewSummary {
        rating: 4.6,
        count: 12,
    });
    item.internal_labels = vec!["pizzo nero".to_string(), "Sposa".to_string()];
    item
}

/// Root attributes and the `(element, text)` pairs of every item.
struct Parsed {
    root: String,
    root_attrs: Vec<(String, String)>,
    items: Vec<Vec<(String, String)>>,
}

fn parse(xml: &str, item_element: &str) -> Parsed {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = String::new();
    let mut root_attrs = Vec::new();
    let mut items = Vec::new();
    let mut current: Option<Vec<(String, String)>> = None;
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                if root.is_empty() {
                    root.clone_from(&name);
                    for attr in e.attributes() {
                        let attr = attr.unwrap();
                        root_attrs.push((
                            String::from_utf8(attr.key.as_ref().to_vec()).unwrap(),
                            attr.unescape_value().unwrap().into_owned(),
                        ));
                    }
                }
                if name == item_element {
                    current = Some(Vec::new());
                }
                open.push(name);
            }
            Event::Text(t) => {
                if let (Some(fields), Some(name)) = (current.as_mut(), open.last()) {
                    fields.push((name.clone(), t.unescape().unwrap().into_owned()));
                }
            }
            Event::CData(c) => {
                if let (Some(fields), Some(name)) = (current.as_mut(), open.last()) {
                    let text = String::from_utf8(c.into_inner().into_owned()).unwrap();
                    fields.push((name.clone(), text));
                }
            }
            Event::End(e) => {
                open.pop();
                if e.name().as_ref() == item_element.as_bytes() {
                    items.extend(current.take());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Parsed {
        root,
        root_attrs,
        items,
    }
}

fn value<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

fn values<'a>(fields: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Document shapes
// ---------------------------------------------------------------------------

#[test]
fn atom_document_round_trips_through_a_parser() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("google_feed.xml");

    let mut w = StreamWriter::create(&path, FeedFormat::Atom).unwrap();
    w.start(&channel()).unwrap();
    w.add_item(&full_item()).unwrap();
    let summary = w.close().unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<updated>2026-03-01T06:00:00Z</updated>"));
    assert!(xml.contains("<link rel=\"self\" href=\"https://racoon-lab.it\"/>"));
    assert_eq!(summary.bytes_written, xml.len() as u64);
    assert_eq!(summary.path, path);

    let parsed = parse(&xml, "entry");
    assert_eq!(parsed.root, "feed");
    assert!(parsed
        .root_attrs
        .contains(&("xmlns".to_string(), ATOM_NS.to_string())));
    assert!(parsed
        .root_attrs
        .contains(&("xmlns:g".to_string(), GOOGLE_NS.to_string())));
    assert_eq!(parsed.items.len(), 1);

    let fields = &parsed.items[0];
    assert_eq!(value(fields, "g:id"), Some("4401"));
    assert_eq!(value(fields, "g:price"), Some("120.00 EUR"));
    assert_eq!(value(fields, "g:sale_price"), Some("89.00 EUR"));
    assert_eq!(value(fields, "g:availability"), Some("in stock"));
    assert_eq!(values(fields, "g:additional_image_link").len(), 2);
    assert_eq!(value(fields, "g:attribute_name"), Some("Materiale"));
    assert_eq!(value(fields, "g:attribute_value"), Some("Pizzo"));
    assert_eq!(value(fields, "g:shipping"), Some("IT:::0.00 EUR"));
    assert_eq!(value(fields, "g:custom_label_0"), Some("Sposa, Novità"));
    assert_eq!(value(fields, "g:custom_label_1"), None);
    assert_eq!(value(fields, "g:custom_label_2"), Some("Personalizzate"));
    assert_eq!(value(fields, "g:is_bundle"), Some("TRUE"));
    assert_eq!(value(fields, "g:product_rating"), Some("4.6"));
    assert_eq!(value(fields, "g:product_review_count"), Some("12"));
    assert_eq!(
        values(fields, "g:internal_label"),
        vec!["pizzo nero", "Sposa"]
    );
}

#[test]
fn rss_document_nests_items_in_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta_feed.xml");

    let mut w = StreamWriter::create(&path, FeedFormat::Rss).unwrap();
    w.start(&channel()).unwrap();
    for id in ["1", "2", "3"] {
        let mut it = full_item();
        it.id = id.to_string();
        w.add_item(&it).unwrap();
    }
    w.close().unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains("<channel>"));
    assert!(xml.trim_end().ends_with("</rss>"));

    let parsed = parse(&xml, "item");
    assert_eq!(parsed.root, "rss");
    assert!(parsed
        .root_attrs
        .contains(&("version".to_string(), "2.0".to_string())));
    let ids: Vec<&str> = parsed
        .items
        .iter()
        .filter_map(|f| value(f, "g:id"))
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn empty_feed_is_still_a_valid_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.xml");
    let mut w = StreamWriter::create(&path, FeedFormat::Atom).unwrap();
    w.start(&channel()).unwrap();
    let summary = w.close().unwrap();

    assert_eq!(summary.items_written, 0);
    let parsed = parse(&std::fs::read_to_string(&path).unwrap(), "entry");
    assert_eq!(parsed.root, "feed");
    assert!(parsed.items.is_empty());
}

// ---------------------------------------------------------------------------
// Atomic publish
// ---------------------------------------------------------------------------

#[test]
fn dropping_before_close_leaves_previous_feed_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("google_feed.xml");
    std::fs::write(&path, b"<feed>previous</feed>").unwrap();

    {
        let mut w = StreamWriter::create(&path, FeedFormat::Atom).unwrap();
        w.start(&channel()).unwrap();
        for i in 0..50 {
            let mut it = full_item();
            it.id = i.to_string();
            w.add_item(&it).unwrap();
        }
    }

    assert_eq!(std::fs::read(&path).unwrap(), b"<feed>previous</feed>");
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "temporary file left behind: {leftovers:?}");
}

#[test]
fn close_replaces_previous_feed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("google_feed.xml");
    std::fs::write(&path, b"old").unwrap();

    let mut w = StreamWriter::create(&path, FeedFormat::Atom).unwrap();
    w.start(&channel()).unwrap();
    w.add_item(&full_item()).unwrap();
    w.close().unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains("<g:id>4401</g:id>"));
}

#[test]
fn hundred_thousand_items_keep_memory_flat() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.xml");

    let mut w = StreamWriter::create(&path, FeedFormat::Rss).unwrap();
    w.start(&channel()).unwrap();
    let mut it = full_item();
    for i in 0..100_000u32 {
        it.id = i.to_string();
        w.add_item(&it).unwrap();

        if i % 10_000 == 9_999 {
            // Only the fixed-size buffer is held in memory; the rest is
            // already in the temporary file.
            assert!(w.buffered_bytes() <= WRITE_BUFFER_BYTES);
            let on_disk = temp_file_len(dir.path());
            assert!(on_disk + WRITE_BUFFER_BYTES as u64 >= w.bytes_written());
            assert!(on_disk > 0);
        }
    }
    let summary = w.close().unwrap();

    assert_eq!(summary.items_written, 100_000);
    let on_disk = std::fs::metadata(&path).unwrap().len();
    assert_eq!(summary.bytes_written, on_disk);
    assert!(on_disk > 100 * WRITE_BUFFER_BYTES as u64);
    let xml = std::fs::read_to_string(&path).unwrap();
    assert_eq!(xml.matches("<item>").count(), 100_000);
}

fn temp_file_len(dir: &std::path::Path) -> u64 {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .map(|e| e.metadata().unwrap().len())
        .sum()
}
