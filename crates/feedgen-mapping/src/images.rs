//! Primary and additional image selection.

use feedgen_core::{InteriorImageRule, Product};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    pub primary: String,
    pub additional: Vec<String>,
}

/// Picks the primary image and up to `max_additional` others, in position
/// order.
///
/// When the vendor matches an interior rule, the first image whose file
/// name contains that rule's marker becomes primary and is left out of the
/// additional list. Otherwise the first image is primary. Returns `None`
/// when the product has no usable image.
#[must_use]
pub fn select_images(
    product: &Product,
    rules: &[InteriorImageRule],
    max_additional: usize,
) -> Option<ImageSelection> {
    let sources: Vec<&str> = product
        .images
        .iter()
        .map(|img| img.src.trim())
        .filter(|src| !src.is_empty())
        .collect();
    if sources.is_empty() {
        return None;
    }

    let primary_idx = interior_marker(product, rules)
        .and_then(|marker| {
            sources
                .iter()
                .position(|src| file_name(src).to_lowercase().contains(&marker))
        })
        .unwrap_or(0);

    let additional = sources
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != primary_idx)
        .map(|(_, src)| (*src).to_string())
        .take(max_additional)
        .collect();

    Some(ImageSelection {
        primary: sources[primary_idx].to_string(),
        additional,
    })
}

fn interior_marker(product: &Product, rules: &[InteriorImageRule]) -> Option<String> {
    let vendor = product.vendor.as_deref()?.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            let brand = rule.brand.trim().to_lowercase();
            !brand.is_empty() && vendor.contains(&brand)
        })
        .map(|rule| rule.marker.trim().to_lowercase())
        .filter(|marker| !marker.is_empty())
}

/// Last path segment of an image URL, without the query string.
fn file_name(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, variant};
    use feedgen_core::Image;

    fn with_images(vendor: &str, srcs: &[&str]) -> Product {
        let mut p = product(vec![variant(1, 1)]);
        p.vendor = Some(vendor.to_string());
        p.images = srcs
            .iter()
            .enumerate()
            .map(|(i, src)| Image {
                src: (*src).to_string(),
                position: Some(i32::try_from(i).unwrap() + 1),
            })
            .collect();
        p
    }

    fn converse_rule() -> Vec<InteriorImageRule> {
        vec![InteriorImageRule {
            brand: "converse".to_string(),
            marker: "_int".to_string(),
        }]
    }

    #[test]
    fn first_image_is_primary_by_default() {
        let p = with_images("Adidas", &["a.jpg", "b_INT.jpg", "c.jpg"]);
        let sel = select_images(&p, &converse_rule(), 10).unwrap();
        assert_eq!(sel.primary, "a.jpg");
        assert_eq!(sel.additional, vec!["b_INT.jpg", "c.jpg"]);
    }

    #[test]
    fn interior_image_is_promoted_for_matching_brand() {
        let p = with_images(
            "CONVERSE",
            &[
                "https://cdn.example.com/files/chuck_1.jpg?v=1",
                "https://cdn.example.com/files/chuck_INT.jpg?v=2",
                "https://cdn.example.com/files/chuck_2.jpg?v=3",
            ],
        );
        let sel = select_images(&p, &converse_rule(), 10).unwrap();
        assert_eq!(sel.primary, "https://cdn.example.com/files/chuck_INT.jpg?v=2");
        assert_eq!(
            sel.additional,
            vec![
                "https://cdn.example.com/files/chuck_1.jpg?v=1",
                "https://cdn.example.com/files/chuck_2.jpg?v=3",
            ]
        );
    }

    #[test]
    fn marker_in_directory_name_does_not_count() {
        let p = with_images(
            "Converse",
            &["https://cdn.example.com/_int/a.jpg", "https://cdn.example.com/b.jpg"],
        );
        let sel = select_images(&p, &converse_rule(), 10).unwrap();
        assert_eq!(sel.primary, "https://cdn.example.com/_int/a.jpg");
    }

    #[test]
    fn matching_brand_without_interior_image_falls_back_to_first() {
        let p = with_images("Converse", &["a.jpg", "b.jpg"]);
        let sel = select_images(&p, &converse_rule(), 10).unwrap();
        assert_eq!(sel.primary, "a.jpg");
        assert_eq!(sel.additional, vec!["b.jpg"]);
    }

    #[test]
    fn additional_images_are_capped() {
        let srcs: Vec<String> = (0..30).map(|i| format!("img{i}.jpg")).collect();
        let refs: Vec<&str> = srcs.iter().map(String::as_str).collect();
        let p = with_images("Adidas", &refs);
        assert_eq!(select_images(&p, &[], 10).unwrap().additional.len(), 10);
        assert_eq!(select_images(&p, &[], 19).unwrap().additional.len(), 19);
    }

    #[test]
    fn no_images_selects_nothing() {
        let p = with_images("Adidas", &[" "]);
        assert_eq!(select_images(&p, &converse_rule(), 10), None);
    }
}
