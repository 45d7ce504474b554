use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    /// Google Merchant Center, Atom document.
    Google,
    /// Meta (Facebook/Instagram) catalog, RSS 2.0 document.
    Meta,
}

impl std::fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DestinationKind::Google => write!(f, "google"),
            DestinationKind::Meta => write!(f, "meta"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub name: String,
    pub kind: DestinationKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub feed_filename: String,
    pub title: Option<String>,
    /// Channel link; the storefront base URL when unset.
    pub link: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl DestinationConfig {
    #[must_use]
    pub fn title_or_default(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Racoon Lab - {} Feed", capitalize(&self.name)))
    }

    #[must_use]
    pub fn description_or_default(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Product catalog for {}", self.name))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub backup_previous_feed: bool,
    pub collect_metrics: bool,
    pub metrics_filename: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            backup_previous_feed: true,
            collect_metrics: true,
            metrics_filename: "feed_metrics.json".to_string(),
        }
    }
}

/// Product type → macro category, used for the hierarchical product type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMap {
    pub mappings: BTreeMap<String, String>,
    pub default: String,
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self {
            mappings: BTreeMap::new(),
            default: "Sneakers".to_string(),
        }
    }
}

impl CategoryMap {
    #[must_use]
    pub fn macro_category(&self, product_type: &str) -> &str {
        self.mappings
            .get(product_type)
            .map_or(self.default.as_str(), String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticValues {
    pub condition: String,
    pub google_product_category: String,
    pub size_system: String,
    pub default_gender: String,
    pub default_age_group: String,
    /// Brand used when a product has no vendor.
    pub fallback_brand: String,
    pub custom_label_2: String,
    pub custom_label_3: String,
    pub custom_label_4: String,
}

impl Default for StaticValues {
    fn default() -> Self {
        Self {
            condition: "new".to_string(),
            google_product_category: "187".to_string(),
            size_system: "IT".to_string(),
            default_gender: "female".to_string(),
            default_age_group: "adult".to_string(),
            fallback_brand: "Racoon Lab".to_string(),
            custom_label_2: String::new(),
            custom_label_3: String::new(),
            custom_label_4: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Case-insensitive substrings that exclude a product by title.
    pub excluded_title_markers: Vec<String>,
    /// Case-insensitive substrings that exclude a product by product type.
    pub excluded_product_types: Vec<String>,
    /// A variant with this text in any option value is dropped.
    pub customization_marker: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            excluded_title_markers: vec!["outlet".to_string()],
            excluded_product_types: [
                "buon", "gift", "pacco", "berretti", "calze", "calzi", "shirt", "felp",
                "stringhe", "outlet",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            customization_marker: "personalizzazione".to_string(),
        }
    }
}

/// One entry of the ordered tag → pattern table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub needle: String,
    pub label: String,
}

/// A tag that, matched exactly (case-insensitive), adds a `product_detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRule {
    pub tag: String,
    pub name: String,
    pub value: String,
}

/// For products whose vendor contains `brand`, the image whose URL contains
/// `marker` becomes the primary image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteriorImageRule {
    pub brand: String,
    pub marker: String,
}

/// Per-(handle, SKU) curated highlights and details that replace the
/// tag-derived ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductOverride {
    pub handle: String,
    pub sku: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub details: Vec<OverrideDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideDetail {
    pub name: String,
    pub value: String,
}

/// Three-tier flat shipping rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingTiers {
    pub country: String,
    /// Unit price at or above which shipping is free.
    pub free_threshold: Decimal,
    /// Unit price strictly above which `mid_rate` applies.
    pub mid_threshold: Decimal,
    pub mid_rate: Decimal,
    pub base_rate: Decimal,
}

impl Default for ShippingTiers {
    fn default() -> Self {
        Self {
            country: "IT".to_string(),
            free_threshold: Decimal::new(89, 0),
            mid_threshold: Decimal::new(30, 0),
            mid_rate: Decimal::new(10, 0),
            base_rate: Decimal::new(6, 0),
        }
    }
}

/// Character limits of the two collection label slots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelLimits {
    pub short: usize,
    pub long: usize,
}

impl Default for LabelLimits {
    fn default() -> Self {
        Self {
            short: 100,
            long: 500,
        }
    }
}

/// Business configuration for feed generation, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub destinations: Vec<DestinationConfig>,
    pub settings: RunSettings,
    pub categories: CategoryMap,
    pub static_values: StaticValues,
    pub filters: Filters,
    /// Ordered; the first rule whose needle occurs in any tag wins.
    pub patterns: Vec<PatternRule>,
    pub product_details: Vec<DetailRule>,
    pub interior_images: Vec<InteriorImageRule>,
    pub product_overrides: Vec<ProductOverride>,
    pub shipping: ShippingTiers,
    pub labels: LabelLimits,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            destinations: default_destinations(),
            settings: RunSettings::default(),
            categories: CategoryMap::default(),
            static_values: StaticValues::default(),
            filters: Filters::default(),
            patterns: default_patterns(),
            product_details: default_product_details(),
            interior_images: vec![InteriorImageRule {
                brand: "converse".to_string(),
                marker: "_int".to_string(),
            }],
            product_overrides: Vec::new(),
            shipping: ShippingTiers::default(),
            labels: LabelLimits::default(),
        }
    }
}

impl FeedConfig {
    /// Enabled destinations, in file order.
    pub fn enabled_destinations(&self) -> impl Iterator<Item = &DestinationConfig> {
        self.destinations.iter().filter(|d| d.enabled)
    }

    #[must_use]
    pub fn destination(&self, name: &str) -> Option<&DestinationConfig> {
        self.destinations.iter().find(|d| d.name == name)
    }

    #[must_use]
    pub fn product_override(&self, handle: &str, sku: &str) -> Option<&ProductOverride> {
        if handle.is_empty() || sku.is_empty() {
            return None;
        }
        self.product_overrides
            .iter()
            .find(|o| o.handle == handle && o.sku == sku)
    }
}

fn default_destinations() -> Vec<DestinationConfig> {
    vec![
        DestinationConfig {
            name: "google".to_string(),
            kind: DestinationKind::Google,
            enabled: true,
            feed_filename: "google_shopping_feed.xml".to_string(),
            title: None,
            link: None,
            description: None,
            currency: default_currency(),
        },
        DestinationConfig {
            name: "meta".to_string(),
            kind: DestinationKind::Meta,
            enabled: true,
            feed_filename: "meta_catalog_feed.xml".to_string(),
            title: None,
            link: None,
            description: None,
            currency: default_currency(),
        },
    ]
}

fn rules<T>(pairs: &[(&str, &str)], f: impl Fn(&str, &str) -> T) -> Vec<T> {
    pairs.iter().map(|(a, b)| f(a, b)).collect()
}

fn default_patterns() -> Vec<PatternRule> {
    // Multi-word entries sit before their single-word prefixes.
    rules(
        &[
            ("animalier", "Animalier"),
            ("azulejos", "Azulejos C"),
            ("bandane", "Bandane"),
            ("cartoon", "Cartoon"),
            ("catene", "Catene"),
            ("coccodrillo", "Animalier Co"),
            ("colori pastello", "Colori Past"),
            ("comix", "Design artis"),
            ("con borchie", "Con Borchie"),
            ("country", "Country"),
            ("crochet", "UNCINETTO"),
            ("cuori", "Cuori"),
            ("farfalle", "Farfalle"),
            ("fiamme", "Fiamme"),
            ("fiori", "Fiori"),
            ("fumetti", "Fumetti"),
            ("gioielli", "Con gioielli"),
            ("goth", "Gotico"),
            ("leopardate", "Leopardato"),
            ("matelassè", "Matelassè"),
            ("mimetico camo militare", "Mimetico"),
            ("mimetico", "Mimetico"),
            ("camo", "Mimetico"),
            ("militare", "Mimetico"),
            ("muccato", "Muccato"),
            ("paisley", "Paisley"),
            ("paillettes", "Paillettes"),
            ("pelo", "Pelo furry"),
            ("peluche", "Peluche"),
            ("perle", "Con Perle"),
            ("perline", "Perline"),
            ("pied de poule", "Pied de poule"),
            ("pietre", "Con pietre pr"),
            ("pitonato", "Pitonato"),
            ("pitonate", "Pitonato"),
            ("pizzo bianco", "Pizzo"),
            ("pizzo nero", "Pizzo"),
            ("pizzo", "Pizzo"),
            ("pois", "Pois"),
            ("principe di galles", "Principe di"),
            ("ricamate a mano", "Rciama a ma"),
            ("rope", "Rope"),
            ("specchio", "Specchio"),
            ("spille", "Con spille"),
            ("strass", "Con strass e la"),
            ("sughero", "Sughero"),
            ("tartan scozzese", "Tartan"),
            ("tartan", "Tartan"),
            ("teddy", "pelo Teddy"),
            ("teschi", "Con teschi"),
            ("tiedye", "Tie dye"),
            ("tie dye", "Tie dye"),
            ("tulle", "Tulle"),
            ("uncinetto", "UNCINETTO"),
        ],
        |needle, label| PatternRule {
            needle: needle.to_string(),
            label: label.to_string(),
        },
    )
}

fn default_product_details() -> Vec<DetailRule> {
    let table = [
        ("suola vintage", "Tipo di Suola", "Vintage"),
        ("suola bianca", "Tipo di Suola", "Bianca"),
        ("suola nera", "Tipo di Suola", "Nera"),
        ("platform", "Tipo di Suola", "Platform"),
        ("effetto vintage", "Stile", "Effetto Vintage"),
        ("memory foam", "Comfort", "Memory Foam"),
        ("impermeabile", "Caratteristiche", "Impermeabile"),
        ("traspirante", "Caratteristiche", "Traspirante"),
    ];
    table
        .iter()
        .map(|(tag, name, value)| DetailRule {
            tag: (*tag).to_string(),
            name: (*name).to_string(),
            value: (*value).to_string(),
        })
        .collect()
}

/// Load and validate the feed configuration from a YAML file.
///
/// Every section falls back to built-in defaults, so a partial file is valid.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_feed_config(path: &Path) -> Result<FeedConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: FeedConfig =
        serde_yaml::from_str(&content).map_err(ConfigError::FeedFileParse)?;

    validate_feed_config(&config)?;

    Ok(config)
}

fn validate_feed_config(config: &FeedConfig) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_files = HashSet::new();

    for dest in &config.destinations {
        if dest.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "destination name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(dest.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate destination name: '{}'",
                dest.name
            )));
        }

        let file = dest.feed_filename.trim();
        if file.is_empty() {
            return Err(ConfigError::Validation(format!(
                "destination '{}' has an empty feed_filename",
                dest.name
            )));
        }
        if file.contains('/') || file.contains('\\') || file == "." || file == ".." {
            return Err(ConfigError::Validation(format!(
                "destination '{}' feed_filename '{}' must be a bare file name",
                dest.name, dest.feed_filename
            )));
        }
        if file == config.settings.metrics_filename {
            return Err(ConfigError::Validation(format!(
                "destination '{}' feed_filename collides with the metrics file",
                dest.name
            )));
        }
        if !seen_files.insert(file.to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate feed_filename: '{}'",
                dest.feed_filename
            )));
        }

        if dest.currency.len() != 3 || !dest.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "destination '{}' has invalid currency '{}'; expected an ISO 4217 code",
                dest.name, dest.currency
            )));
        }
    }

    if config.labels.short == 0 || config.labels.long == 0 {
        return Err(ConfigError::Validation(
            "label limits must be positive".to_string(),
        ));
    }

    let ship = &config.shipping;
    if ship.mid_threshold >= ship.free_threshold {
        return Err(ConfigError::Validation(format!(
            "shipping mid_threshold {} must be below free_threshold {}",
            ship.mid_threshold, ship.free_threshold
        )));
    }
    if ship.mid_rate.is_sign_negative() || ship.base_rate.is_sign_negative() {
        return Err(ConfigError::Validation(
            "shipping rates must not be negative".to_string(),
        ));
    }

    if let Some(rule) = config.patterns.iter().find(|r| r.needle.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "pattern rule with label '{}' has an empty needle",
            rule.label
        )));
    }

    if let Some(rule) = config
        .interior_images
        .iter()
        .find(|r| r.brand.trim().is_empty() || r.marker.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "interior image rule '{}'/'{}' needs both brand and marker",
            rule.brand, rule.marker
        )));
    }

    if config.filters.customization_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "customization_marker must be non-empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "feeds_test.rs"]
mod tests;
