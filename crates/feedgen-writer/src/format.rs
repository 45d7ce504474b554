use feedgen_core::DestinationKind;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const GOOGLE_NS: &str = "http://base.google.com/ns/1.0";

/// Document shape of a feed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// `<feed>` root with `<entry>` items.
    Atom,
    /// `<rss><channel>` with `<item>` items.
    Rss,
}

impl FeedFormat {
    #[must_use]
    pub fn for_destination(kind: DestinationKind) -> Self {
        match kind {
            DestinationKind::Google => FeedFormat::Atom,
            DestinationKind::Meta => FeedFormat::Rss,
        }
    }

    #[must_use]
    pub fn item_element(self) -> &'static str {
        match self {
            FeedFormat::Atom => "entry",
            FeedFormat::Rss => "item",
        }
    }
}

/// Channel-level metadata written once by `start`.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Written as the Atom `<updated>` element; RSS has no equivalent.
    pub updated: chrono::DateTime<chrono::Utc>,
}
