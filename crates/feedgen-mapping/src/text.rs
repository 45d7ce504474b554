//! Text helpers shared by every destination.

use std::sync::LazyLock;

use regex::Regex;

/// Longest description any destination accepts.
pub const DESCRIPTION_LIMIT: usize = 5000;

const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid entity regex"));

/// Strips HTML tags, decodes common entities, collapses whitespace and caps
/// the result at [`DESCRIPTION_LIMIT`] characters.
#[must_use]
pub fn clean_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = decode_entities(&without_tags);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_with_ellipsis(&collapsed, DESCRIPTION_LIMIT)
}

/// Decodes numeric character references and the named entities that show up
/// in storefront descriptions. `&amp;` goes last so `&amp;lt;` stays `&lt;`.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&egrave;", "è")
        .replace("&eacute;", "é")
        .replace("&agrave;", "à")
        .replace("&ograve;", "ò")
        .replace("&ugrave;", "ù")
        .replace("&igrave;", "ì")
        .replace("&euro;", "€")
        .replace("&amp;", "&")
}

/// Caps `text` at `limit` characters, ending in `...` when cut.
///
/// The cut backs up to the previous word boundary when one exists in the
/// kept text, so words are only split when a single word is longer than
/// the limit.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    if keep == 0 {
        return ELLIPSIS.chars().take(limit).collect();
    }

    let byte_end = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..byte_end];
    let next_is_boundary = text[byte_end..].starts_with(char::is_whitespace);

    let head = if next_is_boundary {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(space) if space > 0 => &head[..space],
            _ => head,
        }
    };

    format!("{}{ELLIPSIS}", head.trim_end())
}

/// Trimmed value, or `None` when blank.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
