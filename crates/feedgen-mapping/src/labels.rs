//! Packing collection titles into the two custom-label slots.

use std::collections::HashSet;

use feedgen_core::LabelLimits;

const DELIMITER: &str = ", ";

/// Splits collection titles across a short and a long label slot.
///
/// Titles are trimmed and deduplicated case-insensitively, keeping the first
/// spelling. If the joined list fits the short slot it all goes there.
/// Otherwise titles fill the short slot in order until one does not fit;
/// that title and every later one go to the long slot, which is cut after
/// the last whole title within its limit. No title is split or repeated.
///
/// Lengths are counted in characters.
#[must_use]
pub fn split_collection_labels(collections: &[String], limits: LabelLimits) -> (String, String) {
    let unique = dedupe(collections);
    if unique.is_empty() {
        return (String::new(), String::new());
    }

    let full = unique.join(DELIMITER);
    if char_len(&full) <= limits.short {
        return (full, String::new());
    }

    let mut short = Vec::new();
    let mut rest = Vec::new();
    let mut short_len = 0;
    let mut overflow = false;
    for title in unique {
        let added = joined_len(short_len, title);
        if !overflow && added <= limits.short {
            short.push(title);
            short_len = added;
        } else {
            overflow = true;
            rest.push(title);
        }
    }

    let mut long = Vec::new();
    let mut long_len = 0;
    for title in rest {
        let added = joined_len(long_len, title);
        if added > limits.long {
            break;
        }
        long.push(title);
        long_len = added;
    }

    (short.join(DELIMITER), long.join(DELIMITER))
}

fn dedupe(collections: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    collections
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && seen.insert(c.to_lowercase()))
        .collect()
}

fn joined_len(current: usize, title: &str) -> usize {
    let sep = if current > 0 { DELIMITER.len() } else { 0 };
    current + sep + char_len(title)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn limits(short: usize, long: usize) -> LabelLimits {
        LabelLimits { short, long }
    }

    fn parts(label: &str) -> Vec<&str> {
        if label.is_empty() {
            Vec::new()
        } else {
            label.split(DELIMITER).collect()
        }
    }

    #[test]
    fn short_list_fits_first_slot() {
        let (a, b) = split_collection_labels(&titles(&["A", "B", "C"]), LabelLimits::default());
        assert_eq!(a, "A, B, C");
        assert_eq!(b, "");
    }

    #[test]
    fn empty_input_gives_empty_slots() {
        let (a, b) = split_collection_labels(&[], LabelLimits::default());
        assert_eq!((a.as_str(), b.as_str()), ("", ""));
    }

    #[test]
    fn duplicates_are_removed_case_insensitively() {
        let (a, b) = split_collection_labels(
            &titles(&["Sposa", " sposa ", "Novità", "", "SPOSA", "Pizzo"]),
            LabelLimits::default(),
        );
        assert_eq!(a, "Sposa, Novità, Pizzo");
        assert_eq!(b, "");
    }

    #[test]
    fn overflow_moves_remaining_titles_to_long_slot() {
        // "Alpha, Beta" is 11 chars; adding ", Gamma" would make 18.
        let (a, b) =
            split_collection_labels(&titles(&["Alpha", "Beta", "Gamma", "Delta"]), limits(12, 100));
        assert_eq!(a, "Alpha, Beta");
        assert_eq!(b, "Gamma, Delta");
    }

    #[test]
    fn later_short_title_does_not_jump_back_into_first_slot() {
        let (a, b) =
            split_collection_labels(&titles(&["Alpha", "Enormous title", "X"]), limits(10, 100));
        assert_eq!(a, "Alpha");
        assert_eq!(b, "Enormous title, X");
    }

    #[test]
    fn long_slot_is_cut_at_last_whole_title() {
        let (a, b) = split_collection_labels(
            &titles(&["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]),
            limits(5, 13),
        );
        assert_eq!(a, "Alpha");
        // "Beta, Gamma" is 11 chars; ", Delta" would make 18.
        assert_eq!(b, "Beta, Gamma");
    }

    #[test]
    fn every_slot_respects_its_limit_and_titles_stay_whole() {
        let input: Vec<String> = (0..80).map(|i| format!("Collezione numero {i}")).collect();
        let (a, b) = split_collection_labels(&input, LabelLimits::default());

        assert!(a.chars().count() <= 100);
        assert!(b.chars().count() <= 500);

        let emitted: Vec<&str> = parts(&a).into_iter().chain(parts(&b)).collect();
        for title in &emitted {
            assert!(input.iter().any(|t| t == title), "title was split: {title}");
        }
        let mut unique = emitted.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), emitted.len(), "a title appears twice");

        // Emitted titles are a prefix of the input: nothing skipped before
        // the long slot was cut.
        let expected: Vec<&str> = input.iter().take(emitted.len()).map(String::as_str).collect();
        assert_eq!(emitted, expected);
    }
}
