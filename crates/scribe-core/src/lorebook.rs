//! Lorebook tag matching.
//!
//! Finds the lorebook entries whose tags occur in a piece of prose. The
//! prompt engine does not match anything itself; callers run this step and
//! hand the matched entries over with the parse request.

use crate::model::LorebookEntry;
use std::collections::{HashMap, HashSet};

/// Lookup table from normalized tag to lorebook entry.
///
/// # Examples
///
/// ```
/// use scribe_core::lorebook::TagMap;
/// use scribe_core::model::LorebookEntry;
///
/// let entry = LorebookEntry {
///     id: "e1".to_string(),
///     story_id: "s1".to_string(),
///     name: "Old Harbor".to_string(),
///     description: String::new(),
///     category: "location".to_string(),
///     tags: vec!["Old Harbor".to_string(), "harbor".to_string()],
///     metadata: None,
/// };
///
/// let map = TagMap::build(&[entry]);
/// let matches = map.find_matches("They met at the harbor at dawn.");
/// assert_eq!(matches.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    tags: HashMap<String, LorebookEntry>,
}

impl TagMap {
    /// Builds the tag table for a set of entries.
    ///
    /// Every tag is lowercased and trimmed. For a multi-word tag, its single
    /// words are also indexed, but only the words that are standalone tags of
    /// the same entry. When two entries share a tag, the later entry wins.
    pub fn build(entries: &[LorebookEntry]) -> Self {
        let mut tags = HashMap::new();

        for entry in entries {
            for tag in &entry.tags {
                let normalized = tag.trim().to_lowercase();
                if normalized.is_empty() {
                    continue;
                }

                if normalized.contains(' ') {
                    for word in normalized.split(' ') {
                        if entry.tags.iter().any(|t| t.to_lowercase() == word) {
                            tags.insert(word.to_string(), entry.clone());
                        }
                    }
                }

                tags.insert(normalized, entry.clone());
            }
        }

        tracing::debug!(tags = tags.len(), "built lorebook tag map");
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the entries whose tags occur in `text` as whole words.
    ///
    /// Matching is case-insensitive. Each entry appears once, ordered by the
    /// position of its earliest match.
    pub fn find_matches(&self, text: &str) -> Vec<LorebookEntry> {
        if self.tags.is_empty() || text.is_empty() {
            return Vec::new();
        }

        let haystack = text.to_lowercase();
        let mut hits: Vec<(usize, &LorebookEntry)> = self
            .tags
            .iter()
            .filter_map(|(tag, entry)| find_word(&haystack, tag).map(|pos| (pos, entry)))
            .collect();

        // Position first, then id, so equal positions stay deterministic.
        hits.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for (_, entry) in hits {
            if seen.insert(entry.id.as_str()) {
                matches.push(entry.clone());
            }
        }
        matches
    }
}

/// Byte offset of the first whole-word occurrence of `needle` in `haystack`.
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();

        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());

        if before_ok && after_ok {
            return Some(start);
        }

        // Step past the first char of this occurrence.
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, tags: &[&str]) -> LorebookEntry {
        LorebookEntry {
            id: id.to_string(),
            story_id: "s1".to_string(),
            name: name.to_string(),
            description: String::new(),
            category: "character".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            metadata: None,
        }
    }

    #[test]
    fn test_build_normalizes_tags() {
        let map = TagMap::build(&[entry("e1", "Mara", &["  Mara "])]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.find_matches("MARA waved.").len(), 1);
    }

    #[test]
    fn test_multi_word_tag_indexes_standalone_words_only() {
        // "lantern" is a standalone tag, "keeper" is not.
        let map = TagMap::build(&[entry(
            "e1",
            "Lantern Keeper",
            &["lantern keeper", "lantern"],
        )]);
        assert_eq!(map.len(), 2);
        assert!(map.find_matches("the keeper slept").is_empty());
        assert_eq!(map.find_matches("a lantern flickered").len(), 1);
    }

    #[test]
    fn test_whole_word_matching() {
        let map = TagMap::build(&[entry("e1", "Ann", &["ann"])]);
        assert!(map.find_matches("The annual fair").is_empty());
        assert_eq!(map.find_matches("Ann, come here.").len(), 1);
        assert_eq!(map.find_matches("said ann").len(), 1);
    }

    #[test]
    fn test_matches_ordered_by_position_and_deduplicated() {
        let map = TagMap::build(&[
            entry("e1", "Mara", &["mara", "the captain"]),
            entry("e2", "Ines", &["ines"]),
        ]);
        let matches = map.find_matches("Ines saw Mara. The captain nodded at Ines.");
        let ids: Vec<&str> = matches.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e1"]);
    }

    #[test]
    fn test_later_entry_wins_shared_tag() {
        let map = TagMap::build(&[entry("e1", "First", &["twin"]), entry("e2", "Second", &["twin"])]);
        let matches = map.find_matches("the twin");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "e2");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(TagMap::default().find_matches("anything").is_empty());
        let map = TagMap::build(&[entry("e1", "Mara", &["mara"])]);
        assert!(map.find_matches("").is_empty());
    }
}
