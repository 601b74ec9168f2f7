//! Variable resolvers.
//!
//! Every template variable maps to a [`Variable`]. Resolving one is a pure
//! function of the [`ResolutionContext`] and the token's parameters, and
//! yields an empty string when there is nothing to say.

use crate::context::{PLAIN_TEXT_CONTENT, ResolutionContext};
use scribe_core::{Chapter, LorebookEntry};
use serde_json::Value;

/// Word count used by `previous_words` when no valid count is given.
pub const DEFAULT_PREVIOUS_WORDS: usize = 1000;

/// Name of the scene beat pseudo-variable.
pub const SCENEBEAT: &str = "scenebeat";

const UNKNOWN: &str = "Unknown";

/// A known template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// `matched_entries_chapter`, alias `lorebook_chapter_matched_entries`.
    MatchedEntriesChapter,
    /// `lorebook_scenebeat_matched_entries`. Not wired to scene beat
    /// tag tracking yet, so it always resolves to nothing.
    MatchedEntriesSceneBeat,
    /// `summaries`
    Summaries,
    /// `previous_words`, also callable as `previous_words(N)`.
    PreviousWords,
    /// `pov`
    Pov,
    /// `chapter_content`
    ChapterContent,
    /// `character <name>`
    Character,
    /// `scenebeat`
    SceneBeat,
}

impl Variable {
    /// Looks up a variable by the name used in templates.
    pub fn lookup(name: &str) -> Option<Self> {
        let variable = match name {
            "matched_entries_chapter" | "lorebook_chapter_matched_entries" => {
                Variable::MatchedEntriesChapter
            }
            "lorebook_scenebeat_matched_entries" => Variable::MatchedEntriesSceneBeat,
            "summaries" => Variable::Summaries,
            "previous_words" => Variable::PreviousWords,
            "pov" => Variable::Pov,
            "chapter_content" => Variable::ChapterContent,
            "character" => Variable::Character,
            SCENEBEAT => Variable::SceneBeat,
            _ => return None,
        };
        Some(variable)
    }

    /// Whether the variable may be invoked as `name(args)`.
    pub fn is_function(self) -> bool {
        matches!(self, Variable::PreviousWords)
    }

    /// Resolves the variable against a context.
    pub fn resolve(self, ctx: &ResolutionContext, params: &[&str]) -> String {
        match self {
            Variable::MatchedEntriesChapter => matched_entries(&ctx.chapter_entries),
            Variable::MatchedEntriesSceneBeat => String::new(),
            Variable::Summaries => chapter_summaries(&ctx.chapters, ctx.current_chapter.as_ref()),
            Variable::PreviousWords => previous_words(&ctx.previous_words, params.first().copied()),
            Variable::Pov => point_of_view(ctx),
            Variable::ChapterContent => chapter_content(ctx),
            Variable::Character => character(ctx, params),
            Variable::SceneBeat => ctx.scenebeat.clone(),
        }
    }
}

/// Formats entries ordered by importance: major, then minor, then background.
/// Entries of equal importance keep their order.
pub fn matched_entries(entries: &[LorebookEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&LorebookEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.importance_rank());

    tracing::debug!(entries = sorted.len(), "formatting matched entries");
    format_entries(sorted)
}

/// `Chapter <order>: <summary>` for every summarized chapter before the
/// current one (all chapters when there is no current chapter), in order.
pub fn chapter_summaries(chapters: &[Chapter], current: Option<&Chapter>) -> String {
    let limit = current.map(|chapter| chapter.order);

    let mut earlier: Vec<(u32, &str)> = chapters
        .iter()
        .filter(|chapter| limit.is_none_or(|limit| chapter.order < limit))
        .filter_map(|chapter| match chapter.summary.as_deref() {
            Some(summary) if !summary.is_empty() => Some((chapter.order, summary)),
            _ => None,
        })
        .collect();
    earlier.sort_by_key(|(order, _)| *order);

    earlier
        .iter()
        .map(|(order, summary)| format!("Chapter {order}: {summary}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The last `count + 1` words of `text`, joined by single spaces.
///
/// `count` falls back to [`DEFAULT_PREVIOUS_WORDS`] when missing, not a
/// number, or zero. The extra word is long-standing behavior that existing
/// templates are tuned against.
///
/// # Examples
///
/// ```
/// use scribe_pm::resolvers::previous_words;
///
/// assert_eq!(previous_words("a b c d e", Some("2")), "c d e");
/// ```
pub fn previous_words(text: &str, count: Option<&str>) -> String {
    let count = count
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PREVIOUS_WORDS);

    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(count.saturating_add(1));

    tracing::debug!(
        requested = count,
        available = words.len(),
        selected = words.len() - start,
        "selected previous words"
    );

    words[start..].join(" ")
}

fn point_of_view(ctx: &ResolutionContext) -> String {
    let Some(pov) = &ctx.pov else {
        return String::new();
    };

    match pov.character.as_deref().filter(|c| !c.is_empty()) {
        Some(character) => format!("{} ({character})", pov.kind),
        None => pov.kind.to_string(),
    }
}

fn chapter_content(ctx: &ResolutionContext) -> String {
    match ctx.additional_context.get(PLAIN_TEXT_CONTENT) {
        Some(Value::String(text)) => text.clone(),
        _ => {
            tracing::debug!(chapter_id = ?ctx.chapter_id, "no plain text content supplied");
            String::new()
        }
    }
}

/// The story's character entry named by the space-joined params.
fn character(ctx: &ResolutionContext, params: &[&str]) -> String {
    let name = params.join(" ");
    if name.is_empty() {
        return String::new();
    }

    ctx.lorebook
        .iter()
        .find(|entry| entry.category.eq_ignore_ascii_case("character") && entry.name == name)
        .map(|entry| format_entries([entry]))
        .unwrap_or_default()
}

/// Formats lorebook entries as text blocks separated by a blank line.
pub fn format_entries<'a>(entries: impl IntoIterator<Item = &'a LorebookEntry>) -> String {
    entries
        .into_iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_entry(entry: &LorebookEntry) -> String {
    let metadata = entry.metadata.as_ref();
    let kind = metadata
        .and_then(|m| m.kind.as_deref())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN);
    let importance = metadata
        .and_then(|m| m.importance)
        .map_or(UNKNOWN, |i| i.as_str());
    let status = metadata
        .and_then(|m| m.status.as_deref())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN);

    let mut block = format!(
        "{}: {}\nType: {kind}\nImportance: {importance}\nStatus: {status}\nDescription: {}\n",
        entry.category.to_uppercase(),
        entry.name,
        entry.description,
    );

    if let Some(metadata) = metadata
        && !metadata.relationships.is_empty()
    {
        let relationships = metadata
            .relationships
            .iter()
            .map(|r| format!("- {}: {}", r.kind, r.description))
            .collect::<Vec<_>>()
            .join("\n");
        block.push_str("\nRelationships:\n");
        block.push_str(&relationships);
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PointOfView;
    use scribe_core::{EntryMetadata, Importance, PovType, Relationship};

    fn entry(id: &str, name: &str, importance: Option<Importance>) -> LorebookEntry {
        LorebookEntry {
            id: id.to_string(),
            story_id: "s1".to_string(),
            name: name.to_string(),
            description: format!("About {name}"),
            category: "character".to_string(),
            tags: vec![],
            metadata: importance.map(|importance| EntryMetadata {
                importance: Some(importance),
                ..Default::default()
            }),
        }
    }

    fn chapter(order: u32, summary: Option<&str>) -> Chapter {
        Chapter {
            id: format!("c{order}"),
            story_id: "s1".to_string(),
            title: String::new(),
            summary: summary.map(str::to_string),
            order,
            content: String::new(),
            word_count: 0,
            pov_character: None,
            pov_type: None,
        }
    }

    #[test]
    fn test_lookup_names_and_aliases() {
        assert_eq!(
            Variable::lookup("lorebook_chapter_matched_entries"),
            Some(Variable::MatchedEntriesChapter)
        );
        assert_eq!(
            Variable::lookup("matched_entries_chapter"),
            Some(Variable::MatchedEntriesChapter)
        );
        assert_eq!(Variable::lookup("summaries"), Some(Variable::Summaries));
        assert_eq!(Variable::lookup("unknown_var"), None);
        assert!(Variable::PreviousWords.is_function());
        assert!(!Variable::Pov.is_function());
    }

    #[test]
    fn test_format_entry_defaults_unknown() {
        let mut plain = entry("e1", "Harbor", None);
        plain.category = "location".to_string();
        assert_eq!(
            format_entries([&plain]),
            "LOCATION: Harbor\nType: Unknown\nImportance: Unknown\nStatus: Unknown\nDescription: About Harbor\n"
        );
    }

    #[test]
    fn test_format_entry_with_metadata_and_relationships() {
        let mut mara = entry("e1", "Mara", Some(Importance::Major));
        mara.metadata = Some(EntryMetadata {
            kind: Some("protagonist".to_string()),
            importance: Some(Importance::Major),
            status: Some("alive".to_string()),
            relationships: vec![
                Relationship {
                    kind: "sister".to_string(),
                    description: "Ines".to_string(),
                },
                Relationship {
                    kind: "rival".to_string(),
                    description: "Tomas".to_string(),
                },
            ],
        });

        assert_eq!(
            format_entries([&mara]),
            "CHARACTER: Mara\nType: protagonist\nImportance: major\nStatus: alive\n\
             Description: About Mara\n\nRelationships:\n- sister: Ines\n- rival: Tomas"
        );
    }

    #[test]
    fn test_matched_entries_sorted_by_importance() {
        let entries = vec![
            entry("e1", "Minor One", Some(Importance::Minor)),
            entry("e2", "Major One", Some(Importance::Major)),
            entry("e3", "Background One", Some(Importance::Background)),
        ];
        let out = matched_entries(&entries);

        let major = out.find("Major One").unwrap();
        let minor = out.find("Minor One").unwrap();
        let background = out.find("Background One").unwrap();
        assert!(major < minor && minor < background);
        assert_eq!(out.matches("\n\nCHARACTER: ").count(), 2);
    }

    #[test]
    fn test_matched_entries_ties_keep_order_and_missing_is_background() {
        let entries = vec![
            entry("e1", "Nobody", None),
            entry("e2", "First Bg", Some(Importance::Background)),
            entry("e3", "Lead", Some(Importance::Major)),
        ];
        let out = matched_entries(&entries);
        let order: Vec<usize> = ["Lead", "Nobody", "First Bg"]
            .iter()
            .map(|name| out.find(name).unwrap())
            .collect();
        assert!(order[0] < order[1] && order[1] < order[2]);
    }

    #[test]
    fn test_matched_entries_empty() {
        assert_eq!(matched_entries(&[]), "");
    }

    #[test]
    fn test_scene_beat_entries_placeholder() {
        let ctx = ResolutionContext {
            scenebeat: "Mara climbs".to_string(),
            scene_beat_entries: vec![entry("e1", "Mara", Some(Importance::Major))],
            ..Default::default()
        };
        assert_eq!(Variable::MatchedEntriesSceneBeat.resolve(&ctx, &[]), "");
    }

    #[test]
    fn test_summaries_before_current_chapter() {
        let chapters = vec![
            chapter(3, Some("Third")),
            chapter(1, Some("First")),
            chapter(2, None),
            chapter(4, Some("Fourth")),
        ];
        let current = chapter(4, None);
        assert_eq!(
            chapter_summaries(&chapters, Some(&current)),
            "Chapter 1: First\n\nChapter 3: Third"
        );
    }

    #[test]
    fn test_summaries_without_current_chapter_are_unbounded() {
        let chapters = vec![chapter(2, Some("Two")), chapter(1, Some("")), chapter(5, Some("Five"))];
        assert_eq!(chapter_summaries(&chapters, None), "Chapter 2: Two\n\nChapter 5: Five");
        assert_eq!(chapter_summaries(&[], None), "");
    }

    #[test]
    fn test_previous_words_takes_one_extra_word() {
        assert_eq!(previous_words("a b c d e", Some("2")), "c d e");
        assert_eq!(previous_words("a b c d e", Some("4")), "a b c d e");
        assert_eq!(previous_words("a  b\n\tc", Some("10")), "a b c");
    }

    #[test]
    fn test_previous_words_default_count() {
        let text = (0..1500).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        for count in [None, Some("lots"), Some("0"), Some("-3"), Some("")] {
            let out = previous_words(&text, count);
            assert_eq!(out.split(' ').count(), DEFAULT_PREVIOUS_WORDS + 1, "count {count:?}");
            assert!(out.ends_with("w1499"));
        }
    }

    #[test]
    fn test_previous_words_empty_buffer() {
        assert_eq!(previous_words("", Some("5")), "");
        assert_eq!(previous_words("   \n ", None), "");
    }

    #[test]
    fn test_pov_with_and_without_character() {
        let mut ctx = ResolutionContext {
            pov: Some(PointOfView {
                kind: PovType::FirstPerson,
                character: Some("Alice".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(Variable::Pov.resolve(&ctx, &[]), "First Person (Alice)");

        ctx.pov = Some(PointOfView {
            kind: PovType::ThirdPersonLimited,
            character: None,
        });
        assert_eq!(Variable::Pov.resolve(&ctx, &[]), "Third Person Limited");

        ctx.pov = None;
        assert_eq!(Variable::Pov.resolve(&ctx, &[]), "");
    }

    #[test]
    fn test_chapter_content_from_additional_context() {
        let mut ctx = ResolutionContext::default();
        assert_eq!(Variable::ChapterContent.resolve(&ctx, &[]), "");

        ctx.additional_context
            .insert(PLAIN_TEXT_CONTENT.to_string(), Value::from(42));
        assert_eq!(Variable::ChapterContent.resolve(&ctx, &[]), "");

        ctx.additional_context.insert(
            PLAIN_TEXT_CONTENT.to_string(),
            Value::String("The tide rose.".to_string()),
        );
        assert_eq!(Variable::ChapterContent.resolve(&ctx, &[]), "The tide rose.");
    }

    #[test]
    fn test_character_lookup() {
        let mut mara = entry("e1", "Mara Vell", Some(Importance::Major));
        mara.category = "Character".to_string();
        let mut harbor = entry("e2", "Harbor", None);
        harbor.category = "location".to_string();

        let ctx = ResolutionContext {
            lorebook: vec![harbor, mara],
            ..Default::default()
        };

        let out = Variable::Character.resolve(&ctx, &["Mara", "Vell"]);
        assert!(out.starts_with("CHARACTER: Mara Vell\n"));
        assert_eq!(Variable::Character.resolve(&ctx, &["Harbor"]), "");
        assert_eq!(Variable::Character.resolve(&ctx, &[]), "");
    }
}
