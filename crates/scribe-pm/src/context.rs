//! Parse requests and the resolution context built from them.

use crate::error::Result;
use scribe_core::{Chapter, LorebookEntry, PovType, StoryStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Key of the pre-extracted chapter text in the additional-context bag.
pub const PLAIN_TEXT_CONTENT: &str = "plain_text_content";

/// Everything a caller supplies to resolve one prompt.
///
/// # Examples
///
/// ```
/// use scribe_pm::PromptParserConfig;
///
/// let config = PromptParserConfig::new("scene-beat", "story-1")
///     .with_chapter("chapter-3")
///     .with_scenebeat("Mara opens the lighthouse door.")
///     .with_previous_words("The storm had passed by morning.");
/// assert_eq!(config.chapter_id.as_deref(), Some("chapter-3"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptParserConfig {
    /// Id of the prompt template to resolve.
    pub prompt_id: String,

    /// Id of the story the prompt is resolved for.
    pub story_id: String,

    /// Chapter being written, if any.
    #[serde(default)]
    pub chapter_id: Option<String>,

    /// Scene beat command text.
    #[serde(default)]
    pub scenebeat: Option<String>,

    /// Prose preceding the cursor, already flattened to plain text.
    #[serde(default)]
    pub previous_words: Option<String>,

    /// Entries matched by the caller without a more specific scope.
    #[serde(default)]
    pub matched_entries: Vec<LorebookEntry>,

    /// Entries whose tags matched the chapter text.
    #[serde(default)]
    pub chapter_matched_entries: Vec<LorebookEntry>,

    /// Entries whose tags matched the scene beat.
    #[serde(default)]
    pub scene_beat_matched_entries: Vec<LorebookEntry>,

    /// Overrides the chapter's POV type.
    #[serde(default)]
    pub pov_type: Option<PovType>,

    /// Character for the POV override.
    #[serde(default)]
    pub pov_character: Option<String>,

    /// Open-ended extra values, e.g. [`PLAIN_TEXT_CONTENT`].
    #[serde(default)]
    pub additional_context: BTreeMap<String, Value>,
}

impl PromptParserConfig {
    /// Creates a request for a prompt and story with nothing else set.
    #[must_use]
    pub fn new(prompt_id: impl Into<String>, story_id: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            story_id: story_id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_chapter(mut self, chapter_id: impl Into<String>) -> Self {
        self.chapter_id = Some(chapter_id.into());
        self
    }

    #[must_use]
    pub fn with_scenebeat(mut self, scenebeat: impl Into<String>) -> Self {
        self.scenebeat = Some(scenebeat.into());
        self
    }

    #[must_use]
    pub fn with_previous_words(mut self, text: impl Into<String>) -> Self {
        self.previous_words = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_matched_entries(mut self, entries: Vec<LorebookEntry>) -> Self {
        self.matched_entries = entries;
        self
    }

    #[must_use]
    pub fn with_chapter_matched_entries(mut self, entries: Vec<LorebookEntry>) -> Self {
        self.chapter_matched_entries = entries;
        self
    }

    #[must_use]
    pub fn with_scene_beat_matched_entries(mut self, entries: Vec<LorebookEntry>) -> Self {
        self.scene_beat_matched_entries = entries;
        self
    }

    /// Overrides the point of view for this request.
    #[must_use]
    pub fn with_pov(mut self, pov_type: PovType, character: Option<String>) -> Self {
        self.pov_type = Some(pov_type);
        self.pov_character = character;
        self
    }

    #[must_use]
    pub fn with_additional_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.additional_context.insert(key.into(), value);
        self
    }

    /// Supplies the chapter's plain text for `{{chapter_content}}`.
    #[must_use]
    pub fn with_plain_text_content(self, text: impl Into<String>) -> Self {
        self.with_additional_context(PLAIN_TEXT_CONTENT, Value::String(text.into()))
    }
}

/// Point of view descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointOfView {
    pub kind: PovType,
    pub character: Option<String>,
}

/// Read-only snapshot handed to every resolver.
///
/// Built fresh for each parse and dropped afterwards. Resolvers only ever
/// borrow it immutably.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionContext {
    pub story_id: String,
    pub chapter_id: Option<String>,

    /// The requested chapter, when it exists.
    pub current_chapter: Option<Chapter>,

    /// Every chapter of the story, in store order.
    pub chapters: Vec<Chapter>,

    /// Chapter-scope matches, deduplicated by entry id.
    pub chapter_entries: Vec<LorebookEntry>,

    /// Scene-beat-scope matches, deduplicated by entry id.
    pub scene_beat_entries: Vec<LorebookEntry>,

    /// Every lorebook entry of the story.
    pub lorebook: Vec<LorebookEntry>,

    pub scenebeat: String,
    pub previous_words: String,

    /// Request override if given, else the current chapter's POV.
    pub pov: Option<PointOfView>,

    pub additional_context: BTreeMap<String, Value>,
}

impl ResolutionContext {
    /// Builds the context for a request, loading chapters and lorebook
    /// entries from `store`. Lookups run one after another.
    ///
    /// A `chapter_id` that matches no chapter leaves `current_chapter` empty.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::Store` if any lookup fails.
    #[tracing::instrument(skip_all, fields(story_id = %config.story_id))]
    pub async fn build<S: StoryStore>(config: &PromptParserConfig, store: &S) -> Result<Self> {
        let chapters = store.chapters_by_story(&config.story_id).await?;

        let current_chapter = match &config.chapter_id {
            Some(id) => store.chapter(id).await?,
            None => None,
        };
        if config.chapter_id.is_some() && current_chapter.is_none() {
            tracing::warn!(chapter_id = ?config.chapter_id, "chapter not found");
        }

        let lorebook = store.entries_by_story(&config.story_id).await?;

        let pov = match config.pov_type {
            Some(kind) => Some(PointOfView {
                kind,
                character: config.pov_character.clone(),
            }),
            None => current_chapter.as_ref().and_then(|chapter| {
                chapter.pov_type.map(|kind| PointOfView {
                    kind,
                    character: chapter.pov_character.clone(),
                })
            }),
        };

        let context = Self {
            story_id: config.story_id.clone(),
            chapter_id: config.chapter_id.clone(),
            current_chapter,
            chapters,
            chapter_entries: dedup_entries(
                config
                    .matched_entries
                    .iter()
                    .chain(&config.chapter_matched_entries),
            ),
            scene_beat_entries: dedup_entries(&config.scene_beat_matched_entries),
            lorebook,
            scenebeat: config.scenebeat.clone().unwrap_or_default(),
            previous_words: config.previous_words.clone().unwrap_or_default(),
            pov,
            additional_context: config.additional_context.clone(),
        };

        tracing::debug!(
            chapters = context.chapters.len(),
            chapter_entries = context.chapter_entries.len(),
            scene_beat_entries = context.scene_beat_entries.len(),
            previous_words_len = context.previous_words.len(),
            "built resolution context"
        );

        Ok(context)
    }
}

/// Keeps the first entry for each id, in encounter order.
fn dedup_entries<'a>(entries: impl IntoIterator<Item = &'a LorebookEntry>) -> Vec<LorebookEntry> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for entry in entries {
        if seen.insert(entry.id.as_str()) {
            unique.push(entry.clone());
        }
    }
    unique
}
