//! TOML-backed story library.
//!
//! This module provides [`Library`], an in-memory collection of stories,
//! prompts, chapters and lorebook entries that implements every store trait.
//! It can be loaded from a `library.toml` file or assembled in code, which
//! makes it the default store for the CLI and the fixture used in tests.

use crate::error::{Result, ScribeError};
use crate::model::{Chapter, LorebookEntry, Prompt, Story};
use crate::store::{ChapterStore, LorebookStore, PromptStore};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// In-memory story library.
///
/// # Examples
///
/// ```
/// use scribe_core::model::{Prompt, PromptMessage, Role};
/// use scribe_core::store::Library;
///
/// let library = Library::new().with_prompt(Prompt {
///     id: "greet".to_string(),
///     name: "Greeting".to_string(),
///     prompt_type: "scene_beat".to_string(),
///     messages: vec![PromptMessage::new(Role::User, "Hello")],
///     allowed_models: vec![],
/// });
/// assert_eq!(library.prompt_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    stories: Vec<Story>,

    #[serde(default)]
    prompts: Vec<Prompt>,

    #[serde(default)]
    chapters: Vec<Chapter>,

    #[serde(default)]
    lorebook: Vec<LorebookEntry>,
}

impl Library {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a library from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the library file.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::LibraryNotFound` if the file doesn't exist,
    /// `ScribeError::LibraryParseError` if it is not a valid library, or
    /// `ScribeError::Io` for other IO errors.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribeError::LibraryNotFound(path.to_path_buf())
            } else {
                ScribeError::Io(e)
            }
        })?;

        let library = Self::from_toml_str(&content)
            .map_err(|e| ScribeError::LibraryParseError(format!("{}: {e}", path.display())))?;

        tracing::debug!(
            path = %path.display(),
            stories = library.stories.len(),
            prompts = library.prompts.len(),
            chapters = library.chapters.len(),
            entries = library.lorebook.len(),
            "loaded library"
        );

        Ok(library)
    }

    /// Parses a library from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::LibraryParseError` if the text is not a valid library.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ScribeError::LibraryParseError(e.to_string()))
    }

    /// Adds a story.
    #[must_use]
    pub fn with_story(mut self, story: Story) -> Self {
        self.stories.push(story);
        self
    }

    /// Adds a prompt template.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompts.push(prompt);
        self
    }

    /// Adds a chapter.
    #[must_use]
    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Adds a lorebook entry.
    #[must_use]
    pub fn with_entry(mut self, entry: LorebookEntry) -> Self {
        self.lorebook.push(entry);
        self
    }

    /// Looks up a story by id.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::StoryNotFound` if no story has this id.
    pub fn story(&self, id: &str) -> Result<&Story> {
        self.stories
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ScribeError::StoryNotFound(id.to_string()))
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }
}

impl PromptStore for Library {
    async fn prompt(&self, id: &str) -> Result<Option<Prompt>> {
        Ok(self.prompts.iter().find(|p| p.id == id).cloned())
    }

    async fn prompts(&self) -> Result<Vec<Prompt>> {
        Ok(self.prompts.clone())
    }
}

impl ChapterStore for Library {
    async fn chapters_by_story(&self, story_id: &str) -> Result<Vec<Chapter>> {
        Ok(self
            .chapters
            .iter()
            .filter(|c| c.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn chapter(&self, chapter_id: &str) -> Result<Option<Chapter>> {
        Ok(self.chapters.iter().find(|c| c.id == chapter_id).cloned())
    }
}

impl LorebookStore for Library {
    async fn entries_by_story(&self, story_id: &str) -> Result<Vec<LorebookEntry>> {
        Ok(self
            .lorebook
            .iter()
            .filter(|e| e.story_id == story_id)
            .cloned()
            .collect())
    }
}
