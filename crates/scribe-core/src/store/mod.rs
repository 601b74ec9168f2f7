//! Store collaborators for prompts, chapters and lorebook entries.
//!
//! This module defines the lookup traits the prompt engine consumes. Each
//! trait covers one category of records; [`StoryStore`] bundles all three.
//! Lookups are asynchronous because real stores sit on disk or behind a
//! database; the engine awaits them one after another.

pub mod library;

use crate::error::Result;
use crate::model::{Chapter, LorebookEntry, Prompt};
use std::future::Future;

pub use library::Library;

/// Prompt template store.
///
/// Implementations can be backed by a library file, a database, or an
/// in-memory fixture for testing.
pub trait PromptStore: Send + Sync {
    /// Looks up a prompt template by id.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no prompt has this id.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store itself cannot be read.
    fn prompt(&self, id: &str) -> impl Future<Output = Result<Option<Prompt>>> + Send;

    /// Returns every prompt in the store.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    fn prompts(&self) -> impl Future<Output = Result<Vec<Prompt>>> + Send;
}

/// Chapter store.
pub trait ChapterStore: Send + Sync {
    /// Returns all chapters belonging to a story, in store order.
    ///
    /// # Arguments
    ///
    /// * `story_id` - Identifier of the story.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read. An unknown story
    /// yields an empty list, not an error.
    fn chapters_by_story(
        &self,
        story_id: &str,
    ) -> impl Future<Output = Result<Vec<Chapter>>> + Send;

    /// Looks up a single chapter by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    fn chapter(&self, chapter_id: &str) -> impl Future<Output = Result<Option<Chapter>>> + Send;
}

/// Lorebook entry store.
pub trait LorebookStore: Send + Sync {
    /// Returns all lorebook entries belonging to a story.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    fn entries_by_story(
        &self,
        story_id: &str,
    ) -> impl Future<Output = Result<Vec<LorebookEntry>>> + Send;
}

/// Every lookup the prompt engine needs.
pub trait StoryStore: PromptStore + ChapterStore + LorebookStore {}

impl<T> StoryStore for T where T: PromptStore + ChapterStore + LorebookStore {}
