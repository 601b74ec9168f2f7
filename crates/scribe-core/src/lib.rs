//! Scribe Core - story records, stores and configuration.
//!
//! This crate provides the pieces the prompt engine builds on: the story,
//! chapter, lorebook and prompt records, the store traits used to look them
//! up, a TOML-backed library that implements those traits, lorebook tag
//! matching, configuration and error handling.
//!
//! # Architecture
//!
//! - [`error`]: Error types and result type alias
//! - [`config`]: Workspace configuration
//! - [`model`]: Story, chapter, lorebook and prompt records
//! - [`store`]: Store traits and the [`Library`] implementation
//! - [`lorebook`]: Tag matching over prose
//!
//! # Example
//!
//! ```
//! use scribe_core::ScribeConfig;
//! use std::path::PathBuf;
//!
//! let config = ScribeConfig::new(PathBuf::from("/stories"));
//! assert_eq!(config.library, PathBuf::from("/stories/.scribe/library.toml"));
//! ```

pub mod config;
pub mod error;
pub mod lorebook;
pub mod model;
pub mod store;

// Re-export core types for convenience
pub use config::{MatchingConfig, ScribeConfig};
pub use error::{Result, ScribeError};
pub use lorebook::TagMap;
pub use model::{
    Chapter, EntryMetadata, Importance, LorebookEntry, PovType, Prompt, PromptMessage,
    Relationship, Role, Story,
};
pub use store::{ChapterStore, Library, LorebookStore, PromptStore, StoryStore};
