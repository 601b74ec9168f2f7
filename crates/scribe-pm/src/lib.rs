//! Prompt template resolution for Scribe.
//!
//! This crate turns a stored prompt template into the role-tagged messages
//! sent to a language model. Message bodies may contain `/* comments */`,
//! function calls such as `{{previous_words(500)}}` and variables such as
//! `{{scenebeat}}` or `{{matched_entries_chapter}}`, resolved against the
//! story, its chapters and its lorebook.
//!
//! # Examples
//!
//! ```no_run
//! use scribe_core::Library;
//! use scribe_pm::{PromptEngine, PromptParser, PromptParserConfig};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let library = Library::load(Path::new(".scribe/library.toml")).await?;
//! let parser = PromptParser::new(library);
//!
//! let config = PromptParserConfig::new("scene-beat", "story-1")
//!     .with_chapter("ch-3")
//!     .with_scenebeat("Mara finds the letter.")
//!     .with_previous_words("It had rained all night.");
//!
//! let parsed = parser.parse(&config).await;
//! for message in parsed.messages() {
//!     println!("[{}]\n{}", message.role, message.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod expand;
pub mod parser;
pub mod resolvers;
pub mod scanner;
pub mod whitespace;

// Re-export public types for convenience
pub use context::{PointOfView, PromptParserConfig, ResolutionContext};
pub use engine::PromptEngine;
pub use error::{PromptError, Result};
pub use parser::{ParsedPrompt, PromptParser, expand_content};
pub use resolvers::Variable;
