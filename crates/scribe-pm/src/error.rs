//! Error types for the prompt engine crate.

use scribe_core::ScribeError;

/// Errors that can occur while resolving a prompt.
///
/// None of these escape [`PromptEngine::parse`](crate::PromptEngine::parse);
/// they are folded into the `error` field of a
/// [`ParsedPrompt`](crate::ParsedPrompt).
#[derive(thiserror::Error, Debug)]
pub enum PromptError {
    /// No prompt template has the requested id.
    #[error("Prompt not found")]
    PromptNotFound(String),

    /// A store collaborator failed while building the resolution context.
    #[error(transparent)]
    Store(#[from] ScribeError),

    /// Template expansion aborted unexpectedly.
    #[error("Failed to expand prompt {0}")]
    Expansion(String),
}

/// Result type alias for prompt engine operations.
pub type Result<T> = std::result::Result<T, PromptError>;
