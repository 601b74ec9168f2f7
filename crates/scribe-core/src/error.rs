//! Error types for scribe core operations.
//!
//! This module defines the error variants raised while loading configuration,
//! loading a story library, and serving store lookups. All errors use
//! `thiserror` for ergonomic error handling with context.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for scribe core operations.
///
/// Each variant represents a specific failure mode with relevant context,
/// enabling precise error handling and user-friendly error messages.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScribeError {
    // Library errors
    /// Library file was not found at the expected location.
    #[error("library file not found: {0}")]
    LibraryNotFound(PathBuf),

    /// Library file exists but could not be parsed.
    #[error("library parse error: {0}")]
    LibraryParseError(String),

    /// Story with the given id was not found.
    #[error("story not found: {0}")]
    StoryNotFound(String),

    // Store errors
    /// A store collaborator could not serve a lookup.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    // Config errors
    /// Invalid configuration detected.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Error parsing configuration file.
    #[error("config parse error: {0}")]
    ConfigParseError(String),

    // IO and system errors
    /// Standard IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scribe core operations.
///
/// All fallible core operations return this type, using [`ScribeError`] for error variants.
pub type Result<T> = std::result::Result<T, ScribeError>;
