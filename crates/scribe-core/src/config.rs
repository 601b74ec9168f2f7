//! Configuration types for the scribe workspace.
//!
//! This module defines the workspace configuration: where the story library
//! lives, which lorebook matching steps run before a prompt is resolved, and
//! the default log filter. Configuration is an explicit value handed to
//! whoever needs it; there is no global instance.

use crate::error::{Result, ScribeError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default `tracing` filter used when neither `--verbose` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "scribe=info,scribe_core=info,scribe_pm=info";

/// Main scribe configuration.
///
/// Contains the paths and settings needed to resolve prompts. Typically
/// loaded from `.scribe/config.toml` with defaults applied for missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScribeConfig {
    /// Workspace root directory.
    pub root: PathBuf,

    /// Path to the scribe configuration file (`.scribe/config.toml`).
    pub config_file: PathBuf,

    /// Path to the story library file.
    pub library: PathBuf,

    /// `tracing` filter directives.
    pub log_filter: String,

    /// Lorebook matching configuration.
    pub matching: MatchingConfig,
}

impl ScribeConfig {
    /// Creates a new configuration with sensible defaults.
    ///
    /// # Arguments
    ///
    /// * `root` - The workspace root directory.
    ///
    /// # Returns
    ///
    /// A new `ScribeConfig` with all paths derived from `root`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            config_file: root.join(".scribe").join("config.toml"),
            library: root.join(".scribe").join("library.toml"),
            root,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            matching: MatchingConfig::default(),
        }
    }

    /// Loads configuration from `<root>/.scribe/config.toml`.
    ///
    /// A missing file yields the defaults of [`ScribeConfig::new`]. Keys
    /// present in the file override the defaults; `root` and `config_file`
    /// are always derived from `root`. A relative `library` path is resolved
    /// against `root`.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::ConfigParseError` if the file is not valid TOML,
    /// `ScribeError::InvalidConfig` if a value is unusable, or
    /// `ScribeError::Io` if the file exists but cannot be read.
    pub fn load(root: PathBuf) -> Result<Self> {
        let mut config = Self::new(root);

        if !config.config_file.exists() {
            tracing::debug!(
                path = %config.config_file.display(),
                "config file not found, using defaults"
            );
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config.config_file)?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| {
            ScribeError::ConfigParseError(format!("{}: {e}", config.config_file.display()))
        })?;

        config.apply(file)?;
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(library) = file.library {
            if library.as_os_str().is_empty() {
                return Err(ScribeError::InvalidConfig(
                    "library path must not be empty".to_string(),
                ));
            }
            self.library = resolve(&self.root, library);
        }

        if let Some(filter) = file.log_filter {
            self.log_filter = filter;
        }

        if let Some(matching) = file.matching {
            if let Some(chapter_content) = matching.chapter_content {
                self.matching.chapter_content = chapter_content;
            }
            if let Some(scene_beat) = matching.scene_beat {
                self.matching.scene_beat = scene_beat;
            }
        }

        Ok(())
    }
}

/// Lorebook matching configuration.
///
/// Controls which texts are scanned for lorebook tags before a prompt is
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingConfig {
    /// Match tags in the current chapter's plain text.
    pub chapter_content: bool,

    /// Match tags in the scene beat command.
    pub scene_beat: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            chapter_content: true,
            scene_beat: true,
        }
    }
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    library: Option<PathBuf>,
    log_filter: Option<String>,
    matching: Option<MatchingFile>,
}

#[derive(Debug, Default, Deserialize)]
struct MatchingFile {
    chapter_content: Option<bool>,
    scene_beat: Option<bool>,
}

fn resolve(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_paths() {
        let config = ScribeConfig::new(PathBuf::from("/work"));
        assert_eq!(config.config_file, PathBuf::from("/work/.scribe/config.toml"));
        assert_eq!(config.library, PathBuf::from("/work/.scribe/library.toml"));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.matching.chapter_content);
        assert!(config.matching.scene_beat);
    }

    #[test]
    fn test_apply_resolves_relative_library() {
        let mut config = ScribeConfig::new(PathBuf::from("/work"));
        config
            .apply(ConfigFile {
                library: Some(PathBuf::from("stories/lib.toml")),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.library, PathBuf::from("/work/stories/lib.toml"));
    }

    #[test]
    fn test_apply_rejects_empty_library() {
        let mut config = ScribeConfig::new(PathBuf::from("/work"));
        let result = config.apply(ConfigFile {
            library: Some(PathBuf::new()),
            ..Default::default()
        });
        assert!(matches!(result, Err(ScribeError::InvalidConfig(_))));
    }
}
