//! Prompt parser: the orchestrator that turns a template into messages.

use crate::context::{PromptParserConfig, ResolutionContext};
use crate::engine::PromptEngine;
use crate::error::{PromptError, Result};
use crate::expand::{expand_calls, substitute_variables};
use crate::scanner::{render, scan, strip_comments};
use crate::whitespace;
use scribe_core::{Prompt, PromptMessage, StoryStore};
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Outcome of a parse: either messages or an error, never both.
///
/// Serializes as `{"messages": [...]}` or `{"messages": [], "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPrompt {
    messages: Vec<PromptMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ParsedPrompt {
    pub fn success(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Resolved messages; empty whenever [`error`](Self::error) is set.
    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> std::result::Result<Vec<PromptMessage>, String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.messages),
        }
    }
}

/// Expands one message body against a context.
///
/// Strips comments, expands function calls, substitutes variables and
/// normalizes blank lines, in that order.
///
/// # Examples
///
/// ```
/// use scribe_pm::{expand_content, ResolutionContext};
///
/// let ctx = ResolutionContext {
///     previous_words: "a b c d e".to_string(),
///     ..Default::default()
/// };
/// let text = "/* tail */\n\n\n{{previous_words(2)}} {{missing}}";
/// assert_eq!(expand_content(text, &ctx), "c d e");
/// ```
pub fn expand_content(content: &str, ctx: &ResolutionContext) -> String {
    let stripped = strip_comments(content);
    let mut segments = scan(&stripped);
    expand_calls(&mut segments, ctx);
    substitute_variables(&mut segments, ctx);
    whitespace::normalize(&render(&segments))
}

/// Resolves prompt templates stored in a [`StoryStore`].
///
/// The parser holds no state besides its store; every call to
/// [`parse`](PromptEngine::parse) builds and drops its own context, so one
/// parser can serve concurrent requests.
///
/// # Examples
///
/// ```no_run
/// use scribe_core::Library;
/// use scribe_pm::{PromptEngine, PromptParser, PromptParserConfig};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let library = Library::load(Path::new(".scribe/library.toml")).await?;
/// let parser = PromptParser::new(library);
///
/// let config = PromptParserConfig::new("scene-beat", "story-1")
///     .with_scenebeat("Mara opens the door.");
/// let messages = parser.parse(&config).await.into_result()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PromptParser<S> {
    store: S,
}

impl<S: StoryStore> PromptParser<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn try_parse(&self, config: &PromptParserConfig) -> Result<Vec<PromptMessage>> {
        let prompt = self
            .store
            .prompt(&config.prompt_id)
            .await?
            .ok_or_else(|| PromptError::PromptNotFound(config.prompt_id.clone()))?;

        tracing::debug!(
            name = %prompt.name,
            prompt_type = %prompt.prompt_type,
            messages = prompt.messages.len(),
            "found prompt"
        );

        let context = ResolutionContext::build(config, &self.store).await?;

        let expanded = catch_unwind(AssertUnwindSafe(|| expand_messages(&prompt, &context)));
        expanded.map_err(|_| PromptError::Expansion(config.prompt_id.clone()))
    }
}

fn expand_messages(prompt: &Prompt, context: &ResolutionContext) -> Vec<PromptMessage> {
    prompt
        .messages
        .iter()
        .map(|message| PromptMessage {
            role: message.role,
            content: expand_content(&message.content, context),
        })
        .collect()
}

impl<S: StoryStore> PromptEngine for PromptParser<S> {
    #[tracing::instrument(skip_all, fields(prompt_id = %config.prompt_id))]
    async fn parse(&self, config: &PromptParserConfig) -> ParsedPrompt {
        tracing::debug!(
            story_id = %config.story_id,
            chapter_id = ?config.chapter_id,
            has_scenebeat = config.scenebeat.is_some(),
            previous_words_len = config.previous_words.as_deref().map_or(0, str::len),
            "parsing prompt"
        );

        match self.try_parse(config).await {
            Ok(messages) => {
                tracing::debug!(messages = messages.len(), "parsed prompt");
                ParsedPrompt::success(messages)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to parse prompt");
                ParsedPrompt::failure(e.to_string())
            }
        }
    }

    async fn list_prompts(&self, prompt_type: Option<&str>) -> Result<Vec<Prompt>> {
        let mut prompts: Vec<Prompt> = self
            .store
            .prompts()
            .await?
            .into_iter()
            .filter(|p| prompt_type.is_none_or(|t| p.prompt_type == t))
            .collect();

        prompts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(prompts)
    }
}
