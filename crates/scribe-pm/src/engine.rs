//! Core prompt engine trait definition.

use crate::context::PromptParserConfig;
use crate::error::Result;
use crate::parser::ParsedPrompt;
use scribe_core::Prompt;
use std::future::Future;

/// Trait for resolving prompt templates into role-tagged messages.
///
/// Implementations look up a template, build a resolution context for the
/// request and expand every message of the template in order.
///
/// # Examples
///
/// ```no_run
/// use scribe_core::Library;
/// use scribe_pm::{PromptEngine, PromptParser, PromptParserConfig};
///
/// async fn resolve(parser: &PromptParser<Library>) {
///     let config = PromptParserConfig::new("scene-beat", "story-1");
///     let parsed = parser.parse(&config).await;
///     match parsed.error() {
///         Some(error) => eprintln!("cannot generate: {error}"),
///         None => println!("{} messages", parsed.messages().len()),
///     }
/// }
/// ```
pub trait PromptEngine {
    /// Resolves the prompt named by `config.prompt_id`.
    ///
    /// Never fails: a missing prompt or a store failure is reported through
    /// [`ParsedPrompt::error`], with no messages.
    ///
    /// # Arguments
    ///
    /// * `config` - The prompt id, story, chapter and generation state to
    ///   resolve against
    fn parse(&self, config: &PromptParserConfig) -> impl Future<Output = ParsedPrompt> + Send;

    /// Lists available prompts, sorted by name.
    ///
    /// # Arguments
    ///
    /// * `prompt_type` - Only return prompts of this type (e.g. `scene_beat`)
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt store cannot be read.
    fn list_prompts(
        &self,
        prompt_type: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Prompt>>> + Send;
}
