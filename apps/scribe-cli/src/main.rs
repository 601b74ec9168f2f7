//! Scribe CLI - prompt resolution for story writing
//!
//! Command-line interface for Scribe, resolving stored prompt templates
//! against a story library and printing the messages a model would receive.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scribe_core::{
    ChapterStore, Library, LorebookEntry, LorebookStore, PovType, ScribeConfig, TagMap,
};
use scribe_pm::{PromptEngine, PromptParser, PromptParserConfig};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Scribe - prompt templates for story writing
///
/// Resolves prompt templates against stories, chapters and lorebooks.
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root containing .scribe/ (defaults to the nearest ancestor
    /// of the current directory that has one)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
}

/// Available Scribe commands
#[derive(Subcommand)]
enum Commands {
    /// Resolve a prompt into messages
    ///
    /// Looks up the prompt template, resolves every variable against the
    /// story and prints the resulting messages in order.
    Render(RenderArgs),

    /// List prompt templates
    Prompts {
        /// Only list prompts of this type (e.g. "scene_beat")
        #[arg(short = 't', long = "type")]
        prompt_type: Option<String>,
    },

    /// List lorebook entries whose tags appear in a text
    Matches {
        /// Story whose lorebook is searched
        #[arg(long)]
        story: String,

        /// Text to search
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// File containing the text to search
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Prompt template id
    #[arg(long)]
    prompt: String,

    /// Story id
    #[arg(long)]
    story: String,

    /// Chapter being written
    #[arg(long)]
    chapter: Option<String>,

    /// Scene beat text, inserted verbatim
    #[arg(long)]
    scenebeat: Option<String>,

    /// File holding the prose written before the cursor
    #[arg(long)]
    previous_words_file: Option<PathBuf>,

    /// File holding the plain text chapter content (defaults to the
    /// chapter's stored content)
    #[arg(long)]
    content_file: Option<PathBuf>,

    /// POV override: "first", "limited" or "omniscient"
    #[arg(long)]
    pov_type: Option<PovType>,

    /// POV character, used with --pov-type
    #[arg(long, requires = "pov_type")]
    pov_character: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Configuration decides the log filter, so load it before tracing starts
    let config = find_project_root(cli.root.as_deref())
        .and_then(|root| ScribeConfig::load(root).context("Failed to load Scribe configuration"));

    init_tracing(
        cli.verbose,
        config.as_ref().ok().map(|c| c.log_filter.as_str()),
    );

    // Execute command
    let result = match config {
        Ok(config) => run_command(cli.command, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        // Log with tracing
        error!("Command failed: {:#}", e);
        // Also print to stderr for CLI users
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing subscriber for structured logging.
///
/// Logs go to stderr so rendered prompts on stdout stay clean. `RUST_LOG`
/// takes precedence over both `--verbose` and the configured filter.
fn init_tracing(verbose: bool, log_filter: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("scribe=debug,scribe_core=debug,scribe_pm=debug")
        } else {
            EnvFilter::new(log_filter.unwrap_or(scribe_core::config::DEFAULT_LOG_FILTER))
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}

/// Execute the specified command
async fn run_command(command: Commands, config: &ScribeConfig) -> Result<()> {
    let library = load_library(config).await?;
    let parser = PromptParser::new(library);

    match command {
        Commands::Render(args) => {
            info!("Rendering prompt: {}", args.prompt);
            run_render(&parser, config, args).await
        }
        Commands::Prompts { prompt_type } => run_prompts(&parser, prompt_type.as_deref()).await,
        Commands::Matches { story, text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_text(&path).await?,
                (None, None) => anyhow::bail!("Either --text or --file is required"),
            };
            run_matches(parser.store(), &story, &text).await
        }
    }
}

/// Run the render command
async fn run_render(
    parser: &PromptParser<Library>,
    config: &ScribeConfig,
    args: RenderArgs,
) -> Result<()> {
    let library = parser.store();

    let chapter = match &args.chapter {
        Some(id) => library
            .chapter(id)
            .await
            .context("Failed to look up chapter")?,
        None => None,
    };

    let previous_words = match &args.previous_words_file {
        Some(path) => Some(read_text(path).await?),
        None => None,
    };

    let content = match &args.content_file {
        Some(path) => Some(read_text(path).await?),
        None => chapter.as_ref().map(|c| c.content.clone()),
    };

    // Tag matching feeds the matched entry variables
    let entries = library
        .entries_by_story(&args.story)
        .await
        .context("Failed to load lorebook")?;
    let tags = TagMap::build(&entries);

    let mut prompt_config = PromptParserConfig::new(&args.prompt, &args.story);
    if let Some(chapter_id) = &args.chapter {
        prompt_config = prompt_config.with_chapter(chapter_id);
    }
    if config.matching.chapter_content {
        if let Some(words) = &previous_words {
            prompt_config = prompt_config.with_matched_entries(tags.find_matches(words));
        }
        if let Some(content) = &content {
            prompt_config = prompt_config.with_chapter_matched_entries(tags.find_matches(content));
        }
    }
    if let Some(scenebeat) = &args.scenebeat {
        if config.matching.scene_beat {
            prompt_config =
                prompt_config.with_scene_beat_matched_entries(tags.find_matches(scenebeat));
        }
        prompt_config = prompt_config.with_scenebeat(scenebeat);
    }
    if let Some(words) = previous_words {
        prompt_config = prompt_config.with_previous_words(words);
    }
    if let Some(content) = content {
        prompt_config = prompt_config.with_plain_text_content(content);
    }
    if let Some(pov_type) = args.pov_type {
        prompt_config = prompt_config.with_pov(pov_type, args.pov_character.clone());
    }

    let parsed = parser.parse(&prompt_config).await;

    if args.json {
        let json = serde_json::to_string_pretty(&parsed).context("Failed to serialize result")?;
        println!("{json}");
    } else {
        let blocks: Vec<String> = parsed
            .messages()
            .iter()
            .map(|m| format!("[{}]\n{}", m.role, m.content))
            .collect();
        if !blocks.is_empty() {
            println!("{}", blocks.join("\n\n"));
        }
    }

    match parsed.error() {
        Some(e) => anyhow::bail!("{e}"),
        None => Ok(()),
    }
}

/// Run the prompts command
async fn run_prompts(parser: &PromptParser<Library>, prompt_type: Option<&str>) -> Result<()> {
    let prompts = parser
        .list_prompts(prompt_type)
        .await
        .context("Failed to list prompts")?;

    for prompt in prompts {
        println!("{}\t{}\t{}", prompt.id, prompt.prompt_type, prompt.name);
    }

    Ok(())
}

/// Run the matches command
async fn run_matches(library: &Library, story_id: &str, text: &str) -> Result<()> {
    let story = library.story(story_id)?;
    info!("Matching lorebook tags for story: {}", story.title);

    let entries: Vec<LorebookEntry> = library
        .entries_by_story(story_id)
        .await
        .context("Failed to load lorebook")?;
    let tags = TagMap::build(&entries);

    for entry in tags.find_matches(text) {
        println!("{}\t{}\t{}", entry.id, entry.category, entry.name);
    }

    Ok(())
}

/// Find the project root by searching for a .scribe directory.
///
/// An explicit `--root` is used as is. Without one, the search walks up
/// from the current directory and falls back to the current directory.
fn find_project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;

    // Search up the directory tree for .scribe
    let mut path = current_dir.as_path();
    loop {
        if path.join(".scribe").is_dir() {
            return Ok(path.to_path_buf());
        }

        match path.parent() {
            Some(parent) => path = parent,
            None => return Ok(current_dir),
        }
    }
}

/// Load the story library named by the configuration
async fn load_library(config: &ScribeConfig) -> Result<Library> {
    Library::load(&config.library).await.with_context(|| {
        format!(
            "Failed to load story library from {}",
            config.library.display()
        )
    })
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
