//! Command-line interface for vidstudy.
//!
//! Provides commands for fetching transcripts, generating study material,
//! managing accounts and browsing a user's saved library.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::adapters::{GeminiClient, GenerativeModel, TranscriptSource, YouTubeTranscripts};
use crate::config::ResolvedConfig;
use crate::core::{ContentGenerator, Orchestrator, TranscriptResolver};
use crate::domain::{ContentKind, SavedArtifact, VideoReference};
use crate::library::{Library, Session};

/// vidstudy - Study material from video transcripts
#[derive(Parser, Debug)]
#[command(name = "vidstudy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the transcript of a video
    Transcript {
        /// Video URL
        url: String,
    },

    /// Generate study material from a video
    Generate {
        /// Video URL
        url: String,

        /// What to generate
        #[arg(short, long, value_enum, default_value = "summary")]
        kind: KindArg,

        /// Save the result to your library (requires credentials)
        #[arg(short, long)]
        save: bool,

        /// Title to save under (defaults to the video title)
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        credentials: OptionalCredentials,
    },

    /// Create an account
    Register {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// List saved items, newest first
    Library {
        #[command(flatten)]
        credentials: Credentials,

        /// Maximum number of items to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a saved item
    Show {
        /// Item id
        id: i64,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Delete a saved item
    Delete {
        /// Item id
        id: i64,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Args, Debug)]
pub struct Credentials {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "VIDSTUDY_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct OptionalCredentials {
    #[arg(short, long)]
    pub username: Option<String>,

    #[arg(short, long, env = "VIDSTUDY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Content kind for CLI (maps to ContentKind)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Concise summary
    Summary,

    /// Practice exercises
    Exercises,

    /// Multiple-choice quiz
    Quiz,
}

impl From<KindArg> for ContentKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Summary => ContentKind::Summary,
            KindArg::Exercises => ContentKind::Exercises,
            KindArg::Quiz => ContentKind::Quiz,
        }
    }
}

/// Everything a command needs, built once from the resolved configuration
pub struct AppContext {
    config: ResolvedConfig,
}

impl AppContext {
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Production transcript source
    pub fn transcript_source(&self) -> Arc<dyn TranscriptSource> {
        Arc::new(
            YouTubeTranscripts::with_base_url(self.config.transcript_base_url.clone())
                .with_timeout(self.config.limits.transcript_timeout()),
        )
    }

    /// Production generative model; fails when no API key is configured
    pub fn model(&self) -> Result<Arc<dyn GenerativeModel>> {
        let api_key = self.config.require_api_key()?;
        Ok(Arc::new(GeminiClient::with_base_url(
            api_key,
            self.config.model.clone(),
            self.config.generation_base_url.clone(),
        )))
    }

    pub fn resolver(&self, source: Arc<dyn TranscriptSource>) -> TranscriptResolver {
        TranscriptResolver::new(source)
            .with_languages(self.config.languages.clone())
            .with_retry(self.config.retry.clone())
    }

    /// Orchestrator over the given collaborators, configured from settings
    pub fn orchestrator(
        &self,
        source: Arc<dyn TranscriptSource>,
        model: Arc<dyn GenerativeModel>,
    ) -> Orchestrator {
        let generator = ContentGenerator::new(model)
            .with_temperature(self.config.temperature)
            .with_limits(self.config.limits.clone())
            .with_retry(self.config.retry.clone());
        Orchestrator::new(self.resolver(source), generator)
    }

    pub fn library(&self) -> Result<Library> {
        Library::open(
            &self.config.database,
            self.config.pool_size,
            self.config.password_iterations,
        )
        .with_context(|| format!("Failed to open library at {}", self.config.database.display()))
    }

    async fn login(&self, library: &Library, credentials: &Credentials) -> Result<Session> {
        library
            .login(&credentials.username, &credentials.password)
            .await
            .context("Login failed")
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let ctx = AppContext::new(ResolvedConfig::load()?);

        match self.command {
            Commands::Transcript { url } => show_transcript(&ctx, &url).await,
            Commands::Generate {
                url,
                kind,
                save,
                title,
                credentials,
            } => generate(&ctx, &url, kind.into(), save, title, credentials).await,
            Commands::Register { credentials } => register(&ctx, &credentials).await,
            Commands::Library { credentials, limit } => {
                list_library(&ctx, &credentials, limit).await
            }
            Commands::Show { id, credentials } => show_item(&ctx, id, &credentials).await,
            Commands::Delete { id, credentials } => delete_item(&ctx, id, &credentials).await,
            Commands::Config => {
                println!("{}", ctx.config());
                Ok(())
            }
        }
    }
}

/// Print a video's transcript
async fn show_transcript(ctx: &AppContext, url: &str) -> Result<()> {
    let reference = VideoReference::parse(url);
    let video_id = reference
        .require_id()
        .with_context(|| format!("No video id found in '{}'", url.trim()))?;

    let resolved = ctx
        .resolver(ctx.transcript_source())
        .resolve_with_title(video_id)
        .await
        .with_context(|| format!("Could not get a transcript for {}", video_id))?;

    if let Some(title) = &resolved.title {
        eprintln!("{}", title);
    }
    eprintln!(
        "[{} segments, language {}{}]\n",
        resolved.transcript.segment_count,
        resolved.transcript.language_code,
        if resolved.transcript.translated { ", translated" } else { "" }
    );
    println!("{}", resolved.transcript.text);

    Ok(())
}

/// Run the pipeline and optionally save the result
async fn generate(
    ctx: &AppContext,
    url: &str,
    kind: ContentKind,
    save: bool,
    title: Option<String>,
    credentials: OptionalCredentials,
) -> Result<()> {
    // Log in first so bad credentials fail before spending a model call
    let saving = if save {
        let credentials = match (credentials.username, credentials.password) {
            (Some(username), Some(password)) => Credentials { username, password },
            _ => anyhow::bail!("--save requires --username and --password (or VIDSTUDY_PASSWORD)"),
        };
        let library = ctx.library()?;
        let session = ctx.login(&library, &credentials).await?;
        Some((library, session))
    } else {
        None
    };

    let orchestrator = ctx.orchestrator(ctx.transcript_source(), ctx.model()?);
    let outcome = orchestrator
        .run(url, kind)
        .await
        .with_context(|| format!("Failed to generate {} for {}", kind, url.trim()))?;

    println!("{}", outcome.artifact.content);
    eprintln!("\n[{} for \"{}\"]", kind, outcome.display_title());

    if let Some((library, session)) = saving {
        if library.save(&session, &outcome, title.as_deref()).await {
            eprintln!("[Saved to {}'s library]", session.username());
        } else {
            eprintln!("[Could not save to library; see log for details]");
        }
    }

    Ok(())
}

async fn register(ctx: &AppContext, credentials: &Credentials) -> Result<()> {
    let library = ctx.library()?;
    let user = library
        .register(&credentials.username, &credentials.password)
        .await
        .context("Registration failed")?;

    println!("Registered '{}' (id {})", user.username, user.id);
    Ok(())
}

/// List the user's library
async fn list_library(ctx: &AppContext, credentials: &Credentials, limit: usize) -> Result<()> {
    let library = ctx.library()?;
    let session = ctx.login(&library, credentials).await?;
    let items = library
        .list(&session, Some(limit))
        .await
        .context("Failed to read library")?;

    if items.is_empty() {
        println!("Library is empty. Use 'vidstudy generate <url> --save' to add content.");
        return Ok(());
    }

    println!("{:<6} {:<10} {:<20} {:<50}", "ID", "KIND", "CREATED", "TITLE");
    println!("{}", "-".repeat(88));

    for item in &items {
        println!(
            "{:<6} {:<10} {:<20} {:<50}",
            item.id,
            item.kind.to_string(),
            item.created_at.format("%Y-%m-%d %H:%M"),
            truncate_title(&item.title, 50)
        );
    }

    println!("\nShowing {} item(s)", items.len());
    Ok(())
}

async fn show_item(ctx: &AppContext, id: i64, credentials: &Credentials) -> Result<()> {
    let library = ctx.library()?;
    let session = ctx.login(&library, credentials).await?;
    let item = library
        .get(&session, id)
        .await
        .context("Failed to read library")?
        .ok_or_else(|| anyhow::anyhow!("Item not found: {}", id))?;

    print_item(&item);
    Ok(())
}

async fn delete_item(ctx: &AppContext, id: i64, credentials: &Credentials) -> Result<()> {
    let library = ctx.library()?;
    let session = ctx.login(&library, credentials).await?;

    if library.delete(&session, id).await.context("Failed to delete")? {
        println!("Deleted item {}", id);
        Ok(())
    } else {
        anyhow::bail!("Item not found: {}", id)
    }
}

fn print_item(item: &SavedArtifact) {
    println!("ID:      {}", item.id);
    println!("Title:   {}", item.title);
    println!("Video:   https://www.youtube.com/watch?v={}", item.video_id);
    println!("Kind:    {}", item.kind);
    println!("Created: {}", item.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("{}", "-".repeat(60));
    println!("{}", item.content);
}

/// Shorten a title to `max` characters, marking the cut with "..."
fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let kept: String = title.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
