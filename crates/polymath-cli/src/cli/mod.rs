pub mod catalog;
pub mod content;
pub mod doctor;
pub mod generate;
pub mod seed;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use polymath_core::{AppContext, Config};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "polymath")]
#[command(version, about = "Essays and debates written in the voice of expert personas")]
pub struct Cli {
    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long, global = true, env = "POLYMATH_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace fields and experts with the contents of the seed files
    Seed(SeedArgs),
    /// List fields of expertise
    Fields,
    /// List the experts of one field
    Experts(ExpertsArgs),
    /// Ask the model for essay topics
    Topics(TopicsArgs),
    /// Write and store an essay
    Essay(EssayArgs),
    /// Write and store a debate between two experts
    Debate(DebateArgs),
    /// List stored essays and debates
    Content(ContentArgs),
    /// Attach an embedding to stored content
    Embed(EmbedArgs),
    /// Show the effective configuration and test the database connection
    CheckConfig,
}

#[derive(Args, Debug)]
pub struct SeedArgs {
    #[arg(long, default_value = polymath_core::seed::DEFAULT_FIELDS_PATH)]
    pub fields: PathBuf,

    #[arg(long, default_value = polymath_core::seed::DEFAULT_EXPERTS_PATH)]
    pub experts: PathBuf,

    /// Parse and check the files without touching the database
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ExpertsArgs {
    /// Field name, e.g. "psychology"
    pub field: String,
}

#[derive(Args, Debug)]
pub struct TopicsArgs {
    pub field: String,

    /// Expert name (random expert of the field when omitted)
    #[arg(long)]
    pub expert: Option<String>,
}

#[derive(Args, Debug)]
pub struct EssayArgs {
    pub field: String,

    #[arg(long)]
    pub expert: Option<String>,

    /// Essay topic (first model suggestion when omitted)
    #[arg(long)]
    pub topic: Option<String>,

    /// Attach an embedding after saving
    #[arg(long)]
    pub embed: bool,
}

#[derive(Args, Debug)]
pub struct DebateArgs {
    pub field_1: String,
    pub field_2: String,

    #[arg(long)]
    pub expert_1: Option<String>,

    #[arg(long)]
    pub expert_2: Option<String>,

    /// Debate title (suggested by the model when omitted)
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub embed: bool,
}

#[derive(Args, Debug)]
pub struct ContentArgs {
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Record id, e.g. generated_content:abc123
    pub id: String,
}

pub fn load_config(env_file: Option<&Path>) -> Result<Config> {
    Config::load(env_file).context("Failed to load configuration")
}

pub async fn connect(env_file: Option<&Path>) -> Result<AppContext> {
    let config = load_config(env_file)?;
    AppContext::connect(&config)
        .await
        .context("Failed to connect to SurrealDB")
}

// --- Table printing helpers ---

pub fn print_rule(width: usize) {
    println!("{}", "─".repeat(width));
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max - 1).collect::<String>())
    }
}
