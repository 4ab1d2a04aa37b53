use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the BlogSpace binary.
#[derive(Debug, Parser)]
#[command(
    name = "blogspace",
    version,
    about = "BlogSpace terminal reader and authoring client"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "BLOGSPACE_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Browse articles interactively (default).
    Browse,
    /// Print the article list.
    List,
    /// Print one article in full.
    Show(ShowArgs),
    /// Publish a new article.
    Create(CreateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the blog collection API base URL.
    #[arg(long = "api-base-url", value_name = "URL", global = true)]
    pub api_base_url: Option<String>,

    /// Override the base URL used for share links.
    #[arg(long = "share-base-url", value_name = "URL", global = true)]
    pub share_base_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true",
        global = true
    )]
    pub log_json: Option<bool>,

    /// Use the narrow layout: list and detail panes are shown one at a time.
    #[arg(
        long = "narrow",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true",
        global = true
    )]
    pub narrow: Option<bool>,

    /// Override the render width in columns.
    #[arg(long = "width", value_name = "COLUMNS", global = true)]
    pub width: Option<u64>,

    /// Override the number of read retries.
    #[arg(long = "cache-retry", value_name = "COUNT", global = true)]
    pub cache_retry: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Article identifier.
    pub id: String,
}

#[derive(Debug, Args, Clone, Default)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    /// Body text; separate paragraphs with blank lines.
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the body text from a file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub content_file: Option<PathBuf>,

    /// Cover image URL; a placeholder is used when omitted.
    #[arg(long)]
    pub cover_image: Option<String>,

    /// Category tag (FINANCE, TECH, CAREER, EDUCATION, REGULATIONS, LIFESTYLE, SKILLS).
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,
}
