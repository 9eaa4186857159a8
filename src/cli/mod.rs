pub mod run;
pub mod schema;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aireview")]
#[command(
    author,
    version,
    about = "AI-powered code review across one or more chat-completion endpoints"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review every matching file under the project path
    Run(RunArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone, Debug, Default)]
pub struct RunArgs {
    /// Path to config file (default: aireview.yaml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the project directory for review
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// URL of a single AI API endpoint
    #[arg(short, long)]
    pub url: Option<String>,

    /// Equivalent endpoints to rotate across (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub urls: Option<Vec<String>>,

    /// API key for authentication
    #[arg(short = 'k', long, env = "AIREVIEW_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// AI model to use for code review
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum file size in bytes to process
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Maximum number of concurrent reviews
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write reviews to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write a JSON run summary to this path
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Only review files changed since this ref (e.g., main, HEAD~5)
    #[arg(long)]
    pub diff_base: Option<String>,

    /// Show plan without calling any endpoint
    #[arg(long)]
    pub dry_run: bool,
}
