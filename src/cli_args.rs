use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// CLI options. Every input can also come from the environment GitHub Actions
/// sets up for a step (`INPUT_*`, `GITHUB_*`).
#[derive(Parser, Debug, Default)]
#[command(
    name = "qa-instructions",
    version,
    about = "LLM-generated QA testing instructions for GitHub pull requests"
)]
pub struct Cli {
    /// GitHub token used for the REST API (and for GitHub Models)
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Model provider: github-models or anthropic
    #[arg(long, env = "INPUT_PROVIDER")]
    pub provider: Option<String>,

    /// Anthropic API key, required when provider is anthropic
    #[arg(long, env = "INPUT_ANTHROPIC-API-KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// Extra instructions appended to the prompt
    #[arg(long, env = "INPUT_PROMPT")]
    pub prompt: Option<String>,

    /// Model name override (defaults depend on the provider)
    #[arg(long, env = "INPUT_MODEL")]
    pub model: Option<String>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// Pull request number; read from the event payload if omitted
    #[arg(long)]
    pub pr: Option<u64>,

    /// Path to the triggering event's JSON payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// File that receives step outputs; prints to stdout when unset
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output_file: Option<PathBuf>,

    /// Generate and print the instructions without commenting on the PR
    #[arg(long)]
    pub dry_run: bool,

    /// TOML config file (defaults to ~/.config/qa-instructions.toml)
    #[arg(long, env = "QA_INSTRUCTIONS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
