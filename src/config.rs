use crate::Cli;
use crate::error::ConfigError;
use crate::event;
use crate::github::DEFAULT_API_URL;
use crate::pr::RepoRef;
use crate::setup::ProviderConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Final resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub provider: String,
    /// Raw override; empty means "use the provider default".
    pub model: String,
    pub anthropic_api_key: String,
    pub prompt: String,
    pub repo: RepoRef,
    pub pr_number: u64,
    pub api_url: String,
    pub output_file: Option<PathBuf>,
    pub dry_run: bool,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags / Actions inputs (`--model`, `INPUT_MODEL`)
    ///   2. Plain env vars for secrets (`GITHUB_TOKEN`, `ANTHROPIC_API_KEY`)
    ///   3. TOML `~/.config/qa-instructions.toml`
    ///   4. Hardcoded defaults
    ///
    /// Empty values count as unset, since Actions passes unset inputs as "".
    pub fn from_sources(cli: &Cli) -> Result<Self> {
        let file_cfg = match &cli.config {
            Some(path) => load_file_config(path)?,
            None => match config_path().filter(|p| p.exists()) {
                Some(path) => load_file_config(&path)?,
                None => FileConfig::default(),
            },
        };

        resolve(cli, file_cfg, |name| env::var(name).ok())
    }

    pub fn provider_config(&self) -> ProviderConfig<'_> {
        ProviderConfig {
            provider: &self.provider,
            model: &self.model,
            anthropic_api_key: &self.anthropic_api_key,
            github_token: &self.github_token,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FileConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub prompt: Option<String>,
}

pub(crate) fn resolve<F>(cli: &Cli, file_cfg: FileConfig, env_var: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let github_token = non_empty(cli.github_token.clone())
        .or_else(|| non_empty(env_var("GITHUB_TOKEN")))
        .ok_or(ConfigError::MissingGithubToken)?;

    let anthropic_api_key = non_empty(cli.anthropic_api_key.clone())
        .or_else(|| non_empty(env_var("ANTHROPIC_API_KEY")))
        .unwrap_or_default();

    let provider = non_empty(cli.provider.clone())
        .or(non_empty(file_cfg.provider))
        .unwrap_or_else(|| crate::llm::Provider::default().as_str().to_string());

    let model = non_empty(cli.model.clone())
        .or(non_empty(file_cfg.model))
        .unwrap_or_default();

    let prompt = non_empty(cli.prompt.clone())
        .or(non_empty(file_cfg.prompt))
        .unwrap_or_default();

    let repo: RepoRef = non_empty(cli.repo.clone())
        .ok_or(ConfigError::MissingRepository)?
        .parse()?;

    let pr_number = match (cli.pr, &cli.event_path) {
        (Some(number), _) => number,
        (None, Some(path)) => event::pull_request_number_from_file(path)?,
        (None, None) => return Err(ConfigError::NotPullRequestEvent.into()),
    };

    let api_url = non_empty(cli.api_url.clone()).unwrap_or_else(|| DEFAULT_API_URL.to_string());

    Ok(Config {
        github_token,
        provider,
        model,
        anthropic_api_key,
        prompt,
        repo,
        pr_number,
        api_url,
        output_file: cli.output_file.clone(),
        dry_run: cli.dry_run,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Return `~/.config/qa-instructions.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("qa-instructions.toml"))
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str::<FileConfig>(&data)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
