pub mod anthropic;
pub mod github_models;
pub mod prompt_builder;
pub mod prompts;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::error::ConfigError;

/// Trait for talking to an LLM (real backend).
pub trait LlmClient: Send + Sync {
    /// Turn the assembled PR context into QA testing instructions.
    fn generate_qa_instructions(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Character budgets for each section of the prompt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    pub max_diff_chars: usize,
    pub max_changed_files_chars: usize,
    pub max_file_chars: usize,
    pub max_file_tree_chars: usize,
    pub max_total_chars: usize,
}

/// Sized for Claude's large context window.
pub const ANTHROPIC_CONTEXT_LIMITS: ContextLimits = ContextLimits {
    max_diff_chars: 80_000,
    max_changed_files_chars: 60_000,
    max_file_chars: 10_000,
    max_file_tree_chars: 20_000,
    max_total_chars: 180_000,
};

/// GitHub Models caps input at roughly 8K tokens.
pub const GITHUB_MODELS_CONTEXT_LIMITS: ContextLimits = ContextLimits {
    max_diff_chars: 12_000,
    max_changed_files_chars: 8_000,
    max_file_chars: 4_000,
    max_file_tree_chars: 2_000,
    max_total_chars: 24_000,
};

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_GITHUB_MODELS_MODEL: &str = "openai/gpt-4o";

/// Which backend generates the instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    GithubModels,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::GithubModels, Provider::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GithubModels => "github-models",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::GithubModels => DEFAULT_GITHUB_MODELS_MODEL,
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }

    pub fn context_limits(&self) -> ContextLimits {
        match self {
            Provider::GithubModels => GITHUB_MODELS_CONTEXT_LIMITS,
            Provider::Anthropic => ANTHROPIC_CONTEXT_LIMITS,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidProvider {
                value: s.to_string(),
                valid: Provider::ALL
                    .iter()
                    .map(Provider::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// A non-empty override wins; otherwise the provider's default model.
pub fn resolve_model(provider: Provider, model: &str) -> String {
    if model.is_empty() {
        provider.default_model().to_string()
    } else {
        model.to_string()
    }
}
