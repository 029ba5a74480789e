use anyhow::Result;
use log::debug;

use crate::error::ConfigError;
use crate::llm::anthropic::AnthropicClient;
use crate::llm::github_models::GitHubModelsClient;
use crate::llm::{resolve_model, ContextLimits, LlmClient, Provider};

/// The inputs needed to pick and build a model backend.
#[derive(Debug, Clone, Copy)]
pub struct ProviderConfig<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub anthropic_api_key: &'a str,
    pub github_token: &'a str,
}

/// A ready-to-use backend plus the settings it was resolved with.
pub struct ProviderSetup {
    pub provider: Provider,
    pub model: String,
    pub limits: ContextLimits,
    pub client: Box<dyn LlmClient>,
}

/// Build the LLM client based on CLI + config. Never touches the network.
pub fn build_llm_client(cfg: &ProviderConfig<'_>) -> Result<ProviderSetup> {
    let provider: Provider = cfg.provider.parse()?;
    let model = resolve_model(provider, cfg.model);

    let client: Box<dyn LlmClient> = match provider {
        Provider::Anthropic => {
            if cfg.anthropic_api_key.is_empty() {
                return Err(ConfigError::MissingAnthropicApiKey.into());
            }
            debug!("Using AnthropicClient with model: {model}");
            Box::new(AnthropicClient::new(cfg.anthropic_api_key.to_string(), model.clone())?)
        }
        Provider::GithubModels => {
            debug!("Using GitHubModelsClient with model: {model}");
            Box::new(GitHubModelsClient::new(cfg.github_token.to_string(), model.clone())?)
        }
    };

    Ok(ProviderSetup {
        provider,
        model,
        limits: provider.context_limits(),
        client,
    })
}
