use thiserror::Error;

/// Problems with the run's inputs. All of these are detected before any
/// network call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid provider \"{value}\". Must be one of: {valid}")]
    InvalidProvider { value: String, valid: String },

    #[error("The \"anthropic-api-key\" input is required when provider is \"anthropic\"")]
    MissingAnthropicApiKey,

    #[error("The \"github-token\" input is required")]
    MissingGithubToken,

    #[error("GITHUB_REPOSITORY (or --repo) is required")]
    MissingRepository,

    #[error("Invalid repository \"{0}\", expected owner/repo")]
    InvalidRepository(String),

    #[error("This action only runs on pull_request events (no pull request found in the event payload)")]
    NotPullRequestEvent,
}

/// Failures talking to a text-generation backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} API request failed: {status} {reason}")]
    RequestFailed {
        provider: &'static str,
        status: u16,
        reason: String,
    },

    #[error("No text content in Claude response")]
    NoTextContent,

    #[error("No content in GitHub Models response")]
    NoContent,
}
