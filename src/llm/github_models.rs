use super::LlmClient;
use crate::error::ProviderError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GITHUB_MODELS_URL: &str = "https://models.github.ai/inference/chat/completions";

/// Minimal request/response structs for the GitHub Models chat completions API.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// GitHub Models implementation of LlmClient, authenticated with the workflow token.
pub struct GitHubModelsClient {
    client: Client,
    token: String,
    model: String,
    url: String,
}

impl GitHubModelsClient {
    pub fn new(token: String, model: String) -> Result<Self> {
        Self::with_url(token, model, GITHUB_MODELS_URL.to_string())
    }

    pub fn with_url(token: String, model: String, url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to build HTTP client")?;

        Ok(GitHubModelsClient {
            client,
            token,
            model,
            url,
        })
    }

    fn call_chat(&self, req: &ChatRequest) -> Result<String> {
        let body = serde_json::to_string(req).context("failed to encode GitHub Models request")?;

        log::info!("Calling GitHub Models model {:?}", &req.model);
        log::debug!("GitHub Models request body size: {} bytes", body.len());

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .context("failed to send request to GitHub Models")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            log::debug!("GitHub Models error body: {text}");
            return Err(ProviderError::RequestFailed {
                provider: "GitHub Models",
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            }
            .into());
        }

        let chat_resp: ChatResponse = resp
            .json()
            .context("failed to parse GitHub Models response")?;

        if let Some(usage) = &chat_resp.usage {
            log::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProviderError::NoContent.into())
    }
}

impl LlmClient for GitHubModelsClient {
    fn generate_qa_instructions(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: user_prompt.to_string(),
                },
            ],
        };

        self.call_chat(&req)
    }
}
