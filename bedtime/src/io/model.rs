//! Model-call abstraction.
//!
//! The [`ModelClient`] trait decouples the story loop from the actual model
//! backend (currently an OpenAI-compatible chat-completions endpoint). Tests
//! use scripted clients that return predetermined replies without touching
//! the network.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::io::config::ModelConfig;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Single-turn text completion. No memory is kept between calls.
pub trait ModelClient {
    /// Send `prompt` and block until the full text reply is available.
    fn call(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            model: config.name.clone(),
            api_key: api_key.into(),
        })
    }

    /// Build a client using the credential from [`API_KEY_ENV`].
    pub fn from_env(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("{API_KEY_ENV} is missing. Add it to .env or export it in your shell.")
            })?;
        Self::new(config, api_key)
    }
}

impl ModelClient for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = max_tokens, temperature = temperature))]
    fn call(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        debug!(prompt_bytes = prompt.len(), "sending chat completion");
        let request = build_request(&self.model, prompt, max_tokens, temperature);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .with_context(|| format!("post {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "chat completion failed");
            bail!("model API error (status {}): {}", status.as_u16(), body.trim());
        }

        let parsed: ChatCompletionResponse =
            response.json().context("parse chat completion response")?;
        let content = extract_content(parsed)?;
        debug!(reply_bytes = content.len(), "chat completion received");
        Ok(content)
    }
}

fn build_request<'a>(
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens,
        temperature,
        stream: false,
    }
}

fn extract_content(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("chat completion returned no choices"))?
        .message
        .content
        .ok_or_else(|| anyhow!("chat completion returned empty content"))
}
