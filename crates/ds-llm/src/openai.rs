//! OpenAI-compatible chat-completions client
//!
//! Calls `POST {base_url}/chat/completions` once per generation — no
//! retry, no backoff. The API key comes from the `OPENAI_API_KEY`
//! environment variable and never lives in configuration files.

use crate::error::{LlmError, LlmResult};
use crate::generator::{Generation, TextGenerator, TokenUsage};
use async_trait::async_trait;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Text generator backed by an OpenAI-compatible endpoint.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiGenerator {
    /// Create a client for `model` against `base_url`, reading the API
    /// key from `OPENAI_API_KEY`.
    pub fn from_env(base_url: &str, model: &str) -> LlmResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY environment variable not set".into()))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> LlmResult<Generation> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        parse_chat_response(&json)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Extract content and token usage from a chat-completions response.
fn parse_chat_response(json: &serde_json::Value) -> LlmResult<Generation> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| LlmError::MalformedResponse("missing choices[0].message.content".into()))?
        .to_string();

    if content.trim().is_empty() {
        return Err(LlmError::MalformedResponse("empty completion".into()));
    }

    let tokens = TokenUsage {
        input_tokens: json
            .pointer("/usage/prompt_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0),
        output_tokens: json
            .pointer("/usage/completion_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0),
    };

    Ok(Generation { content, tokens })
}
