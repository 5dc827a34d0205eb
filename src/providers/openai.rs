use crate::error::LlmError;
use crate::providers::traits::Provider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for any OpenAI-compatible `chat/completions` endpoint. The base URL
/// and model name are opaque configuration; the provider performs no retry or
/// rate-limit handling.
pub struct OpenAiCompatProvider {
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

const MAX_COMPLETION_TOKENS: u32 = 16_000;

impl OpenAiCompatProvider {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            cached_auth_header: format!("Bearer {api_key}"),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(180))
                .connect_timeout(std::time::Duration::from_secs(10))
                .pool_max_idle_per_host(4)
                .tcp_keepalive(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn provider_label(&self) -> String {
        format!("openai-compat({})", self.base_url)
    }

    fn build_request(
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> ChatRequest {
        let capacity = if system_prompt.is_some() { 2 } else { 1 };
        let mut messages = Vec::with_capacity(capacity);

        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }

        messages.push(Message {
            role: "user",
            content: message.to_string(),
        });

        ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens: MAX_COMPLETION_TOKENS,
            stream: false,
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String, LlmError> {
        let request = Self::build_request(system_prompt, message, model, temperature);

        tracing::info!(url = %self.chat_url(), model, "requesting completion");

        let response = self
            .client
            .post(self.chat_url())
            .header("Authorization", &self.cached_auth_header)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                provider: self.provider_label(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(super::api_error(&self.provider_label(), response).await);
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| LlmError::Request {
                provider: self.provider_label(),
                message: format!("response JSON decode failed: {e}"),
            })?;

        let content = chat_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: self.provider_label(),
            });
        }

        Ok(content.to_string())
    }

    async fn warmup(&self) -> Result<(), LlmError> {
        // HEAD against the base URL; any response at all proves the pool is warm.
        let _ = self.client.head(&self.base_url).send().await;
        Ok(())
    }
}
