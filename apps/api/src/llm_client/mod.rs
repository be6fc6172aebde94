/// LLM Client — the single point of entry for generative-text provider calls.
///
/// Two providers are consulted in a fixed order:
/// 1. the primary OpenAI-compatible chat-completions endpoint (only when an API key is set)
/// 2. a locally hosted Ollama-compatible `/api/chat` endpoint, read as a stream
///
/// There is no retry beyond that single fallback.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LlmSettings;

pub mod prompts;
pub mod stream;

/// The model used for every primary-provider call.
/// Hardcoded so the output shape does not drift between deployments.
pub const PRIMARY_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("all providers failed (primary: {primary}; fallback: {fallback})")]
    AllProvidersFailed { primary: String, fallback: String },
}

/// Produces a raw assessment reply for a document. Carried in `AppState`
/// as `Arc<dyn DocumentAnalyzer>` so the upload pipeline can run against a stub.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str, product: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct PrimaryRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
}

#[derive(Debug, Serialize)]
struct FallbackRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
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

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    primary_api_key: Option<String>,
    primary_url: String,
    fallback_url: String,
    fallback_model: String,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(settings.request_timeout)
                .build()?,
            primary_api_key: settings.openai_api_key.clone(),
            primary_url: settings.openai_api_url.clone(),
            fallback_url: settings.ollama_url.clone(),
            fallback_model: settings.ollama_model.clone(),
        })
    }

    pub fn has_primary(&self) -> bool {
        self.primary_api_key.is_some()
    }

    pub fn fallback_model(&self) -> &str {
        &self.fallback_model
    }

    /// Single non-streaming call to the primary provider.
    /// Returns the first choice's message content verbatim.
    async fn call_primary(
        &self,
        api_key: &str,
        messages: &[ChatMessage<'_>],
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.primary_url)
            .bearer_auth(api_key)
            .json(&PrimaryRequest {
                model: PRIMARY_MODEL,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyContent)
    }

    /// Streaming call to the fallback provider. The body is drained into a
    /// finite list of chunks, then folded into one reply.
    async fn call_fallback(&self, messages: &[ChatMessage<'_>]) -> Result<String, LlmError> {
        let mut response = self
            .client
            .post(&self.fallback_url)
            .json(&FallbackRequest {
                model: &self.fallback_model,
                messages,
                stream: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let mut chunks = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            chunks.push(String::from_utf8_lossy(&chunk).into_owned());
        }
        debug!("Fallback stream finished after {} chunks", chunks.len());

        Ok(stream::accumulate_content(chunks.iter().map(String::as_str)))
    }
}

#[async_trait]
impl DocumentAnalyzer for LlmClient {
    async fn analyze(&self, text: &str, product: &str) -> Result<String, LlmError> {
        let system = prompts::analysis_system_prompt(product);
        let messages = [
            ChatMessage {
                role: "system",
                content: &system,
            },
            ChatMessage {
                role: "user",
                content: text,
            },
        ];

        let primary_failure = match &self.primary_api_key {
            Some(api_key) => match self.call_primary(api_key, &messages).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!("Primary provider failed, falling back: {e}");
                    e.to_string()
                }
            },
            None => "not configured".to_string(),
        };

        info!(
            "Using fallback provider (model: {})",
            self.fallback_model
        );
        self.call_fallback(&messages)
            .await
            .map_err(|e| LlmError::AllProvidersFailed {
                primary: primary_failure,
                fallback: e.to_string(),
            })
    }
}
