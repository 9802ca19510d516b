/// LLM Client: the single point of entry for all text-generation calls in Pathfinder.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All generator interactions MUST go through the `TextGenerator` trait.
///
/// Model: claude-sonnet-4-5 (hardcoded, not configurable)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
pub mod repair;
#[cfg(test)]
pub mod testing;

use prompts::JSON_ONLY_SYSTEM;
use repair::{isolate_json_object, strip_code_fences};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER_NAME: &str = "anthropic";
/// The model used for all generator calls in Pathfinder.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Content blocked: {0}")]
    Blocked(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Text generator is not configured")]
    NotConfigured,
}

/// Output shape requested from the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
}

/// One generator call: user prompt, system prompt and output constraints.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system: String,
    pub response_format: ResponseFormat,
    pub schema: Option<Value>,
}

impl GenerationRequest {
    pub fn json(prompt: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: system.into(),
            response_format: ResponseFormat::Json,
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// System prompt as sent on the wire: JSON requests carry the JSON-only
    /// instruction and, when present, the schema.
    fn effective_system(&self) -> String {
        match self.response_format {
            ResponseFormat::Text => self.system.clone(),
            ResponseFormat::Json => {
                let mut system = format!("{}\n\n{}", self.system, JSON_ONLY_SYSTEM);
                if let Some(schema) = &self.schema {
                    system.push_str("\n\nThe JSON MUST conform to this JSON schema:\n");
                    system.push_str(&schema.to_string());
                }
                system
            }
        }
    }
}

/// Raw text returned by a provider, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub text: String,
    pub provider: String,
    pub model: String,
}

/// The generator contract every synthesis path depends on.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`; tests swap in a scripted double.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError>;

    /// False when calls are guaranteed to fail with `NotConfigured`.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Calls the generator and deserializes the repaired text response as JSON.
/// Strips code fences and trailing prose before parsing.
pub async fn generate_json<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<(T, Generation), LlmError> {
    let generation = generator.generate(request).await?;
    let parsed = parse_json_lenient(&generation.text)?;
    Ok((parsed, generation))
}

/// Parses the first JSON object found in free text.
pub fn parse_json_lenient<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let cleaned = strip_code_fences(text);
    let candidate = isolate_json_object(&cleaned).unwrap_or(cleaned.trim());
    serde_json::from_str(candidate).map_err(LlmError::Parse)
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API. One attempt per call: retries belong to
/// the orchestration layer, not the transport.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    messages_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            messages_url: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        })
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.messages_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("LLM API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider selection
// ────────────────────────────────────────────────────────────────────────────

/// The configured provider. Missing credentials select `Disabled`, whose calls
/// fail fast so every caller takes its fallback path.
#[derive(Clone)]
pub enum LlmClient {
    Anthropic(AnthropicClient),
    Disabled,
}

impl LlmClient {
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        match config.anthropic_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(LlmClient::Anthropic(AnthropicClient::new(
                key.to_string(),
                &config.anthropic_base_url,
                Duration::from_secs(config.llm_timeout_secs),
            )?)),
            _ => Ok(LlmClient::Disabled),
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let client = match self {
            LlmClient::Anthropic(client) => client,
            LlmClient::Disabled => return Err(LlmError::NotConfigured),
        };

        let system = request.effective_system();
        let response = client.call(&request.prompt, &system).await?;

        if response.stop_reason.as_deref() == Some("refusal") {
            return Err(LlmError::Blocked("refusal".to_string()));
        }

        let text = response.text().unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        if text.len() < 50 {
            warn!("Very short response from LLM ({} chars)", text.len());
        }

        Ok(Generation {
            text: text.to_string(),
            provider: PROVIDER_NAME.to_string(),
            model: MODEL.to_string(),
        })
    }

    fn is_configured(&self) -> bool {
        matches!(self, LlmClient::Anthropic(_))
    }
}
