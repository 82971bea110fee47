//! Chat-completions HTTP client.
//!
//! Both supported providers (Groq and xAI) expose the same OpenAI-style
//! `/chat/completions` endpoint, so a single client covers them. The
//! endpoint URL, model, and credential come from [`ProviderSettings`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::error::{BlueQueryError, Result};
use crate::llm::types::Message;
use crate::llm::LlmClient;

/// Timeout for chat-completions requests.
const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// User-Agent header sent with every request.
const USER_AGENT: &str = "BlueQuery/1.0";

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    settings: ProviderSettings,
    client: Client,
}

impl ChatClient {
    /// Creates a new client for the given provider settings.
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BlueQueryError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    /// Returns the model name sent with each request.
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Converts internal messages to the wire format.
    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| ChatMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    /// Parses an API error response into a crate error.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> BlueQueryError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return BlueQueryError::llm("Authentication failed. Check the provider API key.");
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return BlueQueryError::llm("Rate limited by the provider.");
        }

        // Try to parse a structured error message from the response
        if let Ok(error_response) = serde_json::from_str::<ChatErrorResponse>(body) {
            return BlueQueryError::llm(format!(
                "Provider API error: {}",
                error_response.error.message
            ));
        }

        BlueQueryError::llm(format!("Provider API error ({}): {}", status, body))
    }
}

#[async_trait]
impl LlmClient for ChatClient {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: Self::convert_messages(messages),
            temperature,
        };

        debug!(
            "Sending chat request to {} (model {})",
            self.settings.base_url, self.settings.model
        );

        let response = self
            .client
            .post(&self.settings.base_url)
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BlueQueryError::llm("Request timed out.")
                } else if e.is_connect() {
                    BlueQueryError::llm("Failed to connect to the provider endpoint.")
                } else {
                    BlueQueryError::llm(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BlueQueryError::llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| BlueQueryError::llm(format!("Failed to parse response: {}", e)))?;

        // A well-formed body with no choices or no content yields an empty
        // reply, which callers treat as a miss.
        let reply = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        Ok(reply.trim().to_string())
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatError,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}
