//! Mock LLM clients for testing.
//!
//! Provide deterministic responses based on input patterns, without making
//! real API calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{BlueQueryError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Mock client that returns canned responses based on input patterns.
///
/// When the last user message contains a registered pattern, the matching
/// response is returned; otherwise the reply is empty, which callers treat
/// as a miss. Records call counts and temperatures for assertions.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    calls: AtomicUsize,
    temperatures: Mutex<Vec<f32>>,
}

impl MockLlmClient {
    /// Creates a new mock client with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern` (case-insensitive), the mock
    /// returns `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Returns the number of completed calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the temperatures passed to each call, in order.
    pub fn temperatures(&self) -> Vec<f32> {
        self.temperatures
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Generates a mock response based on the input.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }
        String::new()
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut temps) = self.temperatures.lock() {
            temps.push(temperature);
        }

        let input = Self::extract_user_input(messages);
        Ok(self.mock_response(&input))
    }
}

/// Mock client whose requests always fail.
#[derive(Debug, Default)]
pub struct FailingLlmClient {
    calls: AtomicUsize,
}

impl FailingLlmClient {
    /// Creates a new failing client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attempted calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(&self, _messages: &[Message], _temperature: f32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BlueQueryError::llm("Simulated provider failure"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_registered_response() {
        let client = MockLlmClient::new().with_response("nearest float", "SELECT 1;");
        let messages = vec![Message::user("Find the nearest float to 15N 90E")];

        let response = client.complete(&messages, 0.0).await.unwrap();

        assert_eq!(response, "SELECT 1;");
    }

    #[tokio::test]
    async fn test_mock_matching_is_case_insensitive() {
        let client = MockLlmClient::new().with_response("ARGO", "## Answer\n\nFloats.");
        let messages = vec![Message::user("what is argo?")];

        let response = client.complete(&messages, 0.3).await.unwrap();

        assert!(response.contains("Floats."));
    }

    #[tokio::test]
    async fn test_mock_defaults_to_empty_reply() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user("unmatched input")];

        let response = client.complete(&messages, 0.2).await.unwrap();

        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_mock_matches_last_user_message() {
        let client = MockLlmClient::new().with_response("second", "matched");
        let messages = vec![
            Message::system("You are an assistant."),
            Message::user("second question"),
        ];

        let response = client.complete(&messages, 0.0).await.unwrap();

        assert_eq!(response, "matched");
    }

    #[tokio::test]
    async fn test_mock_records_calls_and_temperatures() {
        let client = MockLlmClient::new();
        let messages = vec![Message::user("hi")];

        client.complete(&messages, 0.0).await.unwrap();
        client.complete(&messages, 0.3).await.unwrap();

        assert_eq!(client.calls(), 2);
        assert_eq!(client.temperatures(), vec![0.0, 0.3]);
    }

    #[tokio::test]
    async fn test_failing_client_errors_and_counts() {
        let client = FailingLlmClient::new();
        let messages = vec![Message::user("hi")];

        let result = client.complete(&messages, 0.0).await;

        assert!(result.is_err());
        assert_eq!(client.calls(), 1);
    }
}
