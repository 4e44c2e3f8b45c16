pub mod openai;

pub use openai::OpenAIClient;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Mock AI client for tests - returns pre-configured responses from a queue.
#[derive(Clone)]
pub struct MockAiClient {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
}

impl MockAiClient {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        MockAiClient {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
        }
    }

    /// Pop the next response from the queue, or a fallback if exhausted.
    fn next_response(&self) -> Result<String, String> {
        let mut queue = self.responses.lock().unwrap();
        queue
            .pop_front()
            .unwrap_or_else(|| Ok("(mock exhausted)".to_string()))
    }
}

/// Unified AI client that works with any configured provider
#[derive(Clone)]
pub enum AiClient {
    OpenAI(OpenAIClient),
    Mock(MockAiClient),
}

impl AiClient {
    pub fn from_config(config: &Config) -> Result<Self, String> {
        Ok(AiClient::OpenAI(OpenAIClient::new(
            &config.ai_api_key,
            Some(&config.ai_endpoint),
            config.ai_model.as_deref(),
            Some(config.ai_max_tokens),
        )?))
    }

    pub fn mock(responses: Vec<Result<String, String>>) -> Self {
        AiClient::Mock(MockAiClient::new(responses))
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, String> {
        match self {
            AiClient::OpenAI(client) => client.generate_text(messages).await,
            AiClient::Mock(mock) => mock.next_response(),
        }
    }
}

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

/// Strip `<think>...</think>` blocks some reasoning models emit before the
/// actual answer.
pub fn strip_think_tags(output: &str) -> String {
    THINK_BLOCK.replace_all(output, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_think_blocks() {
        let raw = "<think>let me reason\nacross lines</think>relevant";
        assert_eq!(strip_think_tags(raw), "relevant");
        assert_eq!(strip_think_tags("no tags"), "no tags");
    }

    #[tokio::test]
    async fn mock_returns_queued_responses_then_fallback() {
        let client = AiClient::mock(vec![Ok("first".to_string()), Err("boom".to_string())]);
        assert_eq!(client.generate_text(vec![]).await.unwrap(), "first");
        assert!(client.generate_text(vec![]).await.is_err());
        assert_eq!(
            client.generate_text(vec![]).await.unwrap(),
            "(mock exhausted)"
        );
    }
}
