use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai::Message;

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    auth_headers: header::HeaderMap,
    endpoint: String,
    model: Option<String>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAICompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAICompletionResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

impl OpenAIClient {
    pub fn new(
        api_key: &str,
        endpoint: Option<&str>,
        model: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<Self, String> {
        let endpoint_url = endpoint
            .unwrap_or("https://api.openai.com/v1/chat/completions")
            .to_string();

        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // Only add auth header if API key is provided and not empty
        if !api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?;
            auth_headers.insert(header::AUTHORIZATION, auth_value);
        }

        // Determine model: use provided model, or infer from endpoint URL
        let model_name = match model {
            Some(m) if !m.is_empty() => Some(m.to_string()),
            _ => {
                if endpoint_url.contains("openai.com") {
                    Some("gpt-4o".to_string())
                } else {
                    None
                }
            }
        };

        Ok(Self {
            client: crate::http::shared_client().clone(),
            auth_headers,
            endpoint: endpoint_url,
            model: model_name,
            max_tokens: max_tokens.unwrap_or(4096),
        })
    }

    pub async fn generate_text(&self, messages: Vec<Message>) -> Result<String, String> {
        let api_messages: Vec<OpenAIMessage> = messages
            .into_iter()
            .map(|m| OpenAIMessage {
                role: m.role.to_string(),
                content: m.content,
            })
            .collect();

        let request = OpenAICompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            max_tokens: self.max_tokens,
        };

        log::debug!(
            "[AI] sending request to {} with model {}",
            self.endpoint,
            self.model.as_deref().unwrap_or("(endpoint default)")
        );

        // Retry configuration for transient errors
        const MAX_RETRIES: u32 = 3;
        const BASE_DELAY_MS: u64 = 2000;

        let mut last_error = String::new();

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 2s, 4s, 8s
                let delay_ms = BASE_DELAY_MS * (1 << (attempt - 1));
                log::warn!(
                    "[AI] retry attempt {}/{} after {}ms delay",
                    attempt,
                    MAX_RETRIES,
                    delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .headers(self.auth_headers.clone())
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    // Network errors are retryable
                    last_error = format!("AI API request failed: {}", e);
                    if attempt < MAX_RETRIES {
                        log::warn!("[AI] request failed (attempt {}): {}", attempt + 1, e);
                        continue;
                    }
                    return Err(last_error);
                }
            };

            let status = response.status();
            let status_code = status.as_u16();
            let is_retryable = matches!(status_code, 429 | 502 | 503 | 504);

            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();

                if is_retryable && attempt < MAX_RETRIES {
                    log::warn!(
                        "[AI] retryable status {} (attempt {}): {}",
                        status,
                        attempt + 1,
                        truncate(&error_text, 200)
                    );
                    last_error = format!("HTTP {}: {}", status, error_text);
                    continue;
                }

                return Err(describe_error(status_code, &error_text));
            }

            let completion: OpenAICompletionResponse = response
                .json()
                .await
                .map_err(|e| format!("Failed to parse AI API response: {}", e))?;

            let content = completion
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default();
            return Ok(content);
        }

        Err(last_error)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() > max { &text[..max] } else { text }
}

fn describe_error(status_code: u16, error_text: &str) -> String {
    if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(error_text) {
        return format!("AI API error: {}", error_response.error.message);
    }

    // Don't include HTML error pages or overly long error bodies
    let trimmed = error_text.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        match status_code {
            502 => "AI API returned 502 Bad Gateway (provider temporarily unavailable)".to_string(),
            503 => "AI API returned 503 Service Unavailable (provider temporarily unavailable)"
                .to_string(),
            504 => "AI API returned 504 Gateway Timeout (provider did not respond in time)"
                .to_string(),
            _ => format!("AI API returned error status: {} (HTML error page)", status_code),
        }
    } else {
        format!(
            "AI API returned error status: {}, body: {}",
            status_code,
            truncate(error_text, 200)
        )
    }
}
