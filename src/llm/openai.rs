//! OpenAI Chat Completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, ServiceError, TextCompletionService};
use crate::config::LlmConfig;

/// OpenAI-compatible chat completion service
pub struct OpenAiService {
    model: String,
    api_key: Option<String>,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl OpenAiService {
    /// Create a client from configuration.
    ///
    /// A missing API key is not an error here; calls fail with
    /// [`ServiceError::MissingApiKey`] so plan generation can still fall back.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ServiceError> {
        debug!(model = %config.model, timeout_secs = config.timeout_secs, "from_config: called");
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_role },
                { "role": "user", "content": request.user_prompt },
            ],
            "max_tokens": request.max_output_tokens,
            "temperature": request.temperature,
        })
    }

    fn parse_response(api_response: ChatResponse) -> Result<String, ServiceError> {
        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ServiceError::MalformedResponse("response contained no message content".to_string())
            })
    }
}

#[async_trait]
impl TextCompletionService for OpenAiService {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;
        debug!(model = %self.model, max_tokens = request.max_output_tokens, "complete: called");

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(self.timeout)
                } else {
                    ServiceError::Network(e)
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            warn!(retry_after, "complete: rate limited");
            return Err(ServiceError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if status == 401 || status == 403 {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Unauthorized { status, message });
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status, "complete: API error");
            return Err(ServiceError::Api { status, message });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        let text = Self::parse_response(api_response)?;
        debug!(len = text.len(), "complete: success");
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
