//! Text-completion service - the external coach behind plans and answers

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

mod error;
#[cfg(test)]
pub mod mock;
mod openai;

pub use error::ServiceError;
pub use openai::OpenAiService;

use crate::config::LlmConfig;

/// One completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System role describing who the model should be
    pub system_role: String,
    pub user_prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Stateless text completion - each call is independent
#[async_trait]
pub trait TextCompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError>;
}

/// Build the configured service
pub fn create_service(config: &LlmConfig) -> Result<Arc<dyn TextCompletionService>, ServiceError> {
    debug!(model = %config.model, base_url = %config.base_url, "create_service: called");
    Ok(Arc::new(OpenAiService::from_config(config)?))
}
