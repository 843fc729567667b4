//! Scripted completion service for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionRequest, ServiceError, TextCompletionService};

/// Replays scripted results in order and records every request
pub struct MockCompletionService {
    responses: Mutex<VecDeque<Result<String, ServiceError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionService {
    pub fn new(responses: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(error: ServiceError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextCompletionService for MockCompletionService {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ServiceError::MalformedResponse(
                    "no more mock responses".to_string(),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            system_role: "test".to_string(),
            user_prompt: prompt.to_string(),
            max_output_tokens: 10,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockCompletionService::new(vec![Ok("one".to_string()), Ok("two".to_string())]);

        assert_eq!(mock.complete(request("a")).await.unwrap(), "one");
        assert_eq!(mock.complete(request("b")).await.unwrap(), "two");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.requests()[1].user_prompt, "b");
    }

    #[tokio::test]
    async fn test_mock_errors_when_exhausted() {
        let mock = MockCompletionService::new(vec![]);
        assert!(mock.complete(request("a")).await.is_err());
    }
}
