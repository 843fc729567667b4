//! Text-completion service errors

use std::time::Duration;
use thiserror::Error;

/// Failures reported by a [`super::TextCompletionService`]
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API key not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("Authentication failed ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Rate limited or quota exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Authentication problems the user has to fix in configuration
    pub fn is_auth(&self) -> bool {
        matches!(self, ServiceError::MissingApiKey | ServiceError::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth() {
        assert!(ServiceError::MissingApiKey.is_auth());
        assert!(
            ServiceError::Unauthorized {
                status: 401,
                message: "bad key".to_string()
            }
            .is_auth()
        );
        assert!(!ServiceError::Timeout(Duration::from_secs(60)).is_auth());
        assert!(
            !ServiceError::Api {
                status: 500,
                message: "oops".to_string()
            }
            .is_auth()
        );
    }

    #[test]
    fn test_display_names_the_failure() {
        let err = ServiceError::RateLimited {
            retry_after: Duration::from_secs(20),
        };
        assert_eq!(err.to_string(), "Rate limited or quota exceeded, retry after 20s");

        let err = ServiceError::MalformedResponse("no choices".to_string());
        assert_eq!(err.to_string(), "Malformed response: no choices");
    }
}
