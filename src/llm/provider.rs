//! Scoring provider trait definition.

use crate::analysis::{Prompt, RawAnalysis};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when asking a provider for an analysis.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider is not configured: {0}")]
    NotConfigured(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No JSON object found in provider reply")]
    NoJsonObject,

    #[error("Reply is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,
}

impl LlmError {
    /// Short stable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::NotConfigured(_) => "not_configured",
            LlmError::Connection(_) => "connection",
            LlmError::Api { .. } => "api",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::NoJsonObject => "no_json_object",
            LlmError::MissingFields(_) => "missing_fields",
            LlmError::RateLimited => "rate_limited",
            LlmError::Timeout => "timeout",
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            // Request URLs may carry credentials
            LlmError::Connection(e.without_url().to_string())
        }
    }
}

/// A service able to turn a prompt into a (not yet normalized) analysis.
#[async_trait]
pub trait ScoringProvider: Send + Sync {
    /// Get the provider's name (e.g., "openai", "gemini").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Perform a single request to the provider. Implementations must not retry.
    async fn attempt_analysis(&self, prompt: &Prompt) -> Result<RawAnalysis, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_are_distinct() {
        let errors = [
            LlmError::NotConfigured("x".into()),
            LlmError::Connection("x".into()),
            LlmError::Api {
                status: 401,
                message: "x".into(),
            },
            LlmError::InvalidResponse("x".into()),
            LlmError::NoJsonObject,
            LlmError::MissingFields(vec!["auraScore".into()]),
            LlmError::RateLimited,
            LlmError::Timeout,
        ];
        let mut kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn missing_fields_message_lists_fields() {
        let err = LlmError::MissingFields(vec!["rizzScore".into(), "mysticTitle".into()]);
        assert_eq!(
            err.to_string(),
            "Reply is missing required fields: rizzScore, mysticTitle"
        );
    }
}
