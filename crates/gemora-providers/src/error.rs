//! Provider error types.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Upstream error bodies that mean "this model id is gone or unknown".
static MODEL_UNAVAILABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)model_decommissioned|model_not_found|unknown model|model[^"]*?(decommissioned|does not exist|no longer supported)"#,
    )
    .expect("model-unavailable pattern is valid")
});

/// Failure to pick a provider from the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Neither provider has a usable API key.
    #[error("Missing GROQ_API_KEY or GROK_API_KEY. Add one to your environment.")]
    MissingCredentials,
}

/// Failure of a single outbound completion call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered 2xx but the body was not a completion envelope.
    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ProviderError {
    /// Whether the provider rejected the requested model id itself, so the
    /// next candidate model is worth trying.
    pub fn is_model_unavailable(&self) -> bool {
        match self {
            ProviderError::Api { body, .. } => MODEL_UNAVAILABLE.is_match(body),
            _ => false,
        }
    }

    /// Raw upstream body for API errors, the error message otherwise.
    pub fn details(&self) -> String {
        match self {
            ProviderError::Api { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}
