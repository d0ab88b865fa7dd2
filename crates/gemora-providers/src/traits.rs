//! LLM Provider trait: the seam between the reply generator and HTTP.
//!
//! `HttpProvider` in `http_provider.rs` is the only production implementation;
//! tests substitute scripted providers to drive the model-retry loop.

use async_trait::async_trait;
use gemora_core::types::{LlmResponse, Message};

use crate::error::ProviderError;

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self { temperature: 0.2 }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one chat completion request for a specific model.
    ///
    /// # Arguments
    /// * `messages`: System instructions followed by the user message.
    /// * `model`   : Model identifier (e.g. `"llama-3.3-70b-versatile"`).
    /// * `config`  : Temperature, etc.
    ///
    /// # Returns
    /// The parsed completion, or a `ProviderError` the caller classifies.
    async fn chat(
        &self,
        messages: &[Message],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// Models to try, in order.
    fn candidate_models(&self) -> &[String];

    /// Display name for logging and error messages.
    fn display_name(&self) -> &str;
}
