//! HTTP-based LLM provider for OpenAI-compatible APIs.
//!
//! Talks directly to the resolved provider's `/chat/completions` endpoint.
//! Both xAI and Groq accept the same request body and bearer auth.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use gemora_core::types::{ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message};

use crate::error::ProviderError;
use crate::resolver::ResolvedProvider;
use crate::traits::{LlmProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// An LLM provider that talks to an OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// Endpoint, key, and candidate models for this request.
    resolved: ResolvedProvider,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.resolved.api_base)
            .field("candidate_models", &self.resolved.candidate_models)
            .field("provider", &self.resolved.spec.display_name)
            .finish()
    }
}

/// Build the shared HTTP client with a per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

impl HttpProvider {
    /// Create a provider for one resolved configuration.
    ///
    /// `client` is cloned cheaply from the process-wide instance.
    pub fn new(client: reqwest::Client, resolved: ResolvedProvider) -> Self {
        HttpProvider { client, resolved }
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        let provider = self.resolved.display_name();

        debug!(
            provider,
            model,
            messages = messages.len(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            temperature: config.temperature,
            messages: messages.to_vec(),
        };

        let response = self
            .client
            .post(self.resolved.completions_url())
            .bearer_auth(&self.resolved.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider, error = %e, "HTTP request failed");
                ProviderError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            debug!(provider, status = %status, body = %body, "API error");
            return Err(ProviderError::Api {
                provider: self.resolved.spec.display_name,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(provider, error = %e, "Failed to parse LLM response");
            ProviderError::Decode(e)
        })?;

        let llm_resp: LlmResponse = parsed.into();
        debug!(
            provider,
            has_content = llm_resp.content.is_some(),
            finish_reason = llm_resp.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );
        Ok(llm_resp)
    }

    fn candidate_models(&self) -> &[String] {
        &self.resolved.candidate_models
    }

    fn display_name(&self) -> &str {
        self.resolved.spec.display_name
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
