//! Reply generator: validation, classification, provider resolution, the
//! model-retry loop, and reply normalization.
//!
//! `generate` never fails: every outcome, good or bad, is a `ChatReply`
//! carrying the HTTP status and JSON body the endpoint returns verbatim.
//!
//! | outcome                                   | status |
//! |-------------------------------------------|--------|
//! | reply                                     | 200    |
//! | empty message / off-topic (gate policy)   | 400    |
//! | no provider credentials                   | 500    |
//! | upstream error, or all candidates refused | 502    |
//! | transport or decode failure               | 500    |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use gemora_core::config::{Config, TopicPolicy};
use gemora_core::types::Message;
use gemora_core::utils::truncate_string;
use gemora_providers::http_provider::build_client;
use gemora_providers::{
    resolve_provider, HttpProvider, LlmProvider, LlmRequestConfig, ProviderError,
};

use crate::classifier::is_gemora_question;
use crate::context::ContextBuilder;

pub const MESSAGE_REQUIRED: &str = "Message is required.";
pub const OFF_TOPIC: &str = "Gemora Kop only answers Gemora-related questions.";
pub const FALLBACK_REPLY: &str = "I can only answer Gemora-related questions.";
pub const UNEXPECTED_ERROR: &str = "Unexpected server error.";

// ─────────────────────────────────────────────
// ChatReply envelope
// ─────────────────────────────────────────────

/// JSON body of a reply: either `reply`, or `error` with optional `details`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ReplyBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Status code plus body, mirrored verbatim by the HTTP endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl ChatReply {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: ReplyBody {
                reply: Some(reply.into()),
                ..Default::default()
            },
        }
    }

    pub fn error(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ReplyBody {
                error: Some(error.into()),
                ..Default::default()
            },
        }
    }

    pub fn error_with_details(
        status: u16,
        error: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: ReplyBody {
                error: Some(error.into()),
                details: Some(details.into()),
                ..Default::default()
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// 502 for a provider that answered with an error.
    fn upstream_failure(provider: &str, err: &ProviderError) -> Self {
        Self::error_with_details(502, format!("{provider} request failed."), err.details())
    }

    /// 500 for anything that is not the provider's answer.
    fn unexpected(details: impl Into<String>) -> Self {
        Self::error_with_details(500, UNEXPECTED_ERROR, details)
    }
}

// ─────────────────────────────────────────────
// ReplyGenerator
// ─────────────────────────────────────────────

/// Turns one raw user message into one `ChatReply`.
///
/// Holds only immutable state (config, HTTP client, prompt), so a single
/// instance is shared across all requests.
pub struct ReplyGenerator {
    config: Arc<Config>,
    client: reqwest::Client,
    context: ContextBuilder,
}

impl ReplyGenerator {
    /// Create a generator, building the shared HTTP client with the
    /// configured request timeout.
    pub fn new(config: Arc<Config>) -> Result<Self, ProviderError> {
        let client = build_client(config.chat.request_timeout())?;
        Ok(Self {
            config,
            client,
            context: ContextBuilder::default(),
        })
    }

    /// Produce the reply for one raw user message.
    pub async fn generate(&self, raw_message: &str) -> ChatReply {
        let message = raw_message.trim();
        if message.is_empty() {
            return ChatReply::error(400, MESSAGE_REQUIRED);
        }

        let relevant = is_gemora_question(message);
        let relevance = match self.config.chat.topic_policy {
            TopicPolicy::Gate if !relevant => {
                debug!("Rejecting off-topic message");
                return ChatReply::error(400, OFF_TOPIC);
            }
            TopicPolicy::Gate => None,
            TopicPolicy::Hint => Some(relevant),
        };

        let resolved = match resolve_provider(&self.config.providers) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(error = %e, "No LLM provider configured");
                return ChatReply::error(500, e.to_string());
            }
        };

        let provider = HttpProvider::new(self.client.clone(), resolved);
        let messages = self.context.build_messages(message, relevance);
        debug!(relevant, message = %truncate_string(message, 80), "Generating reply");

        self.complete(&provider, &messages).await
    }

    /// Try each candidate model in order and normalize the outcome.
    ///
    /// Only "model unavailable" upstream errors move on to the next
    /// candidate; anything else ends the request.
    pub async fn complete(&self, provider: &dyn LlmProvider, messages: &[Message]) -> ChatReply {
        let request_config = LlmRequestConfig {
            temperature: self.config.chat.temperature,
        };
        let mut last_failure: Option<ProviderError> = None;

        for (attempt, model) in provider.candidate_models().iter().enumerate() {
            match provider.chat(messages, model, &request_config).await {
                Ok(response) => {
                    let reply = response.reply_text().unwrap_or(FALLBACK_REPLY);
                    info!(
                        provider = provider.display_name(),
                        model = %model,
                        attempt = attempt + 1,
                        "Reply generated"
                    );
                    return ChatReply::ok(reply);
                }
                Err(err) if err.is_model_unavailable() => {
                    warn!(
                        provider = provider.display_name(),
                        model = %model,
                        error = %truncate_string(&err.details(), 200),
                        "Model unavailable, trying next candidate"
                    );
                    last_failure = Some(err);
                }
                Err(err @ ProviderError::Api { .. }) => {
                    error!(
                        provider = provider.display_name(),
                        model = %model,
                        error = %truncate_string(&err.details(), 200),
                        "Provider request failed"
                    );
                    return ChatReply::upstream_failure(provider.display_name(), &err);
                }
                Err(err) => {
                    error!(provider = provider.display_name(), error = %err, "Unexpected error");
                    return ChatReply::unexpected(err.to_string());
                }
            }
        }

        match last_failure {
            Some(err) => {
                error!(provider = provider.display_name(), "All candidate models refused");
                ChatReply::upstream_failure(provider.display_name(), &err)
            }
            None => ChatReply::unexpected("No candidate models configured."),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gemora_core::config::ProviderConfig;
    use gemora_core::types::LlmResponse;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ── Scripted provider for the retry loop ──

    enum Outcome {
        Reply(&'static str),
        Api(u16, &'static str),
        Malformed,
    }

    struct ScriptedProvider {
        models: Vec<String>,
        script: Mutex<Vec<Outcome>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(models: &[&str], script: Vec<Outcome>) -> Self {
            Self {
                models: models.iter().map(|m| m.to_string()).collect(),
                script: Mutex::new(script.into_iter().rev().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(
            &self,
            _messages: &[Message],
            model: &str,
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ProviderError> {
            self.calls.lock().unwrap().push(model.to_string());
            match self.script.lock().unwrap().pop().expect("script exhausted") {
                Outcome::Reply(text) => Ok(LlmResponse {
                    content: Some(text.to_string()),
                    ..Default::default()
                }),
                Outcome::Api(status, body) => Err(ProviderError::Api {
                    provider: "Groq",
                    status,
                    body: body.to_string(),
                }),
                Outcome::Malformed => Err(ProviderError::Decode(
                    serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
                )),
            }
        }

        fn candidate_models(&self) -> &[String] {
            &self.models
        }

        fn display_name(&self) -> &str {
            "Groq"
        }
    }

    fn generator(config: Config) -> ReplyGenerator {
        ReplyGenerator::new(Arc::new(config)).unwrap()
    }

    const DECOMMISSIONED: &str =
        r#"{"error":{"message":"The model has been decommissioned","code":"model_decommissioned"}}"#;

    #[tokio::test]
    async fn test_retry_moves_to_next_model() {
        let provider = ScriptedProvider::new(
            &["old-model", "llama-3.3-70b-versatile"],
            vec![Outcome::Api(400, DECOMMISSIONED), Outcome::Reply("Second try.")],
        );
        let reply = generator(Config::default())
            .complete(&provider, &[Message::user("daf yomi")])
            .await;

        assert_eq!(reply, ChatReply::ok("Second try."));
        assert_eq!(provider.calls(), vec!["old-model", "llama-3.3-70b-versatile"]);
    }

    #[tokio::test]
    async fn test_non_model_error_stops_immediately() {
        let provider = ScriptedProvider::new(
            &["a", "b", "c"],
            vec![Outcome::Api(500, "upstream exploded")],
        );
        let reply = generator(Config::default())
            .complete(&provider, &[Message::user("daf yomi")])
            .await;

        assert_eq!(reply.status, 502);
        assert_eq!(reply.body.error.as_deref(), Some("Groq request failed."));
        assert_eq!(reply.body.details.as_deref(), Some("upstream exploded"));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_candidates_report_last_failure() {
        let provider = ScriptedProvider::new(
            &["a", "b"],
            vec![
                Outcome::Api(400, "model a does not exist"),
                Outcome::Api(404, "model_not_found: b"),
            ],
        );
        let reply = generator(Config::default())
            .complete(&provider, &[Message::user("daf yomi")])
            .await;

        assert_eq!(reply.status, 502);
        assert_eq!(reply.body.details.as_deref(), Some("model_not_found: b"));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_decode_failure_is_unexpected() {
        let provider = ScriptedProvider::new(&["a", "b"], vec![Outcome::Malformed]);
        let reply = generator(Config::default())
            .complete(&provider, &[Message::user("daf yomi")])
            .await;

        assert_eq!(reply.status, 500);
        assert_eq!(reply.body.error.as_deref(), Some(UNEXPECTED_ERROR));
        assert!(reply.body.details.is_some());
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_uses_fallback() {
        let provider = ScriptedProvider::new(&["a"], vec![Outcome::Reply("   ")]);
        let reply = generator(Config::default())
            .complete(&provider, &[Message::user("daf yomi")])
            .await;

        assert_eq!(reply, ChatReply::ok(FALLBACK_REPLY));
    }

    // ── generate(): validation and configuration paths ──

    #[tokio::test]
    async fn test_empty_and_whitespace_messages() {
        let gen = generator(Config::default());
        for raw in ["", "   ", "\n\t"] {
            let reply = gen.generate(raw).await;
            assert_eq!(reply, ChatReply::error(400, MESSAGE_REQUIRED));
        }
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let reply = generator(Config::default()).generate("What is a sugya?").await;
        assert_eq!(reply.status, 500);
        let error = reply.body.error.unwrap();
        assert!(error.contains("GROQ_API_KEY"));
        assert!(error.contains("GROK_API_KEY"));
    }

    #[tokio::test]
    async fn test_zero_timeout_still_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "Answer." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = groq_config(&server, None);
        config.chat.request_timeout_secs = 0;
        let reply = generator(config).generate("Which daf is this?").await;

        assert_eq!(reply, ChatReply::ok("Answer."));
    }

    #[tokio::test]
    async fn test_gate_policy_rejects_off_topic() {
        let mut config = Config::default();
        config.chat.topic_policy = TopicPolicy::Gate;
        let reply = generator(config).generate("What's the weather?").await;
        assert_eq!(reply, ChatReply::error(400, OFF_TOPIC));
    }

    #[tokio::test]
    async fn test_gate_policy_passes_on_topic_to_resolver() {
        let mut config = Config::default();
        config.chat.topic_policy = TopicPolicy::Gate;
        // No credentials: reaching the resolver yields 500, not the 400 gate.
        let reply = generator(config).generate("Explain Rashi on Berakhot 2a").await;
        assert_eq!(reply.status, 500);
    }

    // ── generate(): end to end against a mock provider ──

    fn groq_config(server: &MockServer, model: Option<&str>) -> Config {
        let mut config = Config::default();
        config.providers.groq = ProviderConfig {
            api_key: "gsk-test".to_string(),
            api_base: Some(server.uri()),
            model: model.map(String::from),
        };
        config
    }

    #[tokio::test]
    async fn test_reply_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer gsk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "  Answer.  " } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(groq_config(&server, None))
            .generate("Who wrote Tosafot?")
            .await;

        assert_eq!(reply, ChatReply::ok("Answer."));
        assert_eq!(
            serde_json::to_value(&reply.body).unwrap(),
            serde_json::json!({ "reply": "Answer." })
        );
    }

    #[tokio::test]
    async fn test_deprecated_model_is_remapped_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama-3.3-70b-versatile",
                "temperature": 0.2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(groq_config(&server, Some("llama3-70b-8192")))
            .generate("What is the Mishnah?")
            .await;

        assert_eq!(reply, ChatReply::ok("ok"));
    }

    #[tokio::test]
    async fn test_decommissioned_then_success_makes_two_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "model": "qwen-qwq-32b" })))
            .respond_with(ResponseTemplate::new(400).set_body_string(DECOMMISSIONED))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "model": "llama-3.3-70b-versatile" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "Fallback answer." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(groq_config(&server, Some("qwen-qwq-32b")))
            .generate("Gemara question")
            .await;

        assert_eq!(reply, ChatReply::ok("Fallback answer."));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_upstream_500_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(groq_config(&server, None))
            .generate("Talmud question")
            .await;

        assert_eq!(
            reply,
            ChatReply::error_with_details(502, "Groq request failed.", "internal error")
        );
    }

    #[tokio::test]
    async fn test_null_envelope_fields_fall_back_to_refusal() {
        for body in [
            serde_json::json!({ "choices": null }),
            serde_json::json!({ "choices": [{ "message": null }] }),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .expect(1)
                .mount(&server)
                .await;

            let reply = generator(groq_config(&server, None))
                .generate("Which daf is this?")
                .await;

            assert_eq!(reply, ChatReply::ok(FALLBACK_REPLY));
        }
    }

    #[tokio::test]
    async fn test_partial_usage_does_not_discard_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "Answer." } }],
                "usage": { "total_tokens": 5 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(groq_config(&server, None))
            .generate("Which daf is this?")
            .await;

        assert_eq!(reply, ChatReply::ok("Answer."));
    }

    #[tokio::test]
    async fn test_off_topic_hint_is_sent_to_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    { "role": "system" },
                    { "role": "system" },
                    { "role": "user", "content": "Tell me about football" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "Please ask a Gemora question." } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(groq_config(&server, None))
            .generate("  Tell me about football  ")
            .await;

        assert_eq!(reply, ChatReply::ok("Please ask a Gemora question."));
    }

    #[tokio::test]
    async fn test_network_failure_is_unexpected() {
        let mut config = Config::default();
        config.providers.grok = ProviderConfig {
            api_key: "xai-test".to_string(),
            api_base: Some("http://127.0.0.1:1".to_string()),
            model: None,
        };

        let reply = generator(config).generate("Rashi").await;
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body.error.as_deref(), Some(UNEXPECTED_ERROR));
    }
}
