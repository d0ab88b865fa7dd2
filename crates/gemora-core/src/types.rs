//! Core types for Gemora Kop: the OpenAI chat completions wire format.
//!
//! Both supported providers speak the same `/chat/completions` dialect, so a
//! single set of request/response types covers them.

use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
///
/// Each variant maps to a `role` field value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// The text content, regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Message::System { content } | Message::User { content } => content,
        }
    }
}

// ─────────────────────────────────────────────
// Chat completion request
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<Message>,
}

// ─────────────────────────────────────────────
// Chat completion response
// ─────────────────────────────────────────────

/// Raw chat completion response from an OpenAI-compatible API.
///
/// Every field is optional on the wire, and `null` reads the same as a
/// missing field: a body without usable `choices` is an empty response, not
/// a decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Option<ChatChoice>>,
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Default, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics from the LLM. Counters a provider omits read as 0.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// A successful completion, reduced to what the reply path needs.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Text content of the first choice, untouched.
    pub content: Option<String>,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// The trimmed reply text, or `None` when the model said nothing.
    pub fn reply_text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

impl From<ChatCompletionResponse> for LlmResponse {
    fn from(resp: ChatCompletionResponse) -> Self {
        match resp.choices.into_iter().next().flatten() {
            Some(choice) => LlmResponse {
                content: choice.message.content,
                finish_reason: choice.finish_reason,
                usage: resp.usage,
            },
            None => LlmResponse {
                usage: resp.usage,
                ..Default::default()
            },
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
