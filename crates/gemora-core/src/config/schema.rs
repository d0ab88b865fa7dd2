//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `ServerConfig`, `ChatConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest outbound timeout actually applied.
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: built once at startup from defaults, an optional
/// JSON file, and the environment. Treated as immutable afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub server: ServerConfig,
    pub chat: ChatConfig,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Credentials and overrides for a single LLM provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for bearer authentication. Empty means "not configured".
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides the provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Model identifier (overrides the provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a usable API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Both provider configurations plus the optional preference.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    /// xAI Grok (primary).
    #[serde(default)]
    pub grok: ProviderConfig,
    /// Groq (secondary).
    #[serde(default)]
    pub groq: ProviderConfig,
    /// Raw preference value (`"groq"`, `"grok"`, `"xai"`); anything else is ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<String>,
}

impl ProvidersConfig {
    /// Get a provider config by registry name (e.g. `"groq"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "grok" => Some(&self.grok),
            "groq" => Some(&self.groq),
            _ => None,
        }
    }

    /// Mutable variant of [`get_by_name`](Self::get_by_name).
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "grok" => Some(&mut self.grok),
            "groq" => Some(&mut self.groq),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the browser chat client.
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: "public".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// How the topic classifier's verdict is used.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TopicPolicy {
    /// Fold the verdict into the system instructions; the model refuses.
    #[default]
    Hint,
    /// Reject off-topic messages with 400 before calling any provider.
    Gate,
}

impl TopicPolicy {
    /// Parse a policy name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "hint" | "soft" => Some(TopicPolicy::Hint),
            "gate" | "hard" => Some(TopicPolicy::Gate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicPolicy::Hint => "hint",
            TopicPolicy::Gate => "gate",
        }
    }
}

/// Settings for each outbound chat request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Sampling temperature sent with every request.
    pub temperature: f64,
    /// Timeout for a single outbound call, in seconds.
    pub request_timeout_secs: u64,
    pub topic_policy: TopicPolicy,
}

impl ChatConfig {
    /// Outbound timeout; a zero setting is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(MIN_REQUEST_TIMEOUT_SECS))
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            request_timeout_secs: 30,
            topic_policy: TopicPolicy::Hint,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
