//! LLM provider layer for Gemora Kop.
//!
//! # Architecture
//!
//! - [`registry`]: static specs for the two supported providers (xAI Grok, Groq),
//!   the deprecated-model remap table, and candidate model lists
//! - [`resolver`]: picks a provider from the loaded config
//! - [`traits::LlmProvider`]: the seam the reply generator calls through
//! - [`http_provider::HttpProvider`]: OpenAI-compatible `/chat/completions` client

pub mod error;
pub mod http_provider;
pub mod registry;
pub mod resolver;
pub mod traits;

// Re-export main types for convenience
pub use error::{ProviderError, ResolveError};
pub use http_provider::HttpProvider;
pub use registry::{ProviderKind, ProviderSpec, PROVIDERS};
pub use resolver::{resolve_provider, ResolvedProvider};
pub use traits::{LlmProvider, LlmRequestConfig};
