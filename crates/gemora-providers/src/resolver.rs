//! Provider resolver: turns the loaded provider config into the concrete
//! endpoint, key, and candidate models for one request.
//!
//! Selection rules:
//! 1. A recognised preference whose provider has a key wins.
//! 2. Otherwise Groq if it has a key, then Grok.
//! 3. Otherwise `MissingCredentials`.

use gemora_core::config::{ProviderConfig, ProvidersConfig};
use tracing::debug;

use crate::error::ResolveError;
use crate::registry::{candidate_models, spec_for, ProviderKind, ProviderSpec};

/// Everything needed to call one provider. Built per request, never mutated.
#[derive(Clone, Debug)]
pub struct ResolvedProvider {
    pub spec: &'static ProviderSpec,
    pub api_key: String,
    /// API base without the `/chat/completions` suffix.
    pub api_base: String,
    /// Models to try, in order. Never empty.
    pub candidate_models: Vec<String>,
}

impl ResolvedProvider {
    /// Build the full chat completions URL.
    pub fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    pub fn display_name(&self) -> &'static str {
        self.spec.display_name
    }
}

/// Pick which provider to use, without building the full resolution.
pub fn select_provider(config: &ProvidersConfig) -> Option<ProviderKind> {
    let configured = |kind: ProviderKind| provider_config(config, kind).is_configured();

    let preferred = config
        .preferred
        .as_deref()
        .and_then(ProviderKind::from_preference);

    if let Some(kind) = preferred {
        if configured(kind) {
            return Some(kind);
        }
        debug!(preferred = ?kind, "preferred provider has no API key, falling back");
    }

    [ProviderKind::Groq, ProviderKind::Grok]
        .into_iter()
        .find(|kind| configured(*kind))
}

/// Resolve the provider, endpoint, and candidate models for a request.
pub fn resolve_provider(config: &ProvidersConfig) -> Result<ResolvedProvider, ResolveError> {
    let kind = select_provider(config).ok_or(ResolveError::MissingCredentials)?;
    let spec = spec_for(kind);
    let provider = provider_config(config, kind);

    let api_base = provider
        .api_base
        .as_deref()
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .unwrap_or(spec.default_api_base)
        .to_string();

    let model = provider
        .model
        .as_deref()
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .unwrap_or(spec.default_model);

    let resolved = ResolvedProvider {
        spec,
        api_key: provider.api_key.trim().to_string(),
        api_base,
        candidate_models: candidate_models(model, spec),
    };

    debug!(
        provider = spec.display_name,
        api_base = %resolved.api_base,
        candidates = ?resolved.candidate_models,
        "Resolved LLM provider"
    );

    Ok(resolved)
}

fn provider_config(config: &ProvidersConfig, kind: ProviderKind) -> &ProviderConfig {
    match kind {
        ProviderKind::Grok => &config.grok,
        ProviderKind::Groq => &config.groq,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
