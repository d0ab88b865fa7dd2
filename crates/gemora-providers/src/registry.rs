//! Provider registry: static entries for the two supported LLM providers.
//!
//! Each `ProviderSpec` describes how to reach one provider: API base,
//! default model, and the model-id quirks (deprecated ids and known-good
//! fallbacks) used to build the candidate list. Credential variable names
//! live with the config loader (`gemora_core::config::PROVIDER_ENV`).

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Which of the two providers an entry describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// xAI Grok: the primary provider.
    Grok,
    /// Groq: the secondary provider, preferred when both are configured.
    Groq,
}

impl ProviderKind {
    /// Parse a preference value. `"groq"` names Groq; `"grok"` and `"xai"`
    /// both name Grok. Anything else is not a preference.
    pub fn from_preference(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "groq" => Some(ProviderKind::Groq),
            "grok" | "xai" => Some(ProviderKind::Grok),
            _ => None,
        }
    }
}

/// Static description of one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Internal name, matching the config key (e.g. `"groq"`).
    pub name: &'static str,
    /// Human-readable name for logs and error messages.
    pub display_name: &'static str,
    /// API base URL; `/chat/completions` is appended.
    pub default_api_base: &'static str,
    pub default_model: &'static str,
    /// Deprecated model ids and their current replacements.
    pub model_remaps: &'static [(&'static str, &'static str)],
    /// Models tried, in order, after the configured one is rejected.
    pub fallback_models: &'static [&'static str],
}

// ─────────────────────────────────────────────
// Both providers
// ─────────────────────────────────────────────

/// Every supported provider.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::Grok,
        name: "grok",
        display_name: "Grok",
        default_api_base: "https://api.x.ai/v1",
        default_model: "grok-3-mini",
        model_remaps: &[],
        fallback_models: &[],
    },
    ProviderSpec {
        kind: ProviderKind::Groq,
        name: "groq",
        display_name: "Groq",
        default_api_base: "https://api.groq.com/openai/v1",
        default_model: "llama-3.3-70b-versatile",
        model_remaps: &[
            ("llama3-70b-8192", "llama-3.3-70b-versatile"),
            ("llama3-8b-8192", "llama-3.1-8b-instant"),
            ("llama-3.1-70b-versatile", "llama-3.3-70b-versatile"),
            ("mixtral-8x7b-32768", "llama-3.3-70b-versatile"),
            ("gemma-7b-it", "gemma2-9b-it"),
        ],
        fallback_models: &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"],
    },
];

// ─────────────────────────────────────────────
// Lookup and model helpers
// ─────────────────────────────────────────────

/// Find a provider entry by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// The entry for a provider kind.
pub fn spec_for(kind: ProviderKind) -> &'static ProviderSpec {
    match kind {
        ProviderKind::Grok => &PROVIDERS[0],
        ProviderKind::Groq => &PROVIDERS[1],
    }
}

/// Translate a deprecated model id to its replacement; other ids pass through.
pub fn remap_model(model: &str, spec: &ProviderSpec) -> String {
    spec.model_remaps
        .iter()
        .find(|(old, _)| *old == model)
        .map(|(_, new)| new.to_string())
        .unwrap_or_else(|| model.to_string())
}

/// Ordered, de-duplicated list of models to try: the (remapped) configured
/// model first, then the provider fallbacks.
pub fn candidate_models(model: &str, spec: &ProviderSpec) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(1 + spec.fallback_models.len());
    let first = remap_model(model.trim(), spec);
    for candidate in std::iter::once(first)
        .chain(spec.fallback_models.iter().map(|m| m.to_string()))
    {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
