//! Config loader: reads `~/.gemora/config.json`, then layers the
//! environment on top.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.gemora/config.json` (or an explicit path)
//! 3. `.env` in the working directory (never overrides the real environment)
//! 4. Environment variables (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{ChatConfig, Config, ProviderConfig, TopicPolicy, MIN_REQUEST_TIMEOUT_SECS};

/// Plain environment variables for one provider, in precedence order.
#[derive(Debug)]
pub struct ProviderEnv {
    /// Config key under `providers` (e.g. `"groq"`).
    pub name: &'static str,
    pub key_vars: &'static [&'static str],
    pub model_vars: &'static [&'static str],
}

/// The only list of plain provider variables; first non-empty one wins.
pub static PROVIDER_ENV: &[ProviderEnv] = &[
    ProviderEnv {
        name: "grok",
        key_vars: &["GROK_API_KEY", "XAI_API_KEY"],
        model_vars: &["GROK_MODEL", "XAI_MODEL"],
    },
    ProviderEnv {
        name: "groq",
        key_vars: &["GROQ_API_KEY", "GROQ_KEY"],
        model_vars: &["GROQ_MODEL"],
    },
];

/// Env variable names for a provider config key.
pub fn provider_env(name: &str) -> Option<&'static ProviderEnv> {
    PROVIDER_ENV.iter().find(|env| env.name == name)
}

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given (or default) path + `.env` + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    match dotenvy::dotenv() {
        Ok(env_path) => debug!("Loaded environment from {}", env_path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config_from_path(&config_path);
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    sanitize(config)
}

/// Replace values that would make every request fail.
fn sanitize(mut config: Config) -> Config {
    if config.chat.request_timeout_secs < MIN_REQUEST_TIMEOUT_SECS {
        let fallback = ChatConfig::default().request_timeout_secs;
        warn!(
            "requestTimeoutSecs={} would time out every request, using {}",
            config.chat.request_timeout_secs, fallback
        );
        config.chat.request_timeout_secs = fallback;
    }
    config
}

/// Load config from a specific file path, without any env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` resolves a variable name; empty values count as unset.
///
/// Supported overrides:
/// - `GROK_API_KEY` / `XAI_API_KEY`, `GROK_MODEL` / `XAI_MODEL`
/// - `GROQ_API_KEY` / `GROQ_KEY`, `GROQ_MODEL`
/// - `LLM_PROVIDER` → `providers.preferred`
/// - `PORT` → `server.port`
/// - `GEMORA_PROVIDERS__<NAME>__{API_KEY,API_BASE,MODEL}`
/// - `GEMORA_SERVER__{HOST,PORT,PUBLIC_DIR}`
/// - `GEMORA_CHAT__{TEMPERATURE,REQUEST_TIMEOUT_SECS,TOPIC_POLICY}`
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k));

    // Providers
    for env in PROVIDER_ENV {
        if let Some(provider) = config.providers.get_by_name_mut(env.name) {
            if let Some(key) = first(env.key_vars) {
                provider.api_key = key;
            }
            if let Some(model) = first(env.model_vars) {
                provider.model = Some(model);
            }
            apply_provider_env(provider, &env.name.to_uppercase(), &get);
        }
    }
    if let Some(val) = get("LLM_PROVIDER") {
        config.providers.preferred = Some(val);
    }

    // Server
    if let Some(val) = get("PORT") {
        set_parsed(&mut config.server.port, "PORT", &val);
    }
    if let Some(val) = get("GEMORA_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(val) = get("GEMORA_SERVER__PORT") {
        set_parsed(&mut config.server.port, "GEMORA_SERVER__PORT", &val);
    }
    if let Some(val) = get("GEMORA_SERVER__PUBLIC_DIR") {
        config.server.public_dir = val;
    }

    // Chat
    if let Some(val) = get("GEMORA_CHAT__TEMPERATURE") {
        set_parsed(&mut config.chat.temperature, "GEMORA_CHAT__TEMPERATURE", &val);
    }
    if let Some(val) = get("GEMORA_CHAT__REQUEST_TIMEOUT_SECS") {
        set_parsed(
            &mut config.chat.request_timeout_secs,
            "GEMORA_CHAT__REQUEST_TIMEOUT_SECS",
            &val,
        );
    }
    if let Some(val) = get("GEMORA_CHAT__TOPIC_POLICY") {
        match TopicPolicy::from_name(&val) {
            Some(policy) => config.chat.topic_policy = policy,
            None => warn!("Ignoring GEMORA_CHAT__TOPIC_POLICY={}: expected hint or gate", val),
        }
    }

    config
}

/// Apply the namespaced overrides for a single provider.
fn apply_provider_env<G>(provider: &mut ProviderConfig, name: &str, get: &G)
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(val) = get(&format!("GEMORA_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Some(val) = get(&format!("GEMORA_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if let Some(val) = get(&format!("GEMORA_PROVIDERS__{name}__MODEL")) {
        provider.model = Some(val);
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, key: &str, val: &str) {
    match val.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!("Ignoring {}={}: not a valid value", key, val),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
