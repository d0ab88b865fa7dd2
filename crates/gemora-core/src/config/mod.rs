//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use gemora_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Port: {}", cfg.server.port);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{
    apply_env_overrides, get_config_path, load_config, provider_env, ProviderEnv, PROVIDER_ENV,
};
pub use schema::{
    ChatConfig, Config, ProviderConfig, ProvidersConfig, ServerConfig, TopicPolicy,
    MIN_REQUEST_TIMEOUT_SECS,
};
