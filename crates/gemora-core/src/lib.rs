//! Gemora Kop core: wire types, configuration, and path helpers shared by
//! the provider, agent, and CLI crates.

pub mod config;
pub mod types;
pub mod utils;

pub use config::Config;
