//! `gemora status`: show configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use gemora_core::config::{get_config_path, provider_env, Config};
use gemora_core::utils::expand_home;
use gemora_providers::{resolve_provider, ProviderSpec, PROVIDERS};

/// Run the status command.
pub fn run(config: &Config, config_override: Option<&Path>) -> Result<()> {
    let config_path = config_override
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Gemora Kop Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_mark(config_path.exists())
    );

    let public_dir = expand_home(&config.server.public_dir);
    println!(
        "  {:<18} {} {}",
        "Public dir:".bold(),
        public_dir.display(),
        found_mark(public_dir.is_dir())
    );

    println!(
        "  {:<18} {}:{}",
        "Listen:".bold(),
        config.server.host,
        config.server.port
    );

    println!(
        "  {:<18} {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.chat.temperature).dimmed(),
        format!("timeout: {}s", config.chat.request_timeout_secs).dimmed(),
    );

    println!(
        "  {:<18} {}",
        "Topic policy:".bold(),
        config.chat.topic_policy.as_str()
    );

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        println!(
            "    {:<10} {:<32} {}",
            spec.display_name,
            env_vars_label(spec.name).dimmed(),
            credential_status(spec, config)
        );
    }
    if let Some(preferred) = &config.providers.preferred {
        println!("    {:<10} {}", "Preferred:", preferred);
    }

    println!();
    match resolve_provider(&config.providers) {
        Ok(resolved) => {
            println!(
                "  {:<18} {} ({})",
                "Active provider:".bold(),
                resolved.display_name().green(),
                resolved.api_base
            );
            println!(
                "  {:<18} {}",
                "Models:".bold(),
                resolved.candidate_models.join(" → ")
            );
        }
        Err(e) => {
            println!("  {:<18} {}", "Active provider:".bold(), e.to_string().red());
        }
    }

    println!();

    Ok(())
}

fn found_mark(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

fn env_vars_label(name: &str) -> String {
    provider_env(name)
        .map(|env| env.key_vars.join(" / "))
        .unwrap_or_default()
}

fn credential_status(spec: &ProviderSpec, config: &Config) -> String {
    let configured = config
        .providers
        .get_by_name(spec.name)
        .is_some_and(|p| p.is_configured());

    if configured {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}
