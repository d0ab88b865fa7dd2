//! Gemora Kop CLI: entry point.
//!
//! # Commands
//!
//! - `gemora serve`: HTTP server with the browser chat client
//! - `gemora ask -m MESSAGE`: one exchange, printed to stdout
//! - `gemora chat`: interactive REPL, one independent exchange per line
//! - `gemora status`: show configuration and provider status

mod helpers;
mod repl;
mod server;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use gemora_agent::ReplyGenerator;
use gemora_core::config::{load_config, Config};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Gemora Kop: a chat front end that only answers Gemora questions
#[derive(Parser)]
#[command(name = "gemora", version, about, long_about = None)]
struct Cli {
    /// Path to a JSON config file (default: ~/.gemora/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and browser chat client
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding index.html, style.css and script.js
        #[arg(long)]
        public_dir: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Emit logs as JSON lines
        #[arg(long, default_value_t = false)]
        json_logs: bool,
    },

    /// Ask a single question
    Ask {
        /// The question to send
        #[arg(short, long)]
        message: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Interactive chat in the terminal
    Chat {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Commands::Serve {
            host,
            port,
            public_dir,
            logs,
            json_logs,
        } => {
            init_logging(logs, json_logs, "info");
            let config = load_config(config_path.as_deref());
            let options = server::ServeOptions {
                host,
                port,
                public_dir,
            };
            server::run(config, options).await
        }
        Commands::Ask { message, logs } => {
            init_logging(logs, false, "warn");
            let config = load_config(config_path.as_deref());
            run_ask(config, &message).await
        }
        Commands::Chat { logs } => {
            init_logging(logs, false, "warn");
            let config = load_config(config_path.as_deref());
            repl::run(build_generator(config)?).await
        }
        Commands::Status => {
            let config = load_config(config_path.as_deref());
            status::run(&config, config_path.as_deref())
        }
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

async fn run_ask(config: Config, message: &str) -> Result<()> {
    let generator = build_generator(config)?;
    let reply = generator.generate(message).await;
    debug!(status = reply.status, "single-shot exchange finished");

    if reply.is_success() {
        helpers::print_response(reply.body.reply.as_deref().unwrap_or_default());
        Ok(())
    } else {
        helpers::print_error(&reply);
        anyhow::bail!("request failed with status {}", reply.status)
    }
}

/// Build the reply generator shared by `ask` and `chat`.
fn build_generator(config: Config) -> Result<ReplyGenerator> {
    ReplyGenerator::new(Arc::new(config)).context("failed to build HTTP client")
}

/// Initialize tracing/logging.
///
/// `RUST_LOG` wins when set; otherwise `--logs` turns on debug output for
/// the gemora crates and HTTP tracing.
fn init_logging(verbose: bool, json: bool, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("gemora=debug,tower_http=debug,info")
        } else {
            EnvFilter::new(default_level)
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
