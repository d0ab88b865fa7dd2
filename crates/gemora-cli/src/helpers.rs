//! Shared CLI output helpers.

use colored::Colorize;

use gemora_agent::ChatReply;

/// Print a bot reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "Gemora Kop".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print a failed exchange to stderr.
pub fn print_error(reply: &ChatReply) {
    eprintln!();
    eprintln!("{} {}", "Error:".red().bold(), error_line(reply));
    if let Some(details) = &reply.body.details {
        eprintln!("{}", details.dimmed());
    }
    eprintln!();
}

fn error_line(reply: &ChatReply) -> String {
    let message = reply.body.error.as_deref().unwrap_or("Request failed.");
    format!("{message} ({})", reply.status)
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Gemora Kop".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Ask a Gemora question, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "Thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}
