//! Interactive REPL.
//!
//! Each line is sent as its own exchange. Earlier questions are kept only
//! in the local line-editing history, never in what goes to the model.

use std::path::PathBuf;

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use gemora_agent::ReplyGenerator;

use crate::helpers;

const HISTORY_LIMIT: usize = 500;

/// Run the interactive REPL loop.
pub async fn run(generator: ReplyGenerator) -> Result<()> {
    helpers::print_banner();

    let history = LocalHistory::default_location();
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(HISTORY_LIMIT)?;
    history.restore(&mut editor);

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if wants_to_leave(question) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(question);

        debug!(chars = question.len(), "sending question");
        helpers::print_thinking();
        let reply = generator.generate(question).await;
        helpers::clear_thinking();

        match reply.body.reply.as_deref() {
            Some(text) if reply.is_success() => helpers::print_response(text),
            _ => helpers::print_error(&reply),
        }
    }

    history.save(&mut editor);
    Ok(())
}

/// `exit`, `quit`, `bye` or `:q`, with or without a leading slash.
fn wants_to_leave(input: &str) -> bool {
    let word = input.trim_start_matches('/').to_lowercase();
    matches!(word.as_str(), "exit" | "quit" | "bye" | ":q")
}

/// Line-editing history file under the data directory.
struct LocalHistory {
    path: PathBuf,
}

impl LocalHistory {
    fn default_location() -> Self {
        Self {
            path: gemora_core::utils::get_data_path()
                .join("history")
                .join("chat_history"),
        }
    }

    /// A missing or unreadable file just means an empty history.
    fn restore(&self, editor: &mut DefaultEditor) {
        if let Err(e) = editor.load_history(&self.path) {
            debug!(path = %self.path.display(), error = %e, "no REPL history loaded");
        }
    }

    fn save(&self, editor: &mut DefaultEditor) {
        if let Some(dir) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                debug!(error = %e, "cannot create history directory");
                return;
            }
        }
        if let Err(e) = editor.save_history(&self.path) {
            debug!(error = %e, "failed to save REPL history");
        }
    }
}
