//! Line-oriented editing session
//!
//! History lives only as long as the store, so select/undo/redo are
//! offered here rather than as one-shot commands.

use std::io::BufRead;

use clap::Parser;
use tracing::debug;

use crate::application::TreeStore;
use crate::cli::args::{SessionCommand, SessionLine};
use crate::cli::commands::run_edit;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::domain::{DomainError, NodeId};
use crate::infrastructure::InfraError;

const PROMPT: &str = "bted>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Process commands from `input` until EOF or `quit`.
///
/// Command errors are reported and the session continues; only failing
/// to read input ends it with an error.
pub fn run<R: BufRead>(store: &mut TreeStore, input: R, interactive: bool) -> CliResult<()> {
    if interactive {
        output::prompt(PROMPT);
    }
    for line in input.lines() {
        let line = line.map_err(|e| InfraError::io("read session input", e))?;
        let flow = handle_line(store, &line);
        if flow == Flow::Quit {
            break;
        }
        if interactive {
            output::prompt(PROMPT);
        }
    }
    Ok(())
}

fn handle_line(store: &mut TreeStore, line: &str) -> Flow {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Flow::Continue;
    }
    let tokens = match split_line(trimmed) {
        Ok(tokens) => tokens,
        Err(msg) => {
            output::error(&msg);
            return Flow::Continue;
        }
    };
    let parsed = match SessionLine::try_parse_from(&tokens) {
        Ok(parsed) => parsed,
        Err(e) => {
            e.print().ok();
            return Flow::Continue;
        }
    };
    debug!(command = ?parsed.command, "session command");
    match step(store, parsed.command) {
        Ok(flow) => flow,
        Err(e) => {
            output::error(&e);
            Flow::Continue
        }
    }
}

/// Execute one session command.
pub fn step(store: &mut TreeStore, command: SessionCommand) -> CliResult<Flow> {
    match command {
        SessionCommand::Edit(cmd) => run_edit(store, &cmd)?,
        SessionCommand::Select { node } => {
            let id = NodeId::from(node);
            if !store.select_node(&id) {
                return Err(CliError::Rejected(DomainError::NodeNotFound(id)));
            }
            if let Some((id, node)) = store.selected_node() {
                output::action("Selected", &format!("{id} ({})", node.data.value));
            }
        }
        SessionCommand::Deselect => store.deselect_node(),
        SessionCommand::Undo => {
            if store.undo()? {
                output::action("Undo", &position(store));
            } else {
                output::warning("nothing to undo");
            }
        }
        SessionCommand::Redo => {
            if store.redo()? {
                output::action("Redo", &position(store));
            } else {
                output::warning("nothing to redo");
            }
        }
        SessionCommand::History => output::info(&position(store)),
        SessionCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn position(store: &TreeStore) -> String {
    format!(
        "history {}/{} (keeps {})",
        store.history_index() + 1,
        store.history_len(),
        store.history_capacity()
    )
}

/// Split a line into words; single or double quotes group words, `""` is an empty word.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
