//! Command dispatch

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::TreeStore;
use crate::cli::args::{Cli, Commands, ConfigCommands, EditCommand};
use crate::cli::output;
use crate::cli::render::TreeDisplay;
use crate::cli::session;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::NodeId;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            print_completions(*shell);
            Ok(())
        }
        Some(Commands::Config { command }) => config_command(cli, command),
        Some(Commands::Edit(cmd)) => {
            let mut store = open_store(cli)?;
            run_edit(&mut store, cmd)
        }
        Some(Commands::Session) => {
            let mut store = open_store(cli)?;
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            session::run(&mut store, stdin.lock(), interactive)
        }
        None => {
            let mut store = open_store(cli)?;
            run_edit(&mut store, &EditCommand::Show)
        }
    }
}

/// Settings from config layers, with `--data-dir` applied last.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    debug!(?settings, "settings loaded");
    Ok(settings)
}

fn open_store(cli: &Cli) -> CliResult<TreeStore> {
    let container = ServiceContainer::new(load_settings(cli)?);
    Ok(container.open_store()?)
}

/// Run one edit command against `store`.
#[instrument(level = "debug", skip(store))]
pub fn run_edit(store: &mut TreeStore, cmd: &EditCommand) -> CliResult<()> {
    match cmd {
        EditCommand::Show => {
            output::info(&store.tree().to_tree_string(store.selection()));
        }
        EditCommand::Stats => print_stats(store),
        EditCommand::Root { value } => {
            let id = store.create_root(value.as_str())?;
            output::action("Created root", &id);
        }
        EditCommand::Add {
            parent,
            side,
            value,
        } => {
            let id = store
                .add_child(&NodeId::from(parent.as_str()), *side, value.as_str())?
                .ok_or_else(|| rejected(store))?;
            output::action("Added", &format!("{side} child {id} under {parent}"));
        }
        EditCommand::Edit { node, value } => {
            let applied = store.edit_node(&NodeId::from(node.as_str()), value.as_str())?;
            ensure_applied(store, applied)?;
            output::action("Edited", node);
        }
        EditCommand::Color { node, color } => {
            let applied = store.change_node_color(&NodeId::from(node.as_str()), color.as_str())?;
            ensure_applied(store, applied)?;
            output::action("Colored", &format!("{node} {color}"));
        }
        EditCommand::Annotate { node, text } => {
            let applied =
                store.change_node_annotation(&NodeId::from(node.as_str()), text.as_str())?;
            ensure_applied(store, applied)?;
            output::action("Annotated", node);
        }
        EditCommand::Delete { node } => {
            let applied = store.delete_node(&NodeId::from(node.as_str()))?;
            ensure_applied(store, applied)?;
            output::action("Deleted", node);
        }
        EditCommand::Move { node, target, side } => {
            let applied = store.move_node(
                &NodeId::from(node.as_str()),
                &NodeId::from(target.as_str()),
                *side,
            )?;
            ensure_applied(store, applied)?;
            output::action("Moved", &format!("{node} to {side} of {target}"));
        }
        EditCommand::Export { output: target } => {
            let text = store.export_tree()?;
            match target {
                Some(path) => {
                    std::fs::write(path, text)
                        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
                    output::success(&format!("Exported to {}", path.display()));
                }
                None => output::info(&text),
            }
        }
        EditCommand::Import { file } => {
            let text = read_input(file)?;
            store.import_tree(&text)?;
            output::success(&format!(
                "Imported {} nodes",
                store.tree().len()
            ));
        }
        EditCommand::Example { kind } => {
            store.load_example_tree(*kind)?;
            output::success(&format!("Loaded {kind} example"));
        }
        EditCommand::Clear => {
            store.clear_tree()?;
            output::success("Cleared tree");
        }
    }
    Ok(())
}

fn print_stats(store: &TreeStore) {
    match store.stats() {
        Some(stats) => {
            output::header("Tree statistics");
            output::detail(&format!("total nodes: {}", stats.total_nodes));
            output::detail(&format!("max depth:   {}", stats.max_depth));
            output::detail(&format!("leaf nodes:  {}", stats.leaf_nodes));
        }
        None => output::info("(empty tree)"),
    }
}

/// Error for an operation the store turned down.
fn rejected(store: &TreeStore) -> CliError {
    match store.last_rejection() {
        Some(reason) => CliError::Rejected(reason.clone()),
        None => CliError::Usage("operation had no effect".to_string()),
    }
}

fn ensure_applied(store: &TreeStore, applied: bool) -> CliResult<()> {
    if applied {
        Ok(())
    } else {
        Err(rejected(store))
    }
}

/// Read a file, or stdin for `-`.
fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| InfraError::io("read stdin", e))?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read {}", path.display()), e).into())
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let settings = load_settings(cli)?;
            match global_config_path() {
                Some(path) => output::action("global config", &path.display()),
                None => output::warning("no config directory for this platform"),
            }
            output::action("tree file", &settings.storage_path().display());
        }
    }
    Ok(())
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
