//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{SampleKind, Side};

/// Binary tree editor: build, edit and persist a binary tree with undo/redo
#[derive(Parser, Debug)]
#[command(name = "bted")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Additional config file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted tree (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Edit(EditCommand),

    /// Read commands from stdin in one session (enables select, undo, redo)
    Session,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Commands available both one-shot and inside a session
#[derive(Subcommand, Debug, Clone)]
pub enum EditCommand {
    /// Render the tree
    Show,

    /// Show node count, depth and leaf count
    Stats,

    /// Create a root node, replacing any existing tree
    Root {
        /// Node value
        value: String,
    },

    /// Add a child node
    Add {
        /// Parent node id
        parent: String,
        /// left or right
        side: Side,
        /// Node value
        value: String,
    },

    /// Change a node's value
    Edit {
        /// Node id
        node: String,
        /// New value
        value: String,
    },

    /// Change a node's color
    Color {
        /// Node id
        node: String,
        /// Color, e.g. #10b981
        color: String,
    },

    /// Change a node's annotation
    Annotate {
        /// Node id
        node: String,
        /// Annotation text (empty string clears it)
        text: String,
    },

    /// Delete a node and its subtree
    Delete {
        /// Node id
        node: String,
    },

    /// Move a node (with its subtree) under a new parent
    Move {
        /// Node to move
        node: String,
        /// New parent
        target: String,
        /// Slot of the new parent: left or right
        side: Side,
    },

    /// Export the tree as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Import a tree from JSON, replacing the current one
    Import {
        /// Input file, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Load a demonstration tree
    Example {
        /// simple, numbers or complex
        kind: SampleKind,
    },

    /// Remove the whole tree
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
    /// Show config and data file locations
    Path,
}

/// One line of a session
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    #[command(flatten)]
    Edit(EditCommand),

    /// Select a node
    Select {
        /// Node id
        node: String,
    },

    /// Clear the selection
    Deselect,

    /// Undo the last change
    Undo,

    /// Redo the last undone change
    Redo,

    /// Show history position
    History,

    /// End the session
    #[command(alias = "exit")]
    Quit,
}
