//! CLI layer: argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod render;
pub mod session;

pub use args::{Cli, Commands, EditCommand};
pub use error::{CliError, CliResult};
