//! Tests for one-shot command dispatch against a file-backed store

use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use bted::cli::commands::execute_command;
use bted::cli::Cli;

fn run(data_dir: &Path, args: &[&str]) -> Result<(), bted::cli::CliError> {
    let dir = data_dir.to_string_lossy().into_owned();
    let mut argv = vec!["bted", "--data-dir", dir.as_str()];
    argv.extend_from_slice(args);
    execute_command(&Cli::try_parse_from(argv).expect("parse args"))
}

#[test]
fn given_corrupt_tree_file_when_clearing_then_succeeds_and_file_replaced() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let tree_file = temp.path().join("binaryTree.json");
    fs::write(&tree_file, "{\"id\": \"_a\", \"value\": ").unwrap();

    // Act
    let result = run(temp.path(), &["clear"]);

    // Assert
    assert!(result.is_ok(), "clear failed: {result:?}");
    assert_eq!(fs::read_to_string(&tree_file).unwrap(), "null");
}

#[test]
fn given_corrupt_tree_file_when_loading_example_then_example_persisted() {
    let temp = TempDir::new().unwrap();
    let tree_file = temp.path().join("binaryTree.json");
    fs::write(&tree_file, "not json at all").unwrap();

    run(temp.path(), &["example", "simple"]).unwrap();

    let saved = fs::read_to_string(&tree_file).unwrap();
    assert!(saved.contains("\"value\":\"A\""));
    assert!(run(temp.path(), &["stats"]).is_ok());
}

#[test]
fn given_unknown_node_when_editing_then_rejected_with_dataerr() {
    let temp = TempDir::new().unwrap();
    run(temp.path(), &["root", "A"]).unwrap();

    let err = run(temp.path(), &["edit", "ghost", "X"]).unwrap_err();

    assert_eq!(err.exit_code(), bted::exitcode::DATAERR);
}
