//! Tests for the line-oriented session

use std::io::Cursor;
use std::sync::Arc;

use clap::Parser;

use bted::application::TreeStore;
use bted::cli::args::{SessionCommand, SessionLine};
use bted::cli::session::{self, split_line, Flow};
use bted::cli::CliError;
use bted::domain::NodeId;
use bted::infrastructure::traits::MemoryBlobStore;

fn new_store() -> TreeStore {
    TreeStore::new(Arc::new(MemoryBlobStore::default()), "binaryTree", 50)
}

fn parse(line: &str) -> SessionCommand {
    let tokens = split_line(line).expect("split line");
    SessionLine::try_parse_from(tokens)
        .expect("parse line")
        .command
}

fn root_id(store: &TreeStore) -> String {
    store.tree().root().expect("root").to_string()
}

#[test]
fn given_script_when_running_session_then_commands_applied_in_order() {
    // Arrange
    let mut store = new_store();
    let script = "root A\nexample simple\nundo\n";

    // Act
    session::run(&mut store, Cursor::new(script), false).unwrap();

    // Assert: the example was undone, leaving the single root
    assert_eq!(store.tree().len(), 1);
    assert!(store.can_redo());
}

#[test]
fn given_failing_line_when_running_session_then_later_lines_still_run() {
    let mut store = new_store();
    let script = "root A\nedit ghost X\nbogus command\nedit \"unterminated\nexample numbers\n";

    session::run(&mut store, Cursor::new(script), false).unwrap();

    assert_eq!(store.tree().len(), 6);
}

#[test]
fn given_quit_when_running_session_then_remaining_lines_ignored() {
    let mut store = new_store();
    let script = "# comment\n\nroot A\nquit\nclear\n";

    session::run(&mut store, Cursor::new(script), false).unwrap();

    assert!(store.has_tree());
}

#[test]
fn given_edit_commands_when_stepping_then_store_updated() {
    // Arrange
    let mut store = new_store();
    session::step(&mut store, parse("root A")).unwrap();
    let root = root_id(&store);

    // Act
    session::step(&mut store, parse(&format!("add {root} left B"))).unwrap();
    session::step(&mut store, parse(&format!("annotate {root} \"the root\""))).unwrap();
    session::step(&mut store, parse(&format!("color {root} #ef4444"))).unwrap();

    // Assert
    let node = store.node(&NodeId::from(root.as_str())).unwrap();
    assert_eq!(node.data.annotation, "the root");
    assert_eq!(node.data.color, "#ef4444");
    assert!(node.left.is_some());
}

#[test]
fn given_unknown_node_when_selecting_then_rejected() {
    let mut store = new_store();
    session::step(&mut store, parse("root A")).unwrap();

    let result = session::step(&mut store, parse("select ghost"));

    assert!(matches!(result, Err(CliError::Rejected(_))));
    assert_eq!(store.selection(), None);
}

#[test]
fn given_select_then_deselect_when_stepping_then_selection_cleared() {
    let mut store = new_store();
    session::step(&mut store, parse("root A")).unwrap();
    let root = root_id(&store);

    session::step(&mut store, parse(&format!("select {root}"))).unwrap();
    assert_eq!(store.selection().map(|id| id.to_string()), Some(root));

    session::step(&mut store, parse("deselect")).unwrap();
    assert_eq!(store.selection(), None);
}

#[test]
fn given_occupied_slot_when_adding_then_rejected() {
    let mut store = new_store();
    session::step(&mut store, parse("example simple")).unwrap();
    let root = root_id(&store);

    let result = session::step(&mut store, parse(&format!("add {root} right Z")));

    assert!(matches!(result, Err(CliError::Rejected(_))));
    assert_eq!(store.tree().len(), 3);
}

#[test]
fn given_undo_redo_when_stepping_then_flow_continues() {
    let mut store = new_store();
    session::step(&mut store, parse("root A")).unwrap();

    assert_eq!(session::step(&mut store, parse("undo")).unwrap(), Flow::Continue);
    assert!(!store.has_tree());
    assert_eq!(session::step(&mut store, parse("undo")).unwrap(), Flow::Continue);
    assert_eq!(session::step(&mut store, parse("redo")).unwrap(), Flow::Continue);
    assert!(store.has_tree());
}

#[test]
fn given_exit_alias_when_stepping_then_quit() {
    let mut store = new_store();

    assert_eq!(session::step(&mut store, parse("exit")).unwrap(), Flow::Quit);
}
