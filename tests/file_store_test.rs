//! Tests for persistence through the file blob store

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use bted::application::ApplicationError;
use bted::config::Settings;
use bted::domain::{SampleKind, DEFAULT_COLOR};
use bted::infrastructure::di::ServiceContainer;
use bted::infrastructure::traits::{BlobStore, FileBlobStore, RealFileSystem};

fn settings_in(temp: &TempDir) -> Settings {
    Settings {
        data_dir: temp.path().join("data"),
        ..Settings::default()
    }
}

#[test]
fn given_committed_tree_when_reopening_then_tree_restored_without_history() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(settings_in(&temp));
    let mut first = container.open_store().unwrap();
    first.load_example_tree(SampleKind::Complex).unwrap();
    let root = first.tree().root().unwrap().clone();
    first.select_node(&root);

    // Act
    let second = ServiceContainer::new(settings_in(&temp)).open_store().unwrap();

    // Assert
    assert_eq!(second.tree(), first.tree());
    assert_eq!(second.selection(), None);
    assert!(!second.can_undo());
    assert!(settings_in(&temp).storage_path().exists());
}

#[test]
fn given_no_file_when_opening_then_empty_tree() {
    let temp = TempDir::new().unwrap();

    let store = ServiceContainer::new(settings_in(&temp)).open_store().unwrap();

    assert!(!store.has_tree());
    assert_eq!(store.history_len(), 1);
}

#[test]
fn given_hand_written_legacy_file_when_opening_then_migrated() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = settings_in(&temp);
    fs::create_dir_all(&settings.data_dir).unwrap();
    fs::write(
        settings.storage_path(),
        r#"{"id":"_root","value":1,"left":null,"right":{"id":"_r","value":true}}"#,
    )
    .unwrap();

    // Act
    let store = ServiceContainer::new(settings).open_store().unwrap();

    // Assert
    let values: Vec<&str> = store
        .tree()
        .iter()
        .map(|(_, node, _)| node.data.value.as_str())
        .collect();
    assert_eq!(values, vec!["1", "true"]);
    for (_, node, _) in store.tree().iter() {
        assert_eq!(node.data.color, DEFAULT_COLOR);
    }
}

#[test]
fn given_corrupt_file_when_opening_then_empty_store_and_clear_replaces_file() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let settings = settings_in(&temp);
    fs::create_dir_all(&settings.data_dir).unwrap();
    fs::write(settings.storage_path(), "{\"id\": ").unwrap();

    // Act
    let mut store = ServiceContainer::new(settings.clone()).open_store().unwrap();
    store.clear_tree().unwrap();

    // Assert
    assert!(!store.has_tree());
    assert_eq!(fs::read_to_string(settings.storage_path()).unwrap(), "null");
    assert!(ServiceContainer::new(settings).open_store().is_ok());
}

#[test]
fn given_corrupt_file_when_loading_directly_then_corrupt_storage_error() {
    let temp = TempDir::new().unwrap();
    let settings = settings_in(&temp);
    fs::create_dir_all(&settings.data_dir).unwrap();
    fs::write(settings.storage_path(), "{\"id\": ").unwrap();
    let mut store = ServiceContainer::new(settings).tree_store();

    let result = store.load_from_storage();

    assert!(matches!(result, Err(ApplicationError::CorruptStorage { .. })));
    assert!(!store.has_tree());
}

#[test]
fn given_invalid_key_when_writing_then_io_error() {
    let temp = TempDir::new().unwrap();
    let blobs = FileBlobStore::new(temp.path(), Arc::new(RealFileSystem));

    assert!(blobs.set("../escape", "null").is_err());
    assert!(blobs.set(".hidden", "null").is_err());
    assert!(blobs.get("").is_err());
}

#[test]
fn given_blob_when_removing_then_gone_and_second_remove_ok() {
    let temp = TempDir::new().unwrap();
    let blobs = FileBlobStore::new(temp.path(), Arc::new(RealFileSystem));
    blobs.set("binaryTree", "null").unwrap();

    blobs.remove("binaryTree").unwrap();

    assert_eq!(blobs.get("binaryTree").unwrap(), None);
    assert!(blobs.remove("binaryTree").is_ok());
}

#[test]
fn given_unwritable_data_dir_when_committing_then_storage_error_after_state_change() {
    // Arrange: a regular file where the data directory should be
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("data");
    fs::write(&blocker, "not a directory").unwrap();
    let container = ServiceContainer::new(settings_in(&temp));
    let mut store = container.tree_store();

    // Act
    let result = store.create_root("A");

    // Assert: in-memory commit happened, the write failure is reported
    assert!(matches!(result, Err(ApplicationError::Storage { .. })));
    assert!(store.has_tree());
    assert!(store.can_undo());
}
