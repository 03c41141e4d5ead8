//! Tree store
//!
//! Owns the editor state, its history and the blob store handle. Every
//! committing operation runs the pure domain transition, records the result
//! in history and writes the tree to the blob store. Selection changes are
//! session-local and neither recorded nor persisted.

use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use crate::application::codec;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    DomainError, EditorState, History, NodeId, Operation, SampleKind, Side, TreeArena, TreeNode,
    TreeStats,
};
use crate::infrastructure::traits::BlobStore;

/// Whether a commit is a new edit or a replay of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Record the new state in history
    Record,
    /// Restore a state taken from history; history is left alone
    Replay,
}

pub struct TreeStore {
    state: EditorState,
    history: History,
    blobs: Arc<dyn BlobStore>,
    key: String,
    last_rejection: Option<DomainError>,
}

impl TreeStore {
    /// Empty store; history holds the empty state as its only entry.
    pub fn new(blobs: Arc<dyn BlobStore>, key: impl Into<String>, max_history: usize) -> Self {
        let state = EditorState::default();
        let mut history = History::new(max_history);
        history.reset(state.clone());
        Self {
            state,
            history,
            blobs,
            key: key.into(),
            last_rejection: None,
        }
    }

    // ------------------------------------------------------------
    // Views
    // ------------------------------------------------------------

    pub fn tree(&self) -> &TreeArena {
        &self.state.tree
    }

    pub fn has_tree(&self) -> bool {
        !self.state.tree.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&TreeNode> {
        self.state.tree.find(id)
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.state.selection.as_ref()
    }

    pub fn selected_node(&self) -> Option<(&NodeId, &TreeNode)> {
        let id = self.state.selection.as_ref()?;
        self.state.tree.find(id).map(|node| (id, node))
    }

    /// None when there is no tree.
    pub fn stats(&self) -> Option<TreeStats> {
        self.state.tree.stats()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> usize {
        self.history.cursor()
    }

    /// Reason the most recent operation was a no-op, cleared by the next success.
    pub fn last_rejection(&self) -> Option<&DomainError> {
        self.last_rejection.as_ref()
    }

    /// Maximum number of retained history entries.
    pub fn history_capacity(&self) -> usize {
        self.history.max_size()
    }

    // ------------------------------------------------------------
    // Committing operations
    // ------------------------------------------------------------

    /// Replace any existing tree with a single root node.
    #[instrument(level = "debug", skip(self, value))]
    pub fn create_root(&mut self, value: impl Into<String>) -> ApplicationResult<NodeId> {
        self.execute(Operation::CreateRoot {
            value: value.into(),
        })?;
        self.state
            .tree
            .root()
            .cloned()
            .ok_or_else(|| ApplicationError::Domain(DomainError::InvalidStructure(
                "root missing after create".to_string(),
            )))
    }

    pub fn add_left_child(
        &mut self,
        parent: &NodeId,
        value: impl Into<String>,
    ) -> ApplicationResult<Option<NodeId>> {
        self.add_child(parent, Side::Left, value)
    }

    pub fn add_right_child(
        &mut self,
        parent: &NodeId,
        value: impl Into<String>,
    ) -> ApplicationResult<Option<NodeId>> {
        self.add_child(parent, Side::Right, value)
    }

    /// Attach a new leaf; None if the parent is unknown or the slot is taken.
    #[instrument(level = "debug", skip(self, value))]
    pub fn add_child(
        &mut self,
        parent: &NodeId,
        side: Side,
        value: impl Into<String>,
    ) -> ApplicationResult<Option<NodeId>> {
        let applied = self.execute(Operation::AddChild {
            parent: parent.clone(),
            side,
            value: value.into(),
        })?;
        if !applied {
            return Ok(None);
        }
        Ok(self
            .state
            .tree
            .find(parent)
            .and_then(|p| p.child(side))
            .cloned())
    }

    #[instrument(level = "debug", skip(self, value))]
    pub fn edit_node(&mut self, node: &NodeId, value: impl Into<String>) -> ApplicationResult<bool> {
        self.execute(Operation::EditValue {
            node: node.clone(),
            value: value.into(),
        })
    }

    #[instrument(level = "debug", skip(self, color))]
    pub fn change_node_color(
        &mut self,
        node: &NodeId,
        color: impl Into<String>,
    ) -> ApplicationResult<bool> {
        self.execute(Operation::SetColor {
            node: node.clone(),
            color: color.into(),
        })
    }

    #[instrument(level = "debug", skip(self, annotation))]
    pub fn change_node_annotation(
        &mut self,
        node: &NodeId,
        annotation: impl Into<String>,
    ) -> ApplicationResult<bool> {
        self.execute(Operation::SetAnnotation {
            node: node.clone(),
            annotation: annotation.into(),
        })
    }

    /// Delete a node with its subtree. Deleting the root empties the tree.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&mut self, node: &NodeId) -> ApplicationResult<bool> {
        self.execute(Operation::Delete { node: node.clone() })
    }

    /// Re-parent `node` into the `side` slot of `target`.
    ///
    /// Returns false without change for self moves, moves below the node's own
    /// descendants, unknown ids, occupied slots and the root.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &mut self,
        node: &NodeId,
        target: &NodeId,
        side: Side,
    ) -> ApplicationResult<bool> {
        self.execute(Operation::Move {
            node: node.clone(),
            target: target.clone(),
            side,
        })
    }

    /// Replace the tree with a parsed document. On failure nothing changes.
    #[instrument(level = "debug", skip(self, text))]
    pub fn import_tree(&mut self, text: &str) -> ApplicationResult<()> {
        let tree = codec::parse_tree(text)?;
        self.execute(Operation::Replace { tree })?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load_example_tree(&mut self, kind: SampleKind) -> ApplicationResult<()> {
        self.execute(Operation::Replace { tree: kind.build() })?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn clear_tree(&mut self) -> ApplicationResult<()> {
        self.execute(Operation::Replace {
            tree: TreeArena::new(),
        })?;
        Ok(())
    }

    /// Pretty-printed document of the current tree.
    pub fn export_tree(&self) -> ApplicationResult<String> {
        codec::export_tree(&self.state.tree)
    }

    // ------------------------------------------------------------
    // Selection (not recorded, not persisted)
    // ------------------------------------------------------------

    /// Select a node; false if the id is not in the tree.
    pub fn select_node(&mut self, node: &NodeId) -> bool {
        match self.state.select(node) {
            Ok(()) => true,
            Err(reason) => {
                debug!(%reason, "selection rejected");
                false
            }
        }
    }

    pub fn deselect_node(&mut self) {
        self.state.deselect();
    }

    // ------------------------------------------------------------
    // History
    // ------------------------------------------------------------

    /// Restore the previous snapshot; false at the oldest entry.
    #[instrument(level = "debug", skip(self))]
    pub fn undo(&mut self) -> ApplicationResult<bool> {
        let Some(snapshot) = self.history.undo().cloned() else {
            return Ok(false);
        };
        self.commit(snapshot, CommitMode::Replay)?;
        Ok(true)
    }

    /// Restore the next snapshot; false at the newest entry.
    #[instrument(level = "debug", skip(self))]
    pub fn redo(&mut self) -> ApplicationResult<bool> {
        let Some(snapshot) = self.history.redo().cloned() else {
            return Ok(false);
        };
        self.commit(snapshot, CommitMode::Replay)?;
        Ok(true)
    }

    // ------------------------------------------------------------
    // Blob store boundary
    // ------------------------------------------------------------

    /// Write the current tree to the blob store.
    pub fn save_to_storage(&self) -> ApplicationResult<()> {
        let encoded = codec::encode_tree(&self.state.tree)?;
        trace!(key = %self.key, bytes = encoded.len(), "saving tree");
        self.blobs
            .set(&self.key, &encoded)
            .with_storage_context("write tree", &self.key)
    }

    /// Load the persisted tree and restart history from it.
    ///
    /// Without a stored blob the current tree is kept. A corrupt blob leaves
    /// an empty tree and is reported as `CorruptStorage`.
    #[instrument(level = "debug", skip(self))]
    pub fn load_from_storage(&mut self) -> ApplicationResult<()> {
        let saved = self
            .blobs
            .get(&self.key)
            .with_storage_context("read tree", &self.key)?;

        let loaded = match saved.as_deref().map(codec::parse_tree) {
            None => Ok(self.state.tree.clone()),
            Some(Ok(tree)) => Ok(tree),
            Some(Err(e)) => Err(e),
        };

        let result = match loaded {
            Ok(tree) => {
                debug!(nodes = tree.len(), "loaded tree");
                self.state = EditorState::new(tree);
                Ok(())
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding corrupt stored tree");
                self.state = EditorState::default();
                Err(ApplicationError::CorruptStorage {
                    message: e.to_string(),
                })
            }
        };
        self.history.reset(self.state.clone());
        result
    }

    // ------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------

    /// Run a transition. Ok(false) means it was rejected and nothing changed.
    fn execute(&mut self, op: Operation) -> ApplicationResult<bool> {
        match self.state.apply(op) {
            Ok(next) => {
                self.last_rejection = None;
                self.commit(next, CommitMode::Record)?;
                Ok(true)
            }
            Err(reason) => {
                debug!(%reason, "operation rejected");
                self.last_rejection = Some(reason);
                Ok(false)
            }
        }
    }

    /// Install `next`, record it unless replaying, then persist.
    ///
    /// State and history are updated before the write, so a storage
    /// failure leaves a consistent session and is returned to the caller.
    fn commit(&mut self, next: EditorState, mode: CommitMode) -> ApplicationResult<()> {
        self.state = next;
        if mode == CommitMode::Record {
            self.history.record(self.state.clone());
        }
        self.save_to_storage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::MemoryBlobStore;

    fn store() -> (TreeStore, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::default());
        (TreeStore::new(blobs.clone(), "binaryTree", 50), blobs)
    }

    #[test]
    fn given_commit_when_recording_then_blob_written() {
        let (mut store, blobs) = store();
        store.create_root("A").unwrap();
        let saved = blobs.get("binaryTree").unwrap().unwrap();
        assert!(saved.contains("\"value\":\"A\""));
    }

    #[test]
    fn given_rejection_then_reason_kept_until_next_success() {
        let (mut store, _) = store();
        let ghost = NodeId::from("ghost");
        assert!(!store.edit_node(&ghost, "x").unwrap());
        assert_eq!(
            store.last_rejection(),
            Some(&DomainError::NodeNotFound(ghost))
        );
        store.create_root("A").unwrap();
        assert!(store.last_rejection().is_none());
    }

    #[test]
    fn given_replay_when_undoing_then_history_not_grown() {
        let (mut store, blobs) = store();
        store.create_root("A").unwrap();
        assert_eq!(store.history_len(), 2);

        assert!(store.undo().unwrap());

        assert_eq!(store.history_len(), 2);
        assert_eq!(store.history_index(), 0);
        assert_eq!(blobs.get("binaryTree").unwrap().as_deref(), Some("null"));
    }
}
