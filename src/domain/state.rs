//! Editor state and the pure transition function over it

use tracing::instrument;

use super::arena::TreeArena;
use super::error::DomainError;
use super::node::{NodeData, NodeId, Side};

/// Tree plus selection: the unit captured by history snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub tree: TreeArena,
    /// Selected node, always None or an id present in `tree`
    pub selection: Option<NodeId>,
}

/// A tree mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Replace any existing tree with a single root node
    CreateRoot { value: String },
    AddChild {
        parent: NodeId,
        side: Side,
        value: String,
    },
    EditValue { node: NodeId, value: String },
    SetColor { node: NodeId, color: String },
    SetAnnotation { node: NodeId, annotation: String },
    /// Remove a node with its subtree; removing the root empties the tree
    Delete { node: NodeId },
    /// Re-parent a non-root node into a free slot of `target`
    Move {
        node: NodeId,
        target: NodeId,
        side: Side,
    },
    /// Swap in a whole tree (import, examples, clear); clears the selection
    Replace { tree: TreeArena },
}

impl EditorState {
    pub fn new(tree: TreeArena) -> Self {
        Self {
            tree,
            selection: None,
        }
    }

    /// Apply `op`, returning the successor state.
    ///
    /// `self` is never modified; a rejected operation returns the reason.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&self, op: Operation) -> Result<EditorState, DomainError> {
        let mut next = self.clone();
        match op {
            Operation::CreateRoot { value } => {
                let (tree, _) = TreeArena::with_root(NodeData::new(value));
                next.tree = tree;
                next.selection = None;
            }
            Operation::AddChild {
                parent,
                side,
                value,
            } => {
                next.tree.attach_new(&parent, side, NodeData::new(value))?;
            }
            Operation::EditValue { node, value } => {
                next.node_data_mut(&node)?.value = value;
            }
            Operation::SetColor { node, color } => {
                next.node_data_mut(&node)?.color = color;
            }
            Operation::SetAnnotation { node, annotation } => {
                next.node_data_mut(&node)?.annotation = annotation;
            }
            Operation::Delete { node } => next.delete(&node)?,
            Operation::Move { node, target, side } => next.move_node(&node, &target, side)?,
            Operation::Replace { tree } => {
                next.tree = tree;
                next.selection = None;
            }
        }
        Ok(next)
    }

    /// Select a node present in the tree.
    pub fn select(&mut self, node: &NodeId) -> Result<(), DomainError> {
        if !self.tree.contains(node) {
            return Err(DomainError::NodeNotFound(node.clone()));
        }
        self.selection = Some(node.clone());
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    fn node_data_mut(&mut self, node: &NodeId) -> Result<&mut NodeData, DomainError> {
        self.tree
            .find_mut(node)
            .map(|n| &mut n.data)
            .ok_or_else(|| DomainError::NodeNotFound(node.clone()))
    }

    fn delete(&mut self, node: &NodeId) -> Result<(), DomainError> {
        if self.tree.root() == Some(node) {
            self.tree = TreeArena::new();
            self.selection = None;
            return Ok(());
        }
        let removed = self
            .tree
            .detach(node)
            .ok_or_else(|| DomainError::NodeNotFound(node.clone()))?;
        if self
            .selection
            .as_ref()
            .is_some_and(|selected| removed.contains(selected))
        {
            self.selection = None;
        }
        Ok(())
    }

    fn move_node(&mut self, node: &NodeId, target: &NodeId, side: Side) -> Result<(), DomainError> {
        if node == target {
            return Err(DomainError::SelfMove(node.clone()));
        }
        if self.tree.is_descendant(node, target) {
            return Err(DomainError::CycleDetected {
                node: node.clone(),
                target: target.clone(),
            });
        }
        for id in [node, target] {
            if !self.tree.contains(id) {
                return Err(DomainError::NodeNotFound(id.clone()));
            }
        }
        if self.tree.find(target).and_then(|t| t.child(side)).is_some() {
            return Err(DomainError::SlotOccupied {
                parent: target.clone(),
                side,
            });
        }
        if self.tree.root() == Some(node) {
            return Err(DomainError::RootMove(node.clone()));
        }

        let subtree = self
            .tree
            .detach(node)
            .ok_or_else(|| DomainError::NodeNotFound(node.clone()))?;
        self.tree.graft(target, side, subtree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A(B(D, -), C)
    fn sample() -> (EditorState, [NodeId; 4]) {
        let (mut tree, a) = TreeArena::with_root(NodeData::new("A"));
        let b = tree.attach_new(&a, Side::Left, NodeData::new("B")).unwrap();
        let c = tree.attach_new(&a, Side::Right, NodeData::new("C")).unwrap();
        let d = tree.attach_new(&b, Side::Left, NodeData::new("D")).unwrap();
        (EditorState::new(tree), [a, b, c, d])
    }

    #[test]
    fn given_state_when_applying_then_original_is_untouched() {
        let (state, [a, ..]) = sample();
        let next = state
            .apply(Operation::EditValue {
                node: a.clone(),
                value: "Z".to_string(),
            })
            .unwrap();
        assert_eq!(state.tree.find(&a).unwrap().data.value, "A");
        assert_eq!(next.tree.find(&a).unwrap().data.value, "Z");
    }

    #[test]
    fn given_selected_descendant_when_deleting_subtree_then_clears_selection() {
        let (mut state, [_, b, _, d]) = sample();
        state.select(&d).unwrap();
        let next = state.apply(Operation::Delete { node: b }).unwrap();
        assert_eq!(next.selection, None);
        assert!(!next.tree.contains(&d));
    }

    #[test]
    fn given_unrelated_selection_when_deleting_then_keeps_selection() {
        let (mut state, [_, b, c, _]) = sample();
        state.select(&c).unwrap();
        let next = state.apply(Operation::Delete { node: b }).unwrap();
        assert_eq!(next.selection, Some(c));
    }

    #[test]
    fn given_move_into_own_subtree_then_cycle_rejected() {
        let (state, [_, b, _, d]) = sample();
        let err = state
            .apply(Operation::Move {
                node: b.clone(),
                target: d.clone(),
                side: Side::Right,
            })
            .unwrap_err();
        assert_eq!(err, DomainError::CycleDetected { node: b, target: d });
    }

    #[test]
    fn given_move_to_sibling_slot_of_same_parent_then_succeeds() {
        let (state, [a, b, c, d]) = sample();
        let next = state
            .apply(Operation::Move {
                node: d.clone(),
                target: b.clone(),
                side: Side::Right,
            })
            .unwrap();
        assert_eq!(next.tree.position_of(&d), Some((&b, Side::Right)));
        assert!(next.tree.find(&b).unwrap().left.is_none());
        assert_eq!(next.tree.position_of(&c), Some((&a, Side::Right)));
    }

    #[test]
    fn given_unknown_id_when_selecting_then_rejected() {
        let (mut state, _) = sample();
        assert!(state.select(&NodeId::from("ghost")).is_err());
        assert_eq!(state.selection, None);
    }
}
