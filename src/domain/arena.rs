use std::collections::BTreeMap;

use tracing::instrument;

use super::error::DomainError;
use super::id::generate_id;
use super::node::{NodeData, NodeId, Side};

/// Deepest allowed node depth, the root being depth 0.
///
/// Nested serialization of a deeper tree would exceed the nesting serde_json
/// accepts when reading it back.
pub const MAX_DEPTH: usize = 100;

/// Tree node in the id-addressed arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// User-facing payload
    pub data: NodeData,
    /// Id of the parent node, None for the root
    pub parent: Option<NodeId>,
    /// Left child id
    pub left: Option<NodeId>,
    /// Right child id
    pub right: Option<NodeId>,
}

impl TreeNode {
    fn leaf(data: NodeData, parent: Option<NodeId>) -> Self {
        Self {
            data,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<&NodeId> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Aggregate statistics of a non-empty tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub total_nodes: usize,
    /// Depth of the deepest node, the root being depth 0
    pub max_depth: usize,
    /// Nodes without children
    pub leaf_nodes: usize,
}

/// Arena-based binary tree addressed by node id.
///
/// Children are stored as ids, so re-parenting is a matter of rewiring
/// two slots and a clone of the arena is a full snapshot of the tree.
/// Every node in `nodes` is reachable from `root`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeArena {
    nodes: BTreeMap<NodeId, TreeNode>,
    root: Option<NodeId>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a single-node tree, returning it with the root id.
    pub fn with_root(data: NodeData) -> (Self, NodeId) {
        let mut arena = Self::new();
        let id = arena.fresh_id();
        arena.nodes.insert(id.clone(), TreeNode::leaf(data, None));
        arena.root = Some(id.clone());
        (arena, id)
    }

    pub fn root(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node by id.
    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, id: &NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id)
    }

    /// Generate an id not used by any node of this tree.
    pub fn fresh_id(&self) -> NodeId {
        loop {
            let id = generate_id();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Attach a new leaf in the given slot of `parent`.
    #[instrument(level = "trace", skip(self, data))]
    pub fn attach_new(
        &mut self,
        parent: &NodeId,
        side: Side,
        data: NodeData,
    ) -> Result<NodeId, DomainError> {
        self.ensure_free(parent, side)?;
        self.ensure_depth(parent, 0)?;
        let id = self.fresh_id();
        self.nodes
            .insert(id.clone(), TreeNode::leaf(data, Some(parent.clone())));
        self.link(parent, side, &id);
        Ok(id)
    }

    /// Insert a node under a known id while building a tree from its serialized form.
    ///
    /// `parent == None` installs the root. Fails on duplicate ids and occupied slots.
    pub(crate) fn insert_with_id(
        &mut self,
        id: NodeId,
        data: NodeData,
        parent: Option<(&NodeId, Side)>,
    ) -> Result<(), DomainError> {
        if self.contains(&id) {
            return Err(DomainError::DuplicateId(id));
        }
        match parent {
            Some((parent_id, side)) => {
                self.ensure_free(parent_id, side)?;
                self.ensure_depth(parent_id, 0)?;
                self.nodes
                    .insert(id.clone(), TreeNode::leaf(data, Some(parent_id.clone())));
                self.link(parent_id, side, &id);
            }
            None => {
                if self.root.is_some() {
                    return Err(DomainError::InvalidStructure(
                        "tree already has a root".to_string(),
                    ));
                }
                self.nodes.insert(id.clone(), TreeNode::leaf(data, None));
                self.root = Some(id);
            }
        }
        Ok(())
    }

    fn ensure_free(&self, parent: &NodeId, side: Side) -> Result<(), DomainError> {
        let node = self
            .find(parent)
            .ok_or_else(|| DomainError::NodeNotFound(parent.clone()))?;
        if node.child(side).is_some() {
            return Err(DomainError::SlotOccupied {
                parent: parent.clone(),
                side,
            });
        }
        Ok(())
    }

    /// A subtree of `height` below a child slot of `parent` must stay within `MAX_DEPTH`.
    fn ensure_depth(&self, parent: &NodeId, height: usize) -> Result<(), DomainError> {
        let deepest = self.depth_of(parent).map_or(0, |depth| depth + 1 + height);
        if deepest > MAX_DEPTH {
            return Err(DomainError::TooDeep { max: MAX_DEPTH });
        }
        Ok(())
    }

    fn link(&mut self, parent: &NodeId, side: Side, child: &NodeId) {
        if let Some(p) = self.nodes.get_mut(parent) {
            *p.slot_mut(side) = Some(child.clone());
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent.clone());
        }
    }

    /// Depth of `id` (root = 0), None for unknown ids.
    pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.find(id)?;
        while let Some(parent) = &current.parent {
            current = self.find(parent)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Parent id and slot holding `id`, None for the root or unknown ids.
    pub fn position_of(&self, id: &NodeId) -> Option<(&NodeId, Side)> {
        let parent_id = self.find(id)?.parent.as_ref()?;
        let parent = self.find(parent_id)?;
        if parent.left.as_ref() == Some(id) {
            Some((parent_id, Side::Left))
        } else if parent.right.as_ref() == Some(id) {
            Some((parent_id, Side::Right))
        } else {
            None
        }
    }

    /// Detach the subtree rooted at `id` and return it as its own arena.
    ///
    /// The root cannot be detached; unknown ids and the root yield None.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, id: &NodeId) -> Option<TreeArena> {
        let (parent_id, side) = self
            .position_of(id)
            .map(|(p, side)| (p.clone(), side))?;
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            *parent.slot_mut(side) = None;
        }

        let mut subtree = TreeArena::new();
        for node_id in self.subtree_ids(id) {
            if let Some(node) = self.nodes.remove(&node_id) {
                subtree.nodes.insert(node_id, node);
            }
        }
        if let Some(top) = subtree.nodes.get_mut(id) {
            top.parent = None;
        }
        subtree.root = Some(id.clone());
        Some(subtree)
    }

    /// Delete the subtree rooted at `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &NodeId) -> bool {
        self.detach(id).is_some()
    }

    /// Attach a detached subtree in the given slot of `parent`.
    ///
    /// Fails without change if the slot is taken, ids would collide or the
    /// result would be deeper than `MAX_DEPTH`.
    #[instrument(level = "trace", skip(self, subtree))]
    pub fn graft(
        &mut self,
        parent: &NodeId,
        side: Side,
        subtree: TreeArena,
    ) -> Result<(), DomainError> {
        self.ensure_free(parent, side)?;
        self.ensure_depth(parent, subtree.max_depth().unwrap_or(0))?;
        let Some(top) = subtree.root.clone() else {
            return Ok(());
        };
        if let Some(dup) = subtree.nodes.keys().find(|id| self.contains(id)) {
            return Err(DomainError::DuplicateId(dup.clone()));
        }
        self.nodes.extend(subtree.nodes);
        self.link(parent, side, &top);
        Ok(())
    }

    /// Whether `descendant` lies strictly below `ancestor`.
    #[instrument(level = "trace", skip(self))]
    pub fn is_descendant(&self, ancestor: &NodeId, descendant: &NodeId) -> bool {
        if !self.contains(ancestor) {
            return false;
        }
        let mut current = self.find(descendant).and_then(|n| n.parent.as_ref());
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.find(id).and_then(|n| n.parent.as_ref());
        }
        false
    }

    /// Ids of the subtree rooted at `id`, in pre-order.
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.find(current) {
                ids.push(current.clone());
                if let Some(right) = &node.right {
                    stack.push(right);
                }
                if let Some(left) = &node.left {
                    stack.push(left);
                }
            }
        }
        ids
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Depth of the deepest node (root = 0); None for an empty tree.
    pub fn max_depth(&self) -> Option<usize> {
        self.iter().map(|(_, _, depth)| depth).max()
    }

    /// Collects the ids of all leaf nodes, left to right.
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node, _)| node.is_leaf())
            .map(|(id, _, _)| id.clone())
            .collect()
    }

    #[instrument(level = "debug", skip(self))]
    pub fn stats(&self) -> Option<TreeStats> {
        Some(TreeStats {
            total_nodes: self.len(),
            max_depth: self.max_depth()?,
            leaf_nodes: self.leaf_nodes().len(),
        })
    }
}

/// Pre-order traversal, left subtree before right, yielding node depth.
pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(&'a NodeId, usize)>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, 0));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (&'a NodeId, &'a TreeNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, depth)) = self.stack.pop() {
            if let Some(node) = self.arena.find(current) {
                // Push right first so left is visited first
                if let Some(right) = &node.right {
                    self.stack.push((right, depth + 1));
                }
                if let Some(left) = &node.left {
                    self.stack.push((left, depth + 1));
                }
                return Some((current, node, depth));
            }
        }
        None
    }
}
