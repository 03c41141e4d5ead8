//! Domain-level errors (no external dependencies)

use thiserror::Error;

use super::node::{NodeId, Side};

/// Domain errors represent rejected tree operations.
/// A rejected operation never changes state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("{side} slot of {parent} is already occupied")]
    SlotOccupied { parent: NodeId, side: Side },

    #[error("cannot move node {0} onto itself")]
    SelfMove(NodeId),

    #[error("cannot move {node} below its own descendant {target}")]
    CycleDetected { node: NodeId, target: NodeId },

    #[error("cannot move root node {0}")]
    RootMove(NodeId),

    #[error("tree would exceed the maximum depth of {max}")]
    TooDeep { max: usize },

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("invalid tree structure: {0}")]
    InvalidStructure(String),
}
