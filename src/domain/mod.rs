//! Domain layer: tree structure, transitions and history
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod history;
pub mod id;
pub mod node;
pub mod samples;
pub mod state;
pub mod wire;

pub use arena::{TreeArena, TreeIterator, TreeNode, TreeStats, MAX_DEPTH};
pub use error::DomainError;
pub use history::{History, DEFAULT_MAX_HISTORY};
pub use id::generate_id;
pub use node::{NodeData, NodeId, Side, DEFAULT_COLOR};
pub use samples::SampleKind;
pub use state::{EditorState, Operation};
pub use wire::{add_missing_properties, into_arena, validate_structure, WireNode, WireValue};
