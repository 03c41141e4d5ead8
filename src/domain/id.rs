//! Node id generation

use uuid::Uuid;

use super::node::NodeId;

const ID_LEN: usize = 9;

/// Generate a short opaque node id, e.g. `_3f9a0c1b2`.
///
/// Unique with overwhelming probability within a session. Callers that
/// need a hard guarantee check against existing ids (see `TreeArena::fresh_id`).
pub fn generate_id() -> NodeId {
    let raw = Uuid::new_v4().simple().to_string();
    NodeId::new(format!("_{}", &raw[..ID_LEN]))
}
