//! Nested serialization shape of a tree
//!
//! This is the format written to the blob store and used for export/import:
//! every node carries `id`, `value`, `left`, `right`, `color`, `annotation`,
//! absent children are `null`. Fields are optional on input so that older
//! or hand-written documents can be validated and migrated instead of
//! being rejected by the parser.

use serde::{Deserialize, Deserializer, Serialize};

use super::arena::TreeArena;
use super::error::DomainError;
use super::node::{NodeData, NodeId, Side, DEFAULT_COLOR};

/// Scalar node value as found in serialized input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl WireValue {
    pub fn into_text(self) -> String {
        match self {
            WireValue::Text(s) => s,
            WireValue::Integer(i) => i.to_string(),
            WireValue::Float(f) => f.to_string(),
            WireValue::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    #[serde(default)]
    pub id: Option<String>,
    /// None if the key is absent, `Some(None)` for an explicit `null`
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Option<WireValue>>,
    #[serde(default)]
    pub left: Option<Box<WireNode>>,
    #[serde(default)]
    pub right: Option<Box<WireNode>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub annotation: Option<String>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl WireNode {
    /// Nested form of `arena`, None for an empty tree.
    pub fn from_arena(arena: &TreeArena) -> Option<WireNode> {
        arena.root().and_then(|root| Self::from_node(arena, root))
    }

    fn from_node(arena: &TreeArena, id: &NodeId) -> Option<WireNode> {
        let node = arena.find(id)?;
        Some(WireNode {
            id: Some(id.to_string()),
            value: Some(Some(WireValue::Text(node.data.value.clone()))),
            left: node
                .left
                .as_ref()
                .and_then(|l| Self::from_node(arena, l))
                .map(Box::new),
            right: node
                .right
                .as_ref()
                .and_then(|r| Self::from_node(arena, r))
                .map(Box::new),
            color: Some(node.data.color.clone()),
            annotation: Some(node.data.annotation.clone()),
        })
    }
}

/// Every node has a non-empty id and a `value` key. An empty subtree is valid.
pub fn validate_structure(node: Option<&WireNode>) -> bool {
    let Some(node) = node else {
        return true;
    };
    let has_id = node.id.as_deref().is_some_and(|id| !id.is_empty());
    if !has_id || node.value.is_none() {
        return false;
    }
    validate_structure(node.left.as_deref()) && validate_structure(node.right.as_deref())
}

/// Fill in `color` and `annotation` for documents written before they existed.
pub fn add_missing_properties(node: &mut WireNode) {
    if node.color.as_deref().map_or(true, str::is_empty) {
        node.color = Some(DEFAULT_COLOR.to_string());
    }
    if node.annotation.is_none() {
        node.annotation = Some(String::new());
    }
    if let Some(left) = node.left.as_deref_mut() {
        add_missing_properties(left);
    }
    if let Some(right) = node.right.as_deref_mut() {
        add_missing_properties(right);
    }
}

/// Build an arena from a nested document.
///
/// Validates the structure, migrates missing properties and rejects duplicate ids.
pub fn into_arena(root: Option<WireNode>) -> Result<TreeArena, DomainError> {
    let mut arena = TreeArena::new();
    let Some(mut root) = root else {
        return Ok(arena);
    };
    if !validate_structure(Some(&root)) {
        return Err(DomainError::InvalidStructure(
            "every node needs an id and a value".to_string(),
        ));
    }
    add_missing_properties(&mut root);

    let mut stack: Vec<(WireNode, Option<(NodeId, Side)>)> = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        let WireNode {
            id,
            value,
            left,
            right,
            color,
            annotation,
        } = node;
        let id = NodeId::new(id.unwrap_or_default());
        let data = NodeData {
            value: value.flatten().map(WireValue::into_text).unwrap_or_default(),
            color: color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            annotation: annotation.unwrap_or_default(),
        };
        arena.insert_with_id(id.clone(), data, parent.as_ref().map(|(p, s)| (p, *s)))?;

        if let Some(right) = right {
            stack.push((*right, Some((id.clone(), Side::Right))));
        }
        if let Some(left) = left {
            stack.push((*left, Some((id, Side::Left))));
        }
    }
    Ok(arena)
}
