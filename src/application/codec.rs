//! JSON encoding of trees for export/import and the blob store

use thiserror::Error;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{into_arena, DomainError, TreeArena, WireNode};

/// Why an import was refused. State is untouched in both cases.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid tree structure ({reason})")]
    InvalidStructure { reason: String },

    #[error("Invalid JSON format: {0}")]
    InvalidSyntax(#[from] serde_json::Error),
}

/// Pretty-printed (two-space indent) document; `null` for an empty tree.
pub fn export_tree(tree: &TreeArena) -> ApplicationResult<String> {
    serde_json::to_string_pretty(&WireNode::from_arena(tree)).map_err(encode_err)
}

/// Compact form written to the blob store.
pub fn encode_tree(tree: &TreeArena) -> ApplicationResult<String> {
    serde_json::to_string(&WireNode::from_arena(tree)).map_err(encode_err)
}

/// Parse and validate a document.
///
/// Syntax errors are reported separately from structural ones; missing
/// `color`/`annotation` fields are filled with defaults.
pub fn parse_tree(text: &str) -> Result<TreeArena, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let root: Option<WireNode> =
        serde_json::from_value(value).map_err(|e| ImportError::InvalidStructure {
            reason: e.to_string(),
        })?;
    let tree = into_arena(root).map_err(structure_err)?;
    debug!(nodes = tree.len(), "parsed tree");
    Ok(tree)
}

fn structure_err(e: DomainError) -> ImportError {
    let reason = match e {
        DomainError::InvalidStructure(detail) => detail,
        other => other.to_string(),
    };
    ImportError::InvalidStructure { reason }
}

fn encode_err(e: serde_json::Error) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: "encode tree".to_string(),
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeData, NodeId, Side, DEFAULT_COLOR, MAX_DEPTH};

    #[test]
    fn given_empty_tree_when_exporting_then_null() {
        assert_eq!(export_tree(&TreeArena::new()).unwrap(), "null");
        assert!(parse_tree("null").unwrap().is_empty());
    }

    #[test]
    fn given_tree_when_exporting_then_fields_in_order_with_null_children() {
        let (tree, root) = TreeArena::with_root(NodeData::new("A"));
        let text = export_tree(&tree).unwrap();
        let expected = format!(
            "{{\n  \"id\": \"{root}\",\n  \"value\": \"A\",\n  \"left\": null,\n  \"right\": null,\n  \"color\": \"{DEFAULT_COLOR}\",\n  \"annotation\": \"\"\n}}"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn given_broken_json_when_parsing_then_syntax_error() {
        let err = parse_tree("{not json").unwrap_err();
        assert!(matches!(err, ImportError::InvalidSyntax(_)));
        assert!(err.to_string().starts_with("Invalid JSON format"));
    }

    #[test]
    fn given_missing_id_when_parsing_then_structure_error() {
        let err = parse_tree(r#"{"value": "A", "left": {"value": "B"}}"#).unwrap_err();
        assert!(matches!(err, ImportError::InvalidStructure { .. }));
        assert!(err.to_string().starts_with("Invalid tree structure"));
    }

    #[test]
    fn given_missing_value_when_parsing_then_reason_stated_once() {
        let err = parse_tree(r#"{"id": "a"}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid tree structure (every node needs an id and a value)"
        );
    }

    #[test]
    fn given_null_value_when_parsing_then_stored_as_empty_text() {
        let tree = parse_tree(r#"{"id": "a", "value": null, "left": null, "right": null}"#).unwrap();
        assert_eq!(tree.find(&NodeId::from("a")).unwrap().data.value, "");
    }

    #[test]
    fn given_document_deeper_than_max_depth_when_parsing_then_structure_error() {
        let mut text = String::from("null");
        for i in (0..=MAX_DEPTH + 1).rev() {
            text = format!(r#"{{"id": "n{i}", "value": "{i}", "left": {text}}}"#);
        }

        let err = parse_tree(&text).unwrap_err();

        assert!(matches!(err, ImportError::InvalidStructure { .. }));
        assert!(err.to_string().contains(&MAX_DEPTH.to_string()));
    }

    #[test]
    fn given_non_object_when_parsing_then_structure_error() {
        assert!(matches!(
            parse_tree("[1, 2]").unwrap_err(),
            ImportError::InvalidStructure { .. }
        ));
    }

    #[test]
    fn given_legacy_document_when_parsing_then_defaults_applied() {
        let tree = parse_tree(r#"{"id": "a", "value": "A", "right": {"id": "b", "value": 7}}"#).unwrap();
        let b = tree.find(&NodeId::from("b")).unwrap();
        assert_eq!(b.data.value, "7");
        assert_eq!(b.data.color, DEFAULT_COLOR);
        assert_eq!(tree.position_of(&NodeId::from("b")), Some((&NodeId::from("a"), Side::Right)));
    }
}
