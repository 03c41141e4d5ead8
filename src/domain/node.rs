//! Node identity and payload

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Color assigned to nodes that do not carry one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// Opaque, stable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Child slot of a binary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a side name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideParseError(pub String);

impl fmt::Display for SideParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid side '{}', expected 'left' or 'right'", self.0)
    }
}

impl std::error::Error for SideParseError {}

impl FromStr for Side {
    type Err = SideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Side::Left),
            "right" | "r" => Ok(Side::Right),
            _ => Err(SideParseError(s.to_string())),
        }
    }
}

/// User-facing payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub value: String,
    pub color: String,
    pub annotation: String,
}

impl NodeData {
    /// Payload for a freshly created node: default color, no annotation.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            color: DEFAULT_COLOR.to_string(),
            annotation: String::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
