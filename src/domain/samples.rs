//! Canned demonstration trees

use std::fmt;
use std::str::FromStr;

use super::arena::TreeArena;
use super::node::{NodeData, NodeId, Side};

/// Available demonstration trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Root with two leaves
    Simple,
    /// Three levels of numbers
    Numbers,
    /// Four levels, unbalanced
    Complex,
}

impl SampleKind {
    pub const ALL: [SampleKind; 3] = [SampleKind::Simple, SampleKind::Numbers, SampleKind::Complex];

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleKind::Simple => "simple",
            SampleKind::Numbers => "numbers",
            SampleKind::Complex => "complex",
        }
    }

    /// Build the tree with freshly generated ids.
    pub fn build(&self) -> TreeArena {
        match self {
            SampleKind::Simple => simple(),
            SampleKind::Numbers => numbers(),
            SampleKind::Complex => complex(),
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown example '{s}', expected simple, numbers or complex"))
    }
}

fn node(value: &str, color: &str, annotation: &str) -> NodeData {
    NodeData::new(value)
        .with_color(color)
        .with_annotation(annotation)
}

/// Attach a child; sample shapes are fixed, so slots are always free.
fn add(tree: &mut TreeArena, parent: &NodeId, side: Side, data: NodeData) -> NodeId {
    match tree.attach_new(parent, side, data) {
        Ok(id) => id,
        Err(e) => unreachable!("sample tree shape is fixed: {e}"),
    }
}

fn simple() -> TreeArena {
    let (mut tree, root) = TreeArena::with_root(node("A", "#ef4444", "Root"));
    add(&mut tree, &root, Side::Left, node("B", "#10b981", "Left child"));
    add(&mut tree, &root, Side::Right, node("C", "#3b82f6", "Right child"));
    tree
}

fn numbers() -> TreeArena {
    let (mut tree, root) = TreeArena::with_root(node("10", "#8b5cf6", "Root"));
    let five = add(&mut tree, &root, Side::Left, node("5", "#06b6d4", "Left subtree"));
    add(&mut tree, &five, Side::Left, node("2", "#84cc16", ""));
    add(&mut tree, &five, Side::Right, node("7", "#f59e0b", ""));
    let fifteen = add(&mut tree, &root, Side::Right, node("15", "#ec4899", "Right subtree"));
    add(&mut tree, &fifteen, Side::Right, node("20", "#ef4444", ""));
    tree
}

fn complex() -> TreeArena {
    let (mut tree, root) = TreeArena::with_root(node("Root", "#1f2937", "Main root"));

    let l1 = add(&mut tree, &root, Side::Left, node("L1", "#059669", "Left branch"));
    let l2 = add(&mut tree, &l1, Side::Left, node("L2", "#0284c7", ""));
    add(&mut tree, &l2, Side::Left, node("L3", "#7c3aed", "Deep left"));
    add(&mut tree, &l1, Side::Right, node("R2", "#dc2626", ""));

    let r1 = add(&mut tree, &root, Side::Right, node("R1", "#ea580c", "Right branch"));
    add(&mut tree, &r1, Side::Left, node("L2", "#65a30d", ""));
    let r2 = add(&mut tree, &r1, Side::Right, node("R2", "#db2777", ""));
    add(&mut tree, &r2, Side::Right, node("R3", "#0891b2", "Deep right"));
    tree
}
