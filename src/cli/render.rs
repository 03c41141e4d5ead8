//! Tree rendering for the terminal

use colored::{ColoredString, Colorize};
use termtree::Tree;

use crate::domain::{NodeId, Side, TreeArena, TreeNode};

const EMPTY_SLOT: &str = "∅";

pub trait TreeDisplay {
    /// Terminal tree; `selection` is marked with `*`.
    fn to_tree_string(&self, selection: Option<&NodeId>) -> Tree<String>;
}

impl TreeDisplay for TreeArena {
    fn to_tree_string(&self, selection: Option<&NodeId>) -> Tree<String> {
        let Some(root_id) = self.root() else {
            return Tree::new("(empty tree)".to_string());
        };

        fn build(
            arena: &TreeArena,
            id: &NodeId,
            side: Option<Side>,
            sel: Option<&NodeId>,
        ) -> Tree<String> {
            let Some(node) = arena.find(id) else {
                return Tree::new(EMPTY_SLOT.to_string());
            };
            let mut tree = Tree::new(label(id, node, side, sel == Some(id)));
            // Only show an empty slot when its sibling is present, so sides stay readable
            if !node.is_leaf() {
                for child_side in [Side::Left, Side::Right] {
                    match node.child(child_side) {
                        Some(child) => tree.push(build(arena, child, Some(child_side), sel)),
                        None => tree.push(Tree::new(format!(
                            "{} {}",
                            side_marker(child_side),
                            EMPTY_SLOT
                        ))),
                    };
                }
            }
            tree
        }

        build(self, root_id, None, selection)
    }
}

fn side_marker(side: Side) -> &'static str {
    match side {
        Side::Left => "L:",
        Side::Right => "R:",
    }
}

fn label(id: &NodeId, node: &TreeNode, side: Option<Side>, selected: bool) -> String {
    let mut label = String::new();
    if let Some(side) = side {
        label.push_str(side_marker(side));
        label.push(' ');
    }
    label.push_str(&swatch(&node.data.color).to_string());
    label.push(' ');
    label.push_str(&format!("{} [{}]", node.data.value, id));
    if !node.data.annotation.is_empty() {
        label.push_str(&format!(" {}", format!("({})", node.data.annotation).dimmed()));
    }
    if selected {
        label.push_str(&format!(" {}", "*".yellow().bold()));
    }
    label
}

/// Colored bullet for `#rrggbb` colors, plain bullet otherwise.
fn swatch(color: &str) -> ColoredString {
    match parse_hex(color) {
        Some((r, g, b)) => "●".truecolor(r, g, b),
        None => "●".normal(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
