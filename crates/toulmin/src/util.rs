//! Shared helpers for the layout phases.

use crate::model::{LayoutGraph, NodeLabel};

/// Inserts a vertex under `prefix`, probing numeric suffixes on collision.
/// Returns the identifier actually used.
pub fn add_dummy_node(g: &mut LayoutGraph, label: NodeLabel, prefix: &str) -> String {
    if !g.has_node(prefix) {
        g.set_node(prefix, label);
        return prefix.to_string();
    }
    for i in 1usize.. {
        let id = format!("{prefix}{i}");
        if !g.has_node(&id) {
            g.set_node(&id, label);
            return id;
        }
    }
    unreachable!()
}

/// Writes `order` scratch fields from a layer matrix.
pub fn assign_order(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    for row in layering {
        for (i, v) in row.iter().enumerate() {
            if let Some(node) = g.node_mut(v) {
                node.order = Some(i);
            }
        }
    }
}
