//! Tight spanning tree construction.
//!
//! A tree edge is tight when its endpoints' rank difference equals its
//! minimum length. Starting from an arbitrary vertex, the tree grows along
//! tight edges; whenever it stalls, the minimum-slack edge touching the tree
//! is made tight by shifting every tree rank, and growth resumes. On
//! disconnected graphs each stranded component gets a fresh root, producing
//! a spanning forest.

use super::slack;
use crate::model::LayoutGraph;
use toulmin_graphlib::{EdgeKey, Graph, GraphOptions};

/// Spanning tree vertex: postorder number, smallest number in the subtree,
/// and the tree parent. `min_subtree(u) <= number(v) <= number(u)` is the
/// constant-time subtree membership test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    pub number: usize,
    pub min_subtree: usize,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeEdge {
    pub cut_value: f64,
}

pub type Tree = Graph<TreeNode, TreeEdge, ()>;

pub fn feasible_tree(g: &mut LayoutGraph) -> Tree {
    let mut t: Tree = Graph::new(GraphOptions {
        directed: false,
        multigraph: false,
        compound: false,
    });
    let Some(start) = g.nodes().next().map(str::to_string) else {
        return t;
    };
    t.set_node(start, TreeNode::default());

    let size = g.node_count();
    while tight_tree(&mut t, g) < size {
        match find_min_slack_edge(g, &t) {
            Some(e) => {
                let delta = if t.has_node(&e.v) {
                    slack(g, &e)
                } else {
                    -slack(g, &e)
                };
                for v in t.node_ids() {
                    if let Some(node) = g.node_mut(&v) {
                        if let Some(rank) = node.rank {
                            node.rank = Some(rank + delta);
                        }
                    }
                }
            }
            None => {
                // No edge touches the tree: the remainder is a separate
                // component. Seed it with its own root.
                let Some(next) = g.nodes().find(|v| !t.has_node(v)).map(str::to_string) else {
                    break;
                };
                t.set_node(next, TreeNode::default());
            }
        }
    }
    t
}

/// Grows the tree along tight incident edges; returns the tree size.
fn tight_tree(t: &mut Tree, g: &LayoutGraph) -> usize {
    let mut stack: Vec<String> = t.node_ids();
    while let Some(v) = stack.pop() {
        for e in g.node_edges(&v) {
            let other = if e.v == v { e.w.clone() } else { e.v.clone() };
            if t.has_node(&other) || slack(g, &e) != 0.0 {
                continue;
            }
            t.set_node(other.clone(), TreeNode::default());
            t.set_edge(v.clone(), other.clone());
            stack.push(other);
        }
    }
    t.node_count()
}

/// Minimum-slack edge with exactly one endpoint in the tree; ties go to the
/// first such edge in insertion order.
fn find_min_slack_edge(g: &LayoutGraph, t: &Tree) -> Option<EdgeKey> {
    let mut best: Option<(f64, EdgeKey)> = None;
    for e in g.edges() {
        if t.has_node(&e.v) == t.has_node(&e.w) {
            continue;
        }
        let s = slack(g, e);
        if best.as_ref().is_none_or(|(b, _)| s < *b) {
            best = Some((s, e.clone()));
        }
    }
    best.map(|(_, e)| e)
}
