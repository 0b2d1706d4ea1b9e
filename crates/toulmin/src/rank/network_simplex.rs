//! Network-simplex rank refinement.
//!
//! The tight spanning tree induces, per tree edge, a cut value: the signed
//! weight of graph edges crossing the partition the edge's removal creates.
//! While some tree edge has a negative cut value, swapping it for the
//! minimum-slack edge that re-crosses the cut strictly reduces weighted edge
//! length. Postorder numbering keeps the cut bookkeeping cheap, and updates
//! after a swap stay inside the entering edge's least-common-ancestor
//! subtree.

use super::feasible_tree::{feasible_tree, Tree};
use crate::error::{Error, Result};
use crate::model::LayoutGraph;
use rustc_hash::FxHashSet as HashSet;
use toulmin_graphlib::{alg, EdgeKey};

pub fn run(g: &mut LayoutGraph) -> Result<()> {
    let max_loops = g.graph().max_ranking_loops;

    let mut simplified = super::simplify(g);
    super::longest_path(&mut simplified);
    let mut t = feasible_tree(&mut simplified);
    init_numbering(&mut t, None);
    init_cut_values(&mut t, &simplified);

    let mut loops = 0usize;
    while let Some(e) = leave_edge(&t) {
        if loops >= max_loops {
            tracing::warn!(
                cap = max_loops,
                "rank refinement hit its iteration cap; keeping current ranks"
            );
            break;
        }
        let f = enter_edge(&t, &simplified, &e).ok_or_else(|| {
            Error::unreachable(format!("no entering edge for tree edge ({}, {})", e.v, e.w))
        })?;
        exchange_edges(&mut t, &mut simplified, &e, &f)?;
        loops += 1;
    }
    tracing::debug!(iterations = loops, "rank refinement finished");

    for id in g.node_ids() {
        if let Some(rank) = simplified.node(&id).and_then(|n| n.rank) {
            if let Some(node) = g.node_mut(&id) {
                node.rank = Some(rank);
            }
        }
    }
    Ok(())
}

/// Looks up a tree edge regardless of the order its endpoints were inserted.
fn tree_edge_cut(t: &Tree, a: &str, b: &str) -> Option<f64> {
    t.edge(a, b, None)
        .or_else(|| t.edge(b, a, None))
        .map(|e| e.cut_value)
}

fn set_tree_edge_cut(t: &mut Tree, a: &str, b: &str, cut_value: f64) {
    if let Some(edge) = t.edge_mut(a, b, None) {
        edge.cut_value = cut_value;
    } else if let Some(edge) = t.edge_mut(b, a, None) {
        edge.cut_value = cut_value;
    }
}

fn is_tree_edge(t: &Tree, a: &str, b: &str) -> bool {
    t.has_edge(a, b, None) || t.has_edge(b, a, None)
}

fn remove_tree_edge(t: &mut Tree, a: &str, b: &str) {
    if t.remove_edge(a, b, None).is_none() {
        t.remove_edge(b, a, None);
    }
}

/// Assigns postorder `number` / `min_subtree` / `parent` over the whole
/// forest, or over a single subtree when `root` is given (the root keeps its
/// current parent and the numbering restarts at `start`).
pub fn init_numbering(t: &mut Tree, root: Option<(&str, usize)>) {
    let mut visited: HashSet<String> = HashSet::default();
    match root {
        Some((root, start)) => {
            let parent = t.node(root).and_then(|n| n.parent.clone());
            if let Some(p) = &parent {
                visited.insert(p.clone());
            }
            let mut next = start;
            number_subtree(t, root, parent, &mut next, &mut visited);
        }
        None => {
            let mut next = 1usize;
            for r in t.node_ids() {
                if !visited.contains(&r) {
                    number_subtree(t, &r, None, &mut next, &mut visited);
                }
            }
        }
    }
}

fn number_subtree(
    t: &mut Tree,
    root: &str,
    root_parent: Option<String>,
    next: &mut usize,
    visited: &mut HashSet<String>,
) {
    enum Frame {
        Enter(String, Option<String>),
        Exit(String, usize),
    }

    let mut stack: Vec<Frame> = vec![Frame::Enter(root.to_string(), root_parent)];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(v, parent) => {
                if !visited.insert(v.clone()) {
                    continue;
                }
                stack.push(Frame::Exit(v.clone(), *next));
                let neighbors: Vec<String> =
                    t.neighbors(&v).into_iter().map(str::to_string).collect();
                if let Some(node) = t.node_mut(&v) {
                    node.parent = parent;
                }
                for w in neighbors.into_iter().rev() {
                    if !visited.contains(&w) {
                        stack.push(Frame::Enter(w, Some(v.clone())));
                    }
                }
            }
            Frame::Exit(v, low) => {
                if let Some(node) = t.node_mut(&v) {
                    node.min_subtree = low;
                    node.number = *next;
                }
                *next += 1;
            }
        }
    }
}

pub fn init_cut_values(t: &mut Tree, g: &LayoutGraph) {
    let roots: Vec<String> = t.node_ids();
    let root_refs: Vec<&str> = roots.iter().map(|s| s.as_str()).collect();
    for v in alg::postorder(t, &root_refs) {
        assign_cut_value(t, g, &v);
    }
}

fn assign_cut_value(t: &mut Tree, g: &LayoutGraph, child: &str) {
    let Some(parent) = t.node(child).and_then(|n| n.parent.clone()) else {
        return;
    };
    let cut_value = calc_cut_value(t, g, child, &parent);
    set_tree_edge_cut(t, child, &parent, cut_value);
}

/// Cut value of the tree edge between `child` and its parent, assuming the
/// cut values of `child`'s other tree edges are current.
fn calc_cut_value(t: &Tree, g: &LayoutGraph, child: &str, parent: &str) -> f64 {
    // Direction of the underlying graph edge decides which side is the tail
    // component.
    let child_is_tail = g.has_edge(child, parent, None);
    let base_weight = g
        .edge(child, parent, None)
        .or_else(|| g.edge(parent, child, None))
        .map(|l| l.weight)
        .unwrap_or(0.0);

    let mut cut_value = base_weight;
    for e in g.node_edges(child) {
        let outgoing = e.v == child;
        let other = if outgoing { e.w.as_str() } else { e.v.as_str() };
        if other == parent {
            continue;
        }
        let Some(label) = g.edge_by_key(&e) else {
            continue;
        };

        let points_to_head = outgoing == child_is_tail;
        cut_value += if points_to_head {
            label.weight
        } else {
            -label.weight
        };

        if is_tree_edge(t, child, other) {
            let other_cut = tree_edge_cut(t, child, other).unwrap_or(0.0);
            cut_value += if points_to_head { -other_cut } else { other_cut };
        }
    }
    cut_value
}

/// First tree edge with a negative cut value, if any.
pub fn leave_edge(t: &Tree) -> Option<EdgeKey> {
    t.edges()
        .find(|e| {
            t.edge_by_key(e)
                .map(|l| l.cut_value < 0.0)
                .unwrap_or(false)
        })
        .cloned()
}

/// Minimum-slack graph edge whose endpoints straddle the cut induced by
/// removing `edge`, oriented against it.
pub fn enter_edge(t: &Tree, g: &LayoutGraph, edge: &EdgeKey) -> Option<EdgeKey> {
    let (v, w) = if g.has_edge(&edge.v, &edge.w, None) {
        (edge.v.as_str(), edge.w.as_str())
    } else {
        (edge.w.as_str(), edge.v.as_str())
    };

    let v_label = t.node(v)?;
    let w_label = t.node(w)?;
    // The endpoint with the smaller postorder number roots the tail
    // component; `flip` records when that is the graph edge's head.
    let (tail_low, tail_lim, flip) = if v_label.number > w_label.number {
        (w_label.min_subtree, w_label.number, true)
    } else {
        (v_label.min_subtree, v_label.number, false)
    };

    let in_tail = |id: &str| -> Option<bool> {
        let n = t.node(id)?;
        Some(tail_low <= n.number && n.number <= tail_lim)
    };

    let mut best: Option<(f64, EdgeKey)> = None;
    for e in g.edges() {
        let (Some(v_desc), Some(w_desc)) = (in_tail(&e.v), in_tail(&e.w)) else {
            continue;
        };
        if v_desc == flip && w_desc != flip {
            let s = super::slack(g, e);
            if best.as_ref().is_none_or(|(b, _)| s < *b) {
                best = Some((s, e.clone()));
            }
        }
    }
    best.map(|(_, e)| e)
}

pub fn exchange_edges(t: &mut Tree, g: &mut LayoutGraph, e: &EdgeKey, f: &EdgeKey) -> Result<()> {
    // The common ancestor is found with the numbering of the old tree; its
    // parent chain is still intact because removing a tree edge does not
    // touch vertex labels.
    let ancestor = common_ancestor(t, &f.v, &f.w)?;

    remove_tree_edge(t, &e.v, &e.w);
    t.set_edge(f.v.clone(), f.w.clone());

    match ancestor {
        Some((root, start)) => {
            init_numbering(t, Some((root.as_str(), start)));
            recompute_subtree_cut_values(t, g, &root);
        }
        None => {
            init_numbering(t, None);
            init_cut_values(t, g);
        }
    }
    update_ranks(t, g);
    Ok(())
}

/// Least common ancestor of `a` and `b` in the current numbering, together
/// with its `min_subtree` (the starting number for renumbering). `None`
/// means the ancestor is a component root and the update must be global.
fn common_ancestor(t: &Tree, a: &str, b: &str) -> Result<Option<(String, usize)>> {
    let num = |id: &str| -> Result<usize> {
        t.node(id)
            .map(|n| n.number)
            .ok_or_else(|| Error::unreachable(format!("vertex {id} missing from spanning tree")))
    };
    let (a_num, b_num) = (num(a)?, num(b)?);
    let (lo, hi) = (a_num.min(b_num), a_num.max(b_num));

    let mut current = a.to_string();
    loop {
        let Some(node) = t.node(&current) else {
            return Err(Error::unreachable(format!(
                "vertex {current} missing from spanning tree"
            )));
        };
        if node.min_subtree <= lo && hi <= node.number {
            if node.parent.is_none() {
                return Ok(None);
            }
            return Ok(Some((current, node.min_subtree)));
        }
        match node.parent.clone() {
            Some(parent) => current = parent,
            None => return Ok(None),
        }
    }
}

/// Recomputes cut values for every tree edge strictly inside the subtree of
/// `root`; the edge above `root` separates the same components as before.
fn recompute_subtree_cut_values(t: &mut Tree, g: &LayoutGraph, root: &str) {
    let parent = t.node(root).and_then(|n| n.parent.clone());

    let mut order: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::default();
    if let Some(p) = &parent {
        visited.insert(p.clone());
    }
    let mut stack: Vec<(String, bool)> = vec![(root.to_string(), false)];
    while let Some((v, expanded)) = stack.pop() {
        if expanded {
            order.push(v);
            continue;
        }
        if !visited.insert(v.clone()) {
            continue;
        }
        stack.push((v.clone(), true));
        for w in t.neighbors(&v).into_iter().map(str::to_string) {
            if !visited.contains(&w) {
                stack.push((w, false));
            }
        }
    }

    for v in order {
        if v == root {
            continue;
        }
        assign_cut_value(t, g, &v);
    }
}

/// Refreshes every rank from the tree: preorder from each component root,
/// child rank = parent rank offset by the underlying edge's minimum length.
fn update_ranks(t: &Tree, g: &mut LayoutGraph) {
    let roots: Vec<String> = t
        .node_ids()
        .into_iter()
        .filter(|v| t.node(v).is_some_and(|n| n.parent.is_none()))
        .collect();
    let root_refs: Vec<&str> = roots.iter().map(|s| s.as_str()).collect();

    for v in alg::preorder(t, &root_refs) {
        let Some(parent) = t.node(&v).and_then(|n| n.parent.clone()) else {
            continue;
        };
        let (minlen, flipped) = match g.edge(&v, &parent, None) {
            Some(e) => (f64::from(e.minlen), false),
            None => match g.edge(&parent, &v, None) {
                Some(e) => (f64::from(e.minlen), true),
                None => continue,
            },
        };
        let Some(parent_rank) = g.node(&parent).and_then(|n| n.rank) else {
            continue;
        };
        let rank = if flipped {
            parent_rank + minlen
        } else {
            parent_rank - minlen
        };
        if let Some(node) = g.node_mut(&v) {
            node.rank = Some(rank);
        }
    }
}
