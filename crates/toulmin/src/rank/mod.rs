//! Layer assignment.
//!
//! Conjunct clusters and warrant structures are first merged into single
//! layer points, ranks are seeded by longest-path relaxation and refined by
//! the network simplex on a tight spanning tree, and the merged structures
//! are split back out with their half-rank placement. The result is the
//! rank table plus `rank`/`y` scratch on every vertex.

pub mod feasible_tree;
pub mod merge;
pub mod network_simplex;

use crate::error::Result;
use crate::model::{EdgeLabel, LayoutGraph};
use crate::rank_table::RankTable;
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;
use toulmin_graphlib::{EdgeKey, GraphOptions};

pub fn assign_ranks(g: &mut LayoutGraph) -> Result<RankTable> {
    let merged = merge::merge_argument_structures(g);

    network_simplex::run(g)?;

    normalize_ranks(g);
    let pinned: HashSet<&str> = merged.warrants.iter().map(|w| w.meta.as_str()).collect();
    balance(g, &pinned);

    merge::split_conjuncts(g, &merged);
    merge::split_warrants(g, &merged);

    let ranksep = g.graph().ranksep;
    let mut table = RankTable::new();
    for id in g.node_ids() {
        let Some(node) = g.node_mut(&id) else {
            continue;
        };
        let Some(rank) = node.rank else {
            continue;
        };
        node.y = Some(rank * ranksep);
        table.set(id, rank);
    }
    Ok(table)
}

/// Seeds every vertex with a feasible integer rank: sources at zero, every
/// other vertex at the maximum of `rank(pred) + minlen` over its in-edges.
/// Vertices the relaxation never reaches (impossible on an acyclic working
/// graph) fall back to rank zero.
pub fn longest_path(g: &mut LayoutGraph) {
    let ids = g.node_ids();
    let mut indegree: HashMap<String, usize> = ids.iter().map(|id| (id.clone(), 0)).collect();
    for e in g.edges() {
        if let Some(d) = indegree.get_mut(&e.w) {
            *d += 1;
        }
    }

    let mut queue: VecDeque<String> = ids
        .iter()
        .filter(|id| indegree[id.as_str()] == 0)
        .cloned()
        .collect();
    let mut rank: HashMap<String, f64> = queue.iter().map(|v| (v.clone(), 0.0)).collect();

    while let Some(v) = queue.pop_front() {
        let v_rank = rank.get(&v).copied().unwrap_or(0.0);
        for e in g.out_edges(&v, None) {
            let minlen = g.edge_by_key(&e).map(|l| f64::from(l.minlen)).unwrap_or(1.0);
            let entry = rank.entry(e.w.clone()).or_insert(f64::NEG_INFINITY);
            if v_rank + minlen > *entry {
                *entry = v_rank + minlen;
            }
            if let Some(d) = indegree.get_mut(&e.w) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(e.w.clone());
                }
            }
        }
    }

    for id in ids {
        let r = rank.get(&id).copied().filter(|r| r.is_finite()).unwrap_or(0.0);
        if let Some(node) = g.node_mut(&id) {
            node.rank = Some(r);
        }
    }
}

/// Rank slack of a directed edge: how far it stretches past its minimum
/// length. Zero means tight.
pub(crate) fn slack(g: &LayoutGraph, e: &EdgeKey) -> f64 {
    let v_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0.0);
    let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0.0);
    let minlen = g.edge_by_key(e).map(|l| f64::from(l.minlen)).unwrap_or(1.0);
    w_rank - v_rank - minlen
}

/// Shifts all ranks so the minimum becomes zero.
pub fn normalize_ranks(g: &mut LayoutGraph) {
    let mut min = f64::INFINITY;
    for id in g.nodes() {
        if let Some(rank) = g.node(id).and_then(|n| n.rank) {
            min = min.min(rank);
        }
    }
    if !min.is_finite() || min == 0.0 {
        return;
    }
    for id in g.node_ids() {
        if let Some(node) = g.node_mut(&id) {
            if let Some(rank) = node.rank {
                node.rank = Some(rank - min);
            }
        }
    }
}

/// Cosmetic spread: a vertex with equal in- and out-degree moves to the
/// least-populated feasible rank strictly between its neighbors. Runs before
/// warrant splitting so only integer ranks participate. `pinned` vertices
/// (warrant meta vertices, which must stay on their targeted edge's source
/// rank for the half-rank placement to hold) never move.
pub fn balance(g: &mut LayoutGraph, pinned: &HashSet<&str>) {
    let mut population: HashMap<i64, usize> = HashMap::default();
    for id in g.nodes() {
        if let Some(rank) = g.node(id).and_then(|n| n.rank) {
            *population.entry(rank.round() as i64).or_insert(0) += 1;
        }
    }

    for id in g.node_ids() {
        if pinned.contains(id.as_str()) {
            continue;
        }
        let in_edges = g.in_edges(&id, None);
        let out_edges = g.out_edges(&id, None);
        if in_edges.is_empty() || in_edges.len() != out_edges.len() {
            continue;
        }
        let Some(current) = g.node(&id).and_then(|n| n.rank) else {
            continue;
        };

        let mut lo = f64::NEG_INFINITY;
        for e in &in_edges {
            let u_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0.0);
            let minlen = g.edge_by_key(e).map(|l| f64::from(l.minlen)).unwrap_or(1.0);
            lo = lo.max(u_rank + minlen);
        }
        let mut hi = f64::INFINITY;
        for e in &out_edges {
            let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0.0);
            let minlen = g.edge_by_key(e).map(|l| f64::from(l.minlen)).unwrap_or(1.0);
            hi = hi.min(w_rank - minlen);
        }
        if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
            continue;
        }

        let mut best = current.round() as i64;
        let mut best_count = population.get(&best).copied().unwrap_or(0);
        let mut r = lo.round() as i64;
        while r <= hi.round() as i64 {
            let count = population.get(&r).copied().unwrap_or(0);
            if count < best_count {
                best = r;
                best_count = count;
            }
            r += 1;
        }

        let current_key = current.round() as i64;
        if best != current_key {
            if let Some(c) = population.get_mut(&current_key) {
                *c -= 1;
            }
            *population.entry(best).or_insert(0) += 1;
            if let Some(node) = g.node_mut(&id) {
                node.rank = Some(best as f64);
            }
        }
    }
}

/// Non-compound simple view for ranking: parallel edges collapse into one
/// with summed weight and the largest minimum length, first-occurrence
/// insertion order preserved.
pub(crate) fn simplify(g: &LayoutGraph) -> LayoutGraph {
    let mut simplified = LayoutGraph::new(GraphOptions {
        directed: true,
        multigraph: false,
        compound: false,
    });
    simplified.set_graph(g.graph().clone());

    for id in g.nodes() {
        if let Some(label) = g.node(id) {
            simplified.set_node(id, label.clone());
        }
    }

    let mut merged: HashMap<(String, String), (f64, i32)> = HashMap::default();
    let mut order: Vec<(String, String)> = Vec::new();
    for e in g.edges() {
        let label = g.edge_by_key(e).cloned().unwrap_or_default();
        let key = (e.v.clone(), e.w.clone());
        match merged.get_mut(&key) {
            Some(entry) => {
                entry.0 += label.weight;
                entry.1 = entry.1.max(label.minlen);
            }
            None => {
                merged.insert(key.clone(), (label.weight, label.minlen));
                order.push(key);
            }
        }
    }
    for (v, w) in order {
        let (weight, minlen) = merged[&(v.clone(), w.clone())];
        simplified.set_edge_with_label(
            v,
            w,
            EdgeLabel {
                weight,
                minlen,
                ..Default::default()
            },
        );
    }
    simplified
}
