//! Cycle removal via a greedy feedback arc set.
//!
//! Eades-Lin-Smyth: peel sinks and sources off a structural copy, breaking
//! deadlocks with the vertex of maximum out-degree minus in-degree; the
//! resulting linear order marks every backward edge as feedback. Feedback
//! edges are reversed in place (labels preserved); self-loops are deleted
//! outright. Both sets are reported so routing can restore them.

use crate::model::{EdgeLabel, LayoutGraph};
use rustc_hash::FxHashMap as HashMap;
use toulmin_graphlib::{EdgeKey, Graph};

#[derive(Debug, Clone, Default)]
pub struct RemovedEdges {
    /// Self-loops deleted from the working graph, with their labels.
    pub loops: Vec<(EdgeKey, EdgeLabel)>,
    /// Feedback edges, recorded in their original orientation.
    pub reversed: Vec<(EdgeKey, EdgeLabel)>,
}

pub fn remove_cycles(g: &mut LayoutGraph) -> RemovedEdges {
    let mut removed = RemovedEdges::default();

    for key in g.edge_keys() {
        if key.v == key.w {
            if let Some(label) = g.remove_edge_key(&key) {
                removed.loops.push((key, label));
            }
        }
    }

    let sigma = peel_order(g);
    for key in g.edge_keys() {
        let (Some(&sv), Some(&sw)) = (sigma.get(&key.v), sigma.get(&key.w)) else {
            continue;
        };
        if sv <= sw {
            continue;
        }
        let Some(original) = g.remove_edge_key(&key) else {
            continue;
        };

        let mut label = original.clone();
        label.reversed = true;
        label.forward_name = key.name.clone();
        let name = unique_rev_name(g, &key.w, &key.v);
        g.set_edge_named(key.w.clone(), key.v.clone(), Some(name), Some(label));

        removed.reversed.push((key, original));
    }

    removed
}

/// Restores the edges removed by [`remove_cycles`]: every reversed edge is
/// flipped back (its computed points reversed so the first point sits at the
/// true source), and deleted self-loops are re-inserted.
pub fn undo(g: &mut LayoutGraph, removed: &RemovedEdges) {
    for key in g.edge_keys() {
        if !g.edge_by_key(&key).is_some_and(|l| l.reversed) {
            continue;
        }
        let Some(mut label) = g.remove_edge_key(&key) else {
            continue;
        };
        let forward_name = label.forward_name.take();
        label.reversed = false;
        label.points.reverse();
        g.set_edge_named(key.w.clone(), key.v.clone(), forward_name, Some(label));
    }

    for (key, label) in &removed.loops {
        g.set_edge_named(
            key.v.clone(),
            key.w.clone(),
            key.name.clone(),
            Some(label.clone()),
        );
    }
}

/// Linear vertex order: peeled sources and deadlock picks first, peeled
/// sinks last (in reverse peel order). Ties everywhere follow vertex
/// insertion order.
fn peel_order(g: &LayoutGraph) -> HashMap<String, usize> {
    let copy: Graph<(), (), ()> = g.copy_structure();
    let ids = copy.node_ids();
    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let n = ids.len();
    let mut outs: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ins: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut outdeg: Vec<i64> = vec![0; n];
    let mut indeg: Vec<i64> = vec![0; n];
    for e in copy.edges() {
        if e.v == e.w {
            continue;
        }
        let (a, b) = (index[e.v.as_str()], index[e.w.as_str()]);
        outs[a].push(b);
        ins[b].push(a);
        outdeg[a] += 1;
        indeg[b] += 1;
    }

    let mut alive: Vec<bool> = vec![true; n];
    let mut remaining = n;
    let mut s0: Vec<usize> = Vec::new();
    let mut s1: Vec<usize> = Vec::new();

    fn peel(
        v: usize,
        alive: &mut [bool],
        outs: &[Vec<usize>],
        ins: &[Vec<usize>],
        outdeg: &mut [i64],
        indeg: &mut [i64],
    ) {
        alive[v] = false;
        for &w in &outs[v] {
            if alive[w] {
                indeg[w] -= 1;
            }
        }
        for &u in &ins[v] {
            if alive[u] {
                outdeg[u] -= 1;
            }
        }
    }

    while remaining > 0 {
        loop {
            let sinks: Vec<usize> = (0..n).filter(|&v| alive[v] && outdeg[v] == 0).collect();
            if sinks.is_empty() {
                break;
            }
            for v in sinks {
                s1.push(v);
                peel(v, &mut alive, &outs, &ins, &mut outdeg, &mut indeg);
                remaining -= 1;
            }
        }

        loop {
            let sources: Vec<usize> = (0..n).filter(|&v| alive[v] && indeg[v] == 0).collect();
            if sources.is_empty() {
                break;
            }
            for v in sources {
                s0.push(v);
                peel(v, &mut alive, &outs, &ins, &mut outdeg, &mut indeg);
                remaining -= 1;
            }
        }

        if remaining == 0 {
            break;
        }

        let mut pick: Option<usize> = None;
        for v in (0..n).filter(|&v| alive[v]) {
            // Strict comparison keeps the first maximum in insertion order.
            if pick.is_none_or(|p| outdeg[v] - indeg[v] > outdeg[p] - indeg[p]) {
                pick = Some(v);
            }
        }
        if let Some(v) = pick {
            s0.push(v);
            peel(v, &mut alive, &outs, &ins, &mut outdeg, &mut indeg);
            remaining -= 1;
        }
    }

    let mut sigma: HashMap<String, usize> = HashMap::default();
    for (i, &v) in s0.iter().chain(s1.iter().rev()).enumerate() {
        sigma.insert(ids[v].clone(), i);
    }
    sigma
}

fn unique_rev_name(g: &LayoutGraph, v: &str, w: &str) -> String {
    for i in 1usize.. {
        let candidate = format!("rev{i}");
        if !g.has_edge(v, w, Some(&candidate)) {
            return candidate;
        }
    }
    unreachable!()
}
