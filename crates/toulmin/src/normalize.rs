//! Long-edge splitting and chain collapse.
//!
//! Between crossing minimization and routing, every edge must connect
//! consecutive layer rows. Edges spanning further are replaced by chains of
//! zero-extent dummy vertices, one per row the edge passes: every integer
//! rank strictly between the endpoints, plus every occupied half-rank row in
//! between (a warrant's row would otherwise hide the edge from the
//! adjacent-row crossing and alignment passes). The chain start remembers
//! the original edge so [`undo`] can collapse the chain back into it.

use crate::model::{DummyKind, EdgeLabel, LayoutGraph, NodeLabel};
use crate::rank_table::Key;
use crate::util::add_dummy_node;
use std::collections::BTreeSet;

pub fn run(g: &mut LayoutGraph) {
    g.graph_mut().dummy_chains.clear();

    let mut half_rows: BTreeSet<i32> = BTreeSet::new();
    for id in g.node_ids() {
        if let Some(rank) = g.node(&id).and_then(|n| n.rank) {
            let key = Key::from_rank(rank).0;
            if key % 2 != 0 {
                half_rows.insert(key);
            }
        }
    }

    for key in g.edge_keys() {
        split_edge(g, key, &half_rows);
    }
}

fn split_edge(g: &mut LayoutGraph, key: toulmin_graphlib::EdgeKey, half_rows: &BTreeSet<i32>) {
    let Some(v_rank) = g.node(&key.v).and_then(|n| n.rank) else {
        return;
    };
    let Some(w_rank) = g.node(&key.w).and_then(|n| n.rank) else {
        return;
    };

    // Rows strictly between the endpoints, in half-units: integer ranks
    // always, half ranks only where a row exists.
    let vk = Key::from_rank(v_rank).0;
    let wk = Key::from_rank(w_rank).0;
    if vk >= wk {
        return;
    }
    let mut stops: Vec<i32> = Vec::new();
    let mut k = if vk % 2 == 0 { vk + 2 } else { vk + 1 };
    while k < wk {
        stops.push(k);
        k += 2;
    }
    stops.extend(half_rows.range((vk + 1)..wk).copied());
    stops.sort_unstable();
    if stops.is_empty() {
        return;
    }

    let Some(mut edge_label) = g.edge_by_key(&key).cloned() else {
        return;
    };
    g.remove_edge_key(&key);
    edge_label.points.clear();

    let weight = edge_label.weight;
    let mut prev = key.v.clone();
    for (i, &stop) in stops.iter().enumerate() {
        let dummy = add_dummy_node(
            g,
            NodeLabel {
                rank: Some(Key(stop).rank()),
                dummy: Some(DummyKind::Edge),
                edge_label: Some(edge_label.clone()),
                edge_obj: Some(key.clone()),
                ..Default::default()
            },
            "_d",
        );
        if i == 0 {
            g.graph_mut().dummy_chains.push(dummy.clone());
        }
        g.set_edge_named(
            prev,
            dummy.clone(),
            key.name.clone(),
            Some(EdgeLabel {
                weight,
                ..Default::default()
            }),
        );
        prev = dummy;
    }
    g.set_edge_named(
        prev,
        key.w.clone(),
        key.name.clone(),
        Some(EdgeLabel {
            weight,
            ..Default::default()
        }),
    );
}

/// Collapses every dummy chain back into its original edge. The restored
/// edge keeps three control points: where the chain was entered, the first
/// sub-edge's bend, and where the chain left for the true target. Assumes
/// routing already gave each sub-edge its control points.
pub fn undo(g: &mut LayoutGraph) {
    let chains = std::mem::take(&mut g.graph_mut().dummy_chains);
    for start in chains {
        let Some(node) = g.node(&start) else {
            continue;
        };
        let Some(mut label) = node.edge_label.clone() else {
            continue;
        };
        let Some(edge_obj) = node.edge_obj.clone() else {
            continue;
        };

        let entering = g
            .in_edges(&start, None)
            .first()
            .and_then(|e| g.edge_by_key(e))
            .map(|l| l.points.clone())
            .unwrap_or_default();

        // Walk to the end of the chain, removing dummies as we go.
        let mut v = start;
        let mut leaving: Vec<crate::model::Point> = Vec::new();
        while g.node(&v).is_some_and(|n| n.dummy == Some(DummyKind::Edge)) {
            let out = g.out_edges(&v, None).into_iter().next();
            let next = out.as_ref().map(|e| e.w.clone());
            if let Some(points) = out.as_ref().and_then(|e| g.edge_by_key(e)) {
                leaving = points.points.clone();
            }
            g.remove_node(&v);
            match next {
                Some(next) => v = next,
                None => break,
            }
        }

        label.points.clear();
        if entering.len() == 3 && leaving.len() == 3 {
            label.points.push(entering[0]);
            label.points.push(entering[1]);
            label.points.push(leaving[2]);
        }
        g.set_edge_key(edge_obj, label);
    }
}
