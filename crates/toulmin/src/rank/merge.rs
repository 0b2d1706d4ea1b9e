//! Pre-ranking merge and post-ranking split of argument-map structures.
//!
//! Conjunct clusters must occupy a single layer point, so their premises are
//! folded into the container before ranking. A warrant hangs off another
//! edge; its source and sink fold into one meta vertex spliced into the
//! targeted edge with zero-length ties, which parks the meta vertex on the
//! targeted edge's source rank. After ranking the structures are restored:
//! premises take the container's rank, warrant sources and sinks move half a
//! rank down, and the targeted edge's head (with everything below it) shifts
//! one rank to open the gap the warrant sits in.

use crate::model::{EdgeLabel, LayoutGraph, NodeLabel};
use crate::util::add_dummy_node;
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;
use toulmin_graphlib::EdgeKey;

#[derive(Debug, Clone, Default)]
pub struct MergedStructures {
    pub conjuncts: Vec<MergedConjunct>,
    pub warrants: Vec<MergedWarrant>,
}

#[derive(Debug, Clone)]
pub struct MergedConjunct {
    pub container: String,
    pub children: Vec<(String, NodeLabel)>,
    /// Original edges incident to the children.
    pub stashed_edges: Vec<(EdgeKey, EdgeLabel)>,
    /// Redirected stand-ins added to the container for the merge.
    pub synthetic: Vec<EdgeKey>,
}

#[derive(Debug, Clone)]
pub struct MergedWarrant {
    pub meta: String,
    pub sink: (String, NodeLabel),
    pub sources: Vec<(String, NodeLabel)>,
    /// Warrant edges plus the sources' other incident edges.
    pub stashed_edges: Vec<(EdgeKey, EdgeLabel)>,
    /// The targeted inference, removed for the duration of ranking.
    pub target_edge: (EdgeKey, EdgeLabel),
    pub synthetic: Vec<EdgeKey>,
}

pub fn merge_argument_structures(g: &mut LayoutGraph) -> MergedStructures {
    let mut merged = MergedStructures::default();
    merge_conjuncts(g, &mut merged);
    merge_warrants(g, &mut merged);
    merged
}

fn merge_conjuncts(g: &mut LayoutGraph, merged: &mut MergedStructures) {
    let containers: Vec<String> = g
        .node_ids()
        .into_iter()
        .filter(|id| g.node(id).is_some_and(|n| n.conjunct) && !g.children(id).is_empty())
        .collect();

    for container in containers {
        let child_ids: Vec<String> = g.children(&container).to_vec();
        let child_set: HashSet<&str> = child_ids.iter().map(|s| s.as_str()).collect();

        let mut incident: Vec<(EdgeKey, EdgeLabel)> = Vec::new();
        let mut seen: HashSet<EdgeKey> = HashSet::default();
        for child in &child_ids {
            for key in g.node_edges(child) {
                if !seen.insert(key.clone()) {
                    continue;
                }
                if let Some(label) = g.edge_by_key(&key) {
                    incident.push((key, label.clone()));
                }
            }
        }
        let stashed: Vec<(EdgeKey, EdgeLabel)> = incident
            .iter()
            .filter(|(_, l)| !l.synthetic)
            .cloned()
            .collect();

        let mut children: Vec<(String, NodeLabel)> = Vec::new();
        for child in &child_ids {
            if let Some(label) = g.node(child).cloned() {
                children.push((child.clone(), label));
            }
            g.remove_node(child);
        }

        let mut synthetic: Vec<EdgeKey> = Vec::new();
        for (i, (key, label)) in incident.iter().enumerate() {
            let v = if child_set.contains(key.v.as_str()) {
                container.as_str()
            } else {
                key.v.as_str()
            };
            let w = if child_set.contains(key.w.as_str()) {
                container.as_str()
            } else {
                key.w.as_str()
            };
            if v == w {
                continue;
            }
            let name = format!("_cm{i}");
            let stand_in = EdgeKey::new(v, w, Some(name.clone()));
            g.set_edge_named(
                v.to_string(),
                w.to_string(),
                Some(name),
                Some(EdgeLabel {
                    weight: label.weight,
                    minlen: label.minlen,
                    synthetic: true,
                    ..Default::default()
                }),
            );
            synthetic.push(stand_in);
        }

        merged.conjuncts.push(MergedConjunct {
            container,
            children,
            stashed_edges: stashed,
            synthetic,
        });
    }
}

fn merge_warrants(g: &mut LayoutGraph, merged: &mut MergedStructures) {
    let sinks: Vec<String> = g
        .node_ids()
        .into_iter()
        .filter(|id| g.node(id).is_some_and(|n| n.warrant_sink))
        .collect();

    for sink_id in sinks {
        let Some(target_key) = g.node(&sink_id).and_then(|n| n.edge_obj.clone()) else {
            continue;
        };
        // The targeted edge can be gone (removed or reversed by cycle
        // breaking) or owned by a merged cluster; such warrants stay inert
        // and the sink ranks as an ordinary vertex.
        let Some(target_label) = g.edge_by_key(&target_key).cloned() else {
            continue;
        };

        let source_ids: Vec<String> = {
            let mut out: Vec<String> = Vec::new();
            for s in g.predecessors(&sink_id) {
                if !out.iter().any(|x| x == s) {
                    out.push(s.to_string());
                }
            }
            out
        };
        if source_ids.is_empty()
            || source_ids
                .iter()
                .any(|s| g.node(s).is_some_and(|n| n.conjunct))
        {
            continue;
        }

        let mut incident: Vec<(EdgeKey, EdgeLabel)> = Vec::new();
        let mut seen: HashSet<EdgeKey> = HashSet::default();
        for s in &source_ids {
            for key in g.node_edges(s) {
                if !seen.insert(key.clone()) {
                    continue;
                }
                if let Some(label) = g.edge_by_key(&key) {
                    incident.push((key, label.clone()));
                }
            }
        }
        let stashed: Vec<(EdgeKey, EdgeLabel)> = incident
            .iter()
            .filter(|(_, l)| !l.synthetic)
            .cloned()
            .collect();

        let sink_label = g.node(&sink_id).cloned().unwrap_or_default();
        let mut sources: Vec<(String, NodeLabel)> = Vec::new();
        for s in &source_ids {
            if let Some(label) = g.node(s).cloned() {
                sources.push((s.clone(), label));
            }
        }

        g.remove_node(&sink_id);
        for s in &source_ids {
            g.remove_node(s);
        }
        g.remove_edge_key(&target_key);

        let meta = add_dummy_node(g, NodeLabel::default(), "_warrant");
        let source_set: HashSet<&str> = source_ids.iter().map(|s| s.as_str()).collect();

        let mut synthetic: Vec<EdgeKey> = Vec::new();
        for (i, (key, label)) in incident.iter().enumerate() {
            let endpoint_is_merged =
                |id: &str| source_set.contains(id) || id == sink_id.as_str();
            let v = if endpoint_is_merged(&key.v) {
                meta.as_str()
            } else {
                key.v.as_str()
            };
            let w = if endpoint_is_merged(&key.w) {
                meta.as_str()
            } else {
                key.w.as_str()
            };
            if v == w {
                continue;
            }
            let name = format!("_wm{i}");
            let stand_in = EdgeKey::new(v, w, Some(name.clone()));
            g.set_edge_named(
                v.to_string(),
                w.to_string(),
                Some(name),
                Some(EdgeLabel {
                    weight: label.weight,
                    minlen: label.minlen,
                    synthetic: true,
                    ..Default::default()
                }),
            );
            synthetic.push(stand_in);
        }

        // Zero-length ties park the meta vertex on the targeted edge's
        // source rank while keeping head and tail connected.
        for (v, w, name) in [
            (target_key.v.clone(), meta.clone(), "_wt0"),
            (meta.clone(), target_key.w.clone(), "_wt1"),
        ] {
            let stand_in = EdgeKey::new(v.clone(), w.clone(), Some(name.to_string()));
            g.set_edge_named(
                v,
                w,
                Some(name.to_string()),
                Some(EdgeLabel {
                    weight: target_label.weight,
                    minlen: 0,
                    synthetic: true,
                    ..Default::default()
                }),
            );
            synthetic.push(stand_in);
        }

        merged.warrants.push(MergedWarrant {
            meta,
            sink: (sink_id, sink_label),
            sources,
            stashed_edges: stashed,
            target_edge: (target_key, target_label),
            synthetic,
        });
    }
}

/// Restores conjunct premises at their container's rank. The container keeps
/// only its single edge to the shared conclusion.
pub fn split_conjuncts(g: &mut LayoutGraph, merged: &MergedStructures) {
    for mc in &merged.conjuncts {
        let rank = g.node(&mc.container).and_then(|n| n.rank);
        for key in &mc.synthetic {
            g.remove_edge_key(key);
        }
        for (id, label) in &mc.children {
            let mut label = label.clone();
            label.rank = rank;
            g.set_node(id.clone(), label);
            // The container exists and is not its own descendant.
            let _ = g.set_parent(id.clone(), mc.container.clone());
        }
        for (key, label) in &mc.stashed_edges {
            g.set_edge_key(key.clone(), label.clone());
        }
    }
}

/// Restores warrant structures: sources and sink move half a rank below the
/// targeted edge's tail, and the targeted edge's head (plus everything
/// reachable below it) shifts one rank down to make room.
pub fn split_warrants(g: &mut LayoutGraph, merged: &MergedStructures) {
    for mw in &merged.warrants {
        let meta_rank = g.node(&mw.meta).and_then(|n| n.rank).unwrap_or(0.0);
        g.remove_node(&mw.meta);

        let half_rank = meta_rank + 0.5;
        let (sink_id, sink_label) = &mw.sink;
        let mut label = sink_label.clone();
        label.rank = Some(half_rank);
        g.set_node(sink_id.clone(), label);

        for (id, source_label) in &mw.sources {
            let mut label = source_label.clone();
            label.rank = Some(half_rank);
            g.set_node(id.clone(), label);
        }

        let (target_key, target_label) = &mw.target_edge;
        g.set_edge_key(target_key.clone(), target_label.clone());
        for (key, edge_label) in &mw.stashed_edges {
            g.set_edge_key(key.clone(), edge_label.clone());
        }

        let mut protected: HashSet<&str> = HashSet::default();
        protected.insert(sink_id.as_str());
        for (id, _) in &mw.sources {
            protected.insert(id.as_str());
        }
        push_down(g, &target_key.w, &protected);
    }
}

/// Adds one rank to `start` and every vertex reachable below it, following
/// out-edges and compound children.
fn push_down(g: &mut LayoutGraph, start: &str, protected: &HashSet<&str>) {
    let mut visited: HashSet<String> = HashSet::default();
    let mut queue: VecDeque<String> = VecDeque::new();
    visited.insert(start.to_string());
    queue.push_back(start.to_string());

    while let Some(v) = queue.pop_front() {
        if !protected.contains(v.as_str()) {
            if let Some(node) = g.node_mut(&v) {
                if let Some(rank) = node.rank {
                    node.rank = Some(rank + 1.0);
                }
            }
        }
        let mut next: Vec<String> = g.successors(&v).into_iter().map(|s| s.to_string()).collect();
        next.extend(g.children(&v).iter().cloned());
        for w in next {
            if visited.insert(w.clone()) {
                queue.push_back(w);
            }
        }
    }
}
