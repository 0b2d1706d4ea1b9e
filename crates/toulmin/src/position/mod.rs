//! Horizontal coordinate assignment.
//!
//! Conjunct clusters are re-merged into their containers so Brandes-Koepf
//! spaces each cluster as one wide vertex, conflicts are marked, and four
//! biased alignments (up/down x left/right) are balanced into the final x:
//! per vertex, the mean of the two middle candidates after the narrowest
//! assignment anchors the rest. Afterwards the clusters fan back out and
//! every vertex gets its rank's y.

pub mod bk;

use crate::model::{EdgeLabel, LayoutGraph, NodeLabel};
use crate::order::OrderArtifacts;
use rustc_hash::FxHashMap as HashMap;
use toulmin_graphlib::EdgeKey;

#[derive(Debug, Clone)]
struct ConjunctLayout {
    container: String,
    /// Children in their final left-to-right order.
    children: Vec<(String, NodeLabel)>,
    stashed_edges: Vec<(EdgeKey, EdgeLabel)>,
    synthetic: Vec<EdgeKey>,
}

pub fn run(g: &mut LayoutGraph, artifacts: &mut OrderArtifacts) {
    let layouts = remerge_conjuncts(g, artifacts);

    bk::mark_type1_conflicts(g, &artifacts.layering);
    mark_conjunct_conflicts(g, &layouts);

    let xs = balance_four_alignments(g, &artifacts.layering);
    for (v, x) in &xs {
        if let Some(node) = g.node_mut(v) {
            node.x = Some(*x);
        }
    }

    fan_out_conjuncts(g, layouts);

    let ranksep = g.graph().ranksep;
    for id in g.node_ids() {
        if let Some(node) = g.node_mut(&id) {
            if let Some(rank) = node.rank {
                node.y = Some(rank * ranksep);
            }
        }
    }
}

/// Collapses every conjunct cluster back into its container: sentinels leave
/// the rows, the conclusion edge returns to the container, child edges are
/// redirected onto it, and the container takes the children's row slot with
/// their combined width.
fn remerge_conjuncts(g: &mut LayoutGraph, artifacts: &mut OrderArtifacts) -> Vec<ConjunctLayout> {
    let nodesep = g.graph().nodesep;
    let mut layouts: Vec<ConjunctLayout> = Vec::new();

    for cs in &artifacts.conjuncts {
        g.remove_edge_key(&cs.stand_in);
        let (conclusion_key, conclusion_label) = &cs.conclusion;
        g.set_edge_key(conclusion_key.clone(), conclusion_label.clone());

        let child_ids: Vec<String> = g.children(&cs.container).to_vec();

        // Final left-to-right order within the row.
        let row_pos: HashMap<&str, usize> = artifacts
            .layering
            .iter()
            .flat_map(|row| row.iter().enumerate().map(|(i, v)| (v.as_str(), i)))
            .collect();
        let mut ordered: Vec<String> = child_ids.clone();
        ordered.sort_by_key(|c| row_pos.get(c.as_str()).copied().unwrap_or(usize::MAX));

        let mut incident: Vec<(EdgeKey, EdgeLabel)> = Vec::new();
        let mut seen: rustc_hash::FxHashSet<EdgeKey> = rustc_hash::FxHashSet::default();
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
        let mut total_width = 0.0;
        let mut max_height = 0.0f64;
        for child in &ordered {
            if let Some(label) = g.node(child).cloned() {
                total_width += label.width;
                max_height = max_height.max(label.height);
                children.push((child.clone(), label));
            }
            g.remove_node(child);
        }
        if children.len() > 1 {
            total_width += (children.len() - 1) as f64 * nodesep;
        }

        let mut synthetic: Vec<EdgeKey> = Vec::new();
        for (i, (key, label)) in incident.iter().enumerate() {
            let is_child = |id: &str| child_ids.iter().any(|c| c == id);
            let v = if is_child(&key.v) {
                cs.container.as_str()
            } else {
                key.v.as_str()
            };
            let w = if is_child(&key.w) {
                cs.container.as_str()
            } else {
                key.w.as_str()
            };
            if v == w {
                continue;
            }
            let name = format!("_pm{i}");
            let stand_in = EdgeKey::new(v, w, Some(name.clone()));
            g.set_edge_named(
                v.to_string(),
                w.to_string(),
                Some(name),
                Some(EdgeLabel {
                    weight: label.weight,
                    synthetic: true,
                    ..Default::default()
                }),
            );
            synthetic.push(stand_in);
        }

        if let Some(node) = g.node_mut(&cs.container) {
            node.width = total_width;
            node.height = max_height;
        }
        g.remove_node(&cs.start);
        g.remove_node(&cs.end);

        // The container takes over the leftmost slot the cluster occupied.
        for row in &mut artifacts.layering {
            let slot = row
                .iter()
                .position(|v| child_ids.iter().any(|c| c == v) || *v == cs.start || *v == cs.end);
            let Some(slot) = slot else {
                continue;
            };
            row.retain(|v| !(child_ids.iter().any(|c| c == v) || *v == cs.start || *v == cs.end));
            let slot = slot.min(row.len());
            row.insert(slot, cs.container.clone());
        }

        layouts.push(ConjunctLayout {
            container: cs.container.clone(),
            children,
            stashed_edges: stashed,
            synthetic,
        });
    }

    crate::util::assign_order(g, &artifacts.layering);
    layouts
}

/// Every edge leaving a conjunct container is ineligible for alignment
/// except its single conclusion edge, which keeps the cluster stacked over
/// its conclusion.
fn mark_conjunct_conflicts(g: &mut LayoutGraph, layouts: &[ConjunctLayout]) {
    for layout in layouts {
        let keys: Vec<EdgeKey> = g.out_edges(&layout.container, None);
        for key in keys {
            let is_conclusion = key.name.is_none();
            if is_conclusion {
                continue;
            }
            if let Some(label) = g.edge_mut_by_key(&key) {
                label.conflicted = true;
            }
        }
    }
}

fn balance_four_alignments(g: &LayoutGraph, layering: &[Vec<String>]) -> HashMap<String, f64> {
    let nodesep = g.graph().nodesep;
    let mut xss: HashMap<&'static str, HashMap<String, f64>> = HashMap::default();

    for vert in ["u", "d"] {
        let vertical: Vec<Vec<String>> = if vert == "u" {
            layering.to_vec()
        } else {
            layering.iter().rev().cloned().collect()
        };
        for horiz in ["l", "r"] {
            let adjusted: Vec<Vec<String>> = if horiz == "l" {
                vertical.clone()
            } else {
                vertical
                    .iter()
                    .map(|row| row.iter().rev().cloned().collect())
                    .collect()
            };

            let alignment = bk::vertical_alignment(g, &adjusted, vert == "u");
            let mut xs = bk::horizontal_compaction(g, &adjusted, &alignment, nodesep);
            if horiz == "r" {
                for x in xs.values_mut() {
                    *x = -*x;
                }
            }
            let key = match (vert, horiz) {
                ("u", "l") => "ul",
                ("u", "r") => "ur",
                ("d", "l") => "dl",
                _ => "dr",
            };
            xss.insert(key, xs);
        }
    }

    // Anchor everything to the narrowest assignment, then take the mean of
    // the two middle candidates per vertex.
    let mut best_key = "ul";
    let mut best_width = f64::INFINITY;
    for key in ["ul", "ur", "dl", "dr"] {
        if let Some(xs) = xss.get(key) {
            let width = bk::assignment_width(g, xs);
            if width < best_width {
                best_width = width;
                best_key = key;
            }
        }
    }

    let (anchor_min, anchor_max) = extent_of(&xss[best_key]);
    for key in ["ul", "ur", "dl", "dr"] {
        if key == best_key {
            continue;
        }
        let Some(xs) = xss.get_mut(key) else {
            continue;
        };
        let (min, max) = extent_of(xs);
        let delta = if key.ends_with('l') {
            anchor_min - min
        } else {
            anchor_max - max
        };
        if delta != 0.0 && delta.is_finite() {
            for x in xs.values_mut() {
                *x += delta;
            }
        }
    }

    let mut out: HashMap<String, f64> = HashMap::default();
    let Some(reference) = xss.get("ul") else {
        return out;
    };
    for v in reference.keys() {
        let mut candidates: Vec<f64> = ["ul", "ur", "dl", "dr"]
            .iter()
            .filter_map(|key| xss.get(*key).and_then(|xs| xs.get(v)).copied())
            .collect();
        candidates.sort_by(|a, b| a.total_cmp(b));
        let x = match candidates.len() {
            4 => (candidates[1] + candidates[2]) / 2.0,
            0 => 0.0,
            n => candidates[n / 2],
        };
        out.insert(v.clone(), x);
    }
    out
}

fn extent_of(xs: &HashMap<String, f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &x in xs.values() {
        min = min.min(x);
        max = max.max(x);
    }
    (min, max)
}

/// Restores conjunct children, laid left to right from the container's left
/// edge, and brings their original edges back.
fn fan_out_conjuncts(g: &mut LayoutGraph, layouts: Vec<ConjunctLayout>) {
    let nodesep = g.graph().nodesep;
    for layout in layouts {
        for key in &layout.synthetic {
            g.remove_edge_key(key);
        }

        let container_x = g.node(&layout.container).and_then(|n| n.x).unwrap_or(0.0);
        let container_width = g.node(&layout.container).map(|n| n.width).unwrap_or(0.0);
        let rank = g.node(&layout.container).and_then(|n| n.rank);

        let mut cursor = container_x - container_width / 2.0;
        for (id, label) in layout.children {
            let mut label = label;
            label.rank = rank;
            label.x = Some(cursor + label.width / 2.0);
            cursor += label.width + nodesep;
            g.set_node(id.clone(), label);
            let _ = g.set_parent(id, layout.container.clone());
        }
        for (key, label) in &layout.stashed_edges {
            g.set_edge_key(key.clone(), label.clone());
        }
    }
}
