//! Constrained barycenter sort of a single layer row.
//!
//! Each movable vertex gets the weighted mean position of its neighbors in
//! the fixed row. Ordering constraints that the barycenters would violate
//! are resolved by merging the constrained pair into one meta entry (the
//! constraint's source listed first), processed in topological order so a
//! resolution never introduces a constraint cycle. Entries without a
//! barycenter keep their original index.

use crate::model::LayoutGraph;
use rustc_hash::FxHashMap as HashMap;
use toulmin_graphlib::Graph;

pub type ConstraintGraph = Graph<(), (), ()>;

#[derive(Debug, Clone)]
struct Entry {
    vs: Vec<String>,
    i: usize,
    barycenter: Option<f64>,
    weight: Option<f64>,
    indegree: usize,
    ins: Vec<String>,
    outs: Vec<String>,
    merged: bool,
}

/// Returns the row in its new left-to-right order. `fixed_pos` maps the
/// fixed neighbor row's vertices to their positions; `use_in_edges` selects
/// which adjacency feeds the barycenters (in-edges for a down sweep,
/// out-edges for an up sweep).
pub fn sort_row(
    g: &LayoutGraph,
    cg: &ConstraintGraph,
    row: &[String],
    fixed_pos: &HashMap<String, usize>,
    use_in_edges: bool,
) -> Vec<String> {
    let mut entries: HashMap<String, Entry> = HashMap::default();
    for (i, v) in row.iter().enumerate() {
        let (barycenter, weight) = barycenter(g, v, fixed_pos, use_in_edges);
        entries.insert(
            v.clone(),
            Entry {
                vs: vec![v.clone()],
                i,
                barycenter,
                weight,
                indegree: 0,
                ins: Vec::new(),
                outs: Vec::new(),
                merged: false,
            },
        );
    }

    for e in cg.edges() {
        if !entries.contains_key(&e.v) || !entries.contains_key(&e.w) {
            continue;
        }
        if let Some(target) = entries.get_mut(&e.w) {
            target.indegree += 1;
        }
        if let Some(source) = entries.get_mut(&e.v) {
            source.outs.push(e.w.clone());
        }
    }

    // Topological scan; merging only ever touches a source entry and one of
    // its already-processed predecessors, so no cycle can form.
    let mut ready: Vec<String> = row
        .iter()
        .filter(|v| entries.get(*v).is_some_and(|e| e.indegree == 0))
        .cloned()
        .collect();
    let mut processed: Vec<String> = Vec::new();

    while let Some(v) = ready.pop() {
        processed.push(v.clone());

        let ins = entries.get(&v).map(|e| e.ins.clone()).unwrap_or_default();
        for u in ins.into_iter().rev() {
            if entries.get(&u).map(|e| e.merged).unwrap_or(true) {
                continue;
            }
            let violated = {
                let (Some(ue), Some(ve)) = (entries.get(&u), entries.get(&v)) else {
                    continue;
                };
                match (ue.barycenter, ve.barycenter) {
                    (Some(ub), Some(vb)) => ub >= vb,
                    _ => true,
                }
            };
            if violated {
                merge_entries(&mut entries, &v, &u);
            }
        }

        let outs = entries.get(&v).map(|e| e.outs.clone()).unwrap_or_default();
        for w in outs {
            let Some(we) = entries.get_mut(&w) else {
                continue;
            };
            we.ins.push(v.clone());
            we.indegree -= 1;
            if we.indegree == 0 {
                ready.push(w);
            }
        }
    }

    // Interleave: barycenter-less entries hold their original index while
    // the rest order by barycenter.
    let mut sortable: Vec<&Entry> = Vec::new();
    let mut unsortable: Vec<&Entry> = Vec::new();
    for id in &processed {
        let Some(entry) = entries.get(id) else {
            continue;
        };
        if entry.merged {
            continue;
        }
        if entry.barycenter.is_some() {
            sortable.push(entry);
        } else {
            unsortable.push(entry);
        }
    }
    sortable.sort_by(|a, b| {
        let (ab, bb) = (a.barycenter.unwrap_or(0.0), b.barycenter.unwrap_or(0.0));
        ab.partial_cmp(&bb)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.i.cmp(&b.i))
    });
    unsortable.sort_by(|a, b| b.i.cmp(&a.i));

    let mut out: Vec<String> = Vec::with_capacity(row.len());
    let mut index = 0usize;
    let consume = |out: &mut Vec<String>, unsortable: &mut Vec<&Entry>, mut index: usize| {
        while let Some(last) = unsortable.last() {
            if last.i > index {
                break;
            }
            let Some(entry) = unsortable.pop() else {
                break;
            };
            out.extend(entry.vs.iter().cloned());
            index += 1;
        }
        index
    };

    index = consume(&mut out, &mut unsortable, index);
    for entry in sortable {
        index += entry.vs.len();
        out.extend(entry.vs.iter().cloned());
        index = consume(&mut out, &mut unsortable, index);
    }
    while let Some(entry) = unsortable.pop() {
        out.extend(entry.vs.iter().cloned());
    }

    out
}

fn barycenter(
    g: &LayoutGraph,
    v: &str,
    fixed_pos: &HashMap<String, usize>,
    use_in_edges: bool,
) -> (Option<f64>, Option<f64>) {
    let edges = if use_in_edges {
        g.in_edges(v, None)
    } else {
        g.out_edges(v, None)
    };

    let mut sum = 0.0;
    let mut weight = 0.0;
    for e in edges {
        let other = if use_in_edges { &e.v } else { &e.w };
        let Some(&pos) = fixed_pos.get(other) else {
            continue;
        };
        let edge_weight = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(0.0);
        sum += edge_weight * pos as f64;
        weight += edge_weight;
    }

    if weight > 0.0 {
        (Some(sum / weight), Some(weight))
    } else {
        (None, None)
    }
}

/// Folds `source` into `target`, listing the constraint source's vertices
/// first so the resolved order honors the constraint.
fn merge_entries(entries: &mut HashMap<String, Entry>, target: &str, source: &str) {
    let Some(source_entry) = entries.get(source).cloned() else {
        return;
    };
    let Some(target_entry) = entries.get_mut(target) else {
        return;
    };

    let mut sum = 0.0;
    let mut weight = 0.0;
    if let (Some(b), Some(w)) = (target_entry.barycenter, target_entry.weight) {
        sum += b * w;
        weight += w;
    }
    if let (Some(b), Some(w)) = (source_entry.barycenter, source_entry.weight) {
        sum += b * w;
        weight += w;
    }

    let mut vs = source_entry.vs;
    vs.extend(target_entry.vs.drain(..));
    target_entry.vs = vs;
    if weight > 0.0 {
        target_entry.barycenter = Some(sum / weight);
        target_entry.weight = Some(weight);
    }
    target_entry.i = target_entry.i.min(source_entry.i);

    if let Some(source_entry) = entries.get_mut(source) {
        source_entry.merged = true;
    }
}
