//! Crossing count between layers (Barth-Mutzel-Juenger).
//!
//! Inter-layer edges are visited in north-then-south order; an accumulator
//! tree over south positions sums, per insertion, the weight already sitting
//! to the right. The running total is the weighted crossing count.

use crate::model::LayoutGraph;
use rustc_hash::FxHashMap as HashMap;

pub fn cross_count(g: &LayoutGraph, layering: &[Vec<String>]) -> f64 {
    let mut cc = 0.0;
    for i in 1..layering.len() {
        cc += two_layer_cross_count(g, &layering[i - 1], &layering[i]);
    }
    cc
}

pub fn two_layer_cross_count(g: &LayoutGraph, north: &[String], south: &[String]) -> f64 {
    if south.is_empty() {
        return 0.0;
    }

    let south_pos: HashMap<&str, usize> = south
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    struct SouthEntry {
        pos: usize,
        weight: f64,
    }

    let mut entries: Vec<SouthEntry> = Vec::new();
    for v in north {
        let mut row: Vec<SouthEntry> = g
            .out_edges(v, None)
            .into_iter()
            .filter_map(|e| {
                let pos = *south_pos.get(e.w.as_str())?;
                let weight = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(0.0);
                Some(SouthEntry { pos, weight })
            })
            .collect();
        row.sort_by_key(|e| e.pos);
        entries.extend(row);
    }

    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<f64> = vec![0.0; tree_size];

    let mut cc = 0.0;
    for entry in entries {
        let mut index = entry.pos + first_index;
        tree[index] += entry.weight;
        let mut weight_sum = 0.0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += entry.weight;
        }
        cc += entry.weight * weight_sum;
    }
    cc
}
