//! Crossing minimization.
//!
//! Long edges are split into unit chains, ordering sentinels are installed,
//! and alternating down/up sweeps re-sort each row against its fixed
//! neighbor with the constrained barycenter heuristic. A row keeps a new
//! order only if it strictly reduces crossings against the fixed row; the
//! whole pass repeats while the global crossing count keeps falling, bounded
//! by `max_crossing_loops`.

pub mod constraints;
pub mod cross_count;
pub mod sort;

pub use constraints::{ConjunctSentinels, Constraints, WarrantColumn};
pub use cross_count::{cross_count, two_layer_cross_count};
pub use sort::{sort_row, ConstraintGraph};

use crate::model::LayoutGraph;
use crate::rank_table::RankTable;
use crate::util::assign_order;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug)]
pub struct OrderArtifacts {
    /// Rows ascending by rank, each row left to right.
    pub layering: Vec<Vec<String>>,
    pub conjuncts: Vec<ConjunctSentinels>,
    pub warrants: Vec<WarrantColumn>,
}

pub fn run(g: &mut LayoutGraph, table: &mut RankTable) -> OrderArtifacts {
    crate::normalize::run(g);
    for id in g.node_ids() {
        if table.contains(&id) {
            continue;
        }
        if let Some(rank) = g.node(&id).and_then(|n| n.rank) {
            table.set(id, rank);
        }
    }

    let installed = constraints::install(g, table);
    let cg = installed.graph;

    let mut layering: Vec<Vec<String>> = table.rows().map(|(_, row)| row.to_vec()).collect();
    let mut best = layering.clone();
    let mut best_cc = cross_count(g, &layering);

    let max_loops = g.graph().max_crossing_loops;
    let mut loops = 0usize;
    while best_cc > 0.0 {
        if loops >= max_loops {
            tracing::warn!(
                cap = max_loops,
                "crossing minimization hit its iteration cap; keeping best order"
            );
            break;
        }
        sweep_down(g, &cg, &mut layering);
        sweep_up(g, &cg, &mut layering);
        loops += 1;

        let cc = cross_count(g, &layering);
        if cc < best_cc {
            best_cc = cc;
            best = layering.clone();
        } else {
            break;
        }
    }
    tracing::debug!(crossings = best_cc, sweeps = loops, "ordering finished");

    assign_order(g, &best);
    OrderArtifacts {
        layering: best,
        conjuncts: installed.conjuncts,
        warrants: installed.warrants,
    }
}

fn positions(row: &[String]) -> HashMap<String, usize> {
    row.iter()
        .enumerate()
        .map(|(i, v)| (v.clone(), i))
        .collect()
}

fn sweep_down(g: &LayoutGraph, cg: &ConstraintGraph, layering: &mut [Vec<String>]) {
    for r in 1..layering.len() {
        let fixed = positions(&layering[r - 1]);
        let candidate = sort_row(g, cg, &layering[r], &fixed, true);
        adopt_if_better(g, &layering[r - 1].clone(), &mut layering[r], candidate);
    }
}

fn sweep_up(g: &LayoutGraph, cg: &ConstraintGraph, layering: &mut [Vec<String>]) {
    for r in (0..layering.len().saturating_sub(1)).rev() {
        let fixed = positions(&layering[r + 1]);
        let candidate = sort_row(g, cg, &layering[r], &fixed, false);
        let fixed_row = layering[r + 1].clone();
        adopt_up_if_better(g, &mut layering[r], &fixed_row, candidate);
    }
}

fn adopt_if_better(
    g: &LayoutGraph,
    north: &[String],
    south: &mut Vec<String>,
    candidate: Vec<String>,
) {
    let before = two_layer_cross_count(g, north, south);
    let after = two_layer_cross_count(g, north, &candidate);
    if after < before {
        *south = candidate;
    }
}

fn adopt_up_if_better(
    g: &LayoutGraph,
    north: &mut Vec<String>,
    south: &[String],
    candidate: Vec<String>,
) {
    let before = two_layer_cross_count(g, north, south);
    let after = two_layer_cross_count(g, &candidate, south);
    if after < before {
        *north = candidate;
    }
}
