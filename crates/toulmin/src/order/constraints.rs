//! Ordering sentinels for conjunct clusters and warrant columns.
//!
//! Conjunct premises must stay contiguous within their layer: a start and an
//! end sentinel flank them, with constraints `start -> child -> end`. While
//! the sentinels are installed, the container leaves the layer and its
//! conclusion edge rides on the start sentinel, so crossing counts and
//! barycenters keep seeing the cluster's edge.
//!
//! A warrant reserves a column just right of its targeted edge: one sentinel
//! per adjacent rank, as wide as the warrant source, constrained to sit
//! right of the targeted edge's endpoints.

use super::sort::ConstraintGraph;
use crate::model::{DummyKind, EdgeLabel, LayoutGraph, NodeLabel};
use crate::rank_table::RankTable;
use crate::util::add_dummy_node;
use toulmin_graphlib::{EdgeKey, Graph, GraphOptions};

#[derive(Debug, Clone)]
pub struct ConjunctSentinels {
    pub container: String,
    pub start: String,
    pub end: String,
    /// The conclusion edge as removed from the container (possibly the first
    /// sub-edge of a split chain), restored during positioning.
    pub conclusion: (EdgeKey, EdgeLabel),
    /// The stand-in carrying the conclusion from the start sentinel.
    pub stand_in: EdgeKey,
}

#[derive(Debug, Clone)]
pub struct WarrantColumn {
    pub sink: String,
    pub sources: Vec<String>,
    /// Column sentinel on the targeted edge's source rank.
    pub start: String,
    /// Column sentinel on the targeted edge's target rank.
    pub end: String,
}

pub struct Constraints {
    pub graph: ConstraintGraph,
    pub conjuncts: Vec<ConjunctSentinels>,
    pub warrants: Vec<WarrantColumn>,
}

pub fn install(g: &mut LayoutGraph, table: &mut RankTable) -> Constraints {
    let mut cg: ConstraintGraph = Graph::new(GraphOptions::default());
    let mut conjuncts: Vec<ConjunctSentinels> = Vec::new();
    let mut warrants: Vec<WarrantColumn> = Vec::new();

    let containers: Vec<String> = g
        .node_ids()
        .into_iter()
        .filter(|id| g.node(id).is_some_and(|n| n.conjunct) && !g.children(id).is_empty())
        .collect();
    for container in containers {
        let Some(rank) = g.node(&container).and_then(|n| n.rank) else {
            continue;
        };
        let Some(conclusion_key) = g.out_edges(&container, None).into_iter().next() else {
            continue;
        };
        let Some(conclusion_label) = g.remove_edge_key(&conclusion_key) else {
            continue;
        };

        let start = add_dummy_node(
            g,
            NodeLabel {
                rank: Some(rank),
                dummy: Some(DummyKind::ConjunctStart),
                ..Default::default()
            },
            &format!("start {container}"),
        );
        let end = add_dummy_node(
            g,
            NodeLabel {
                rank: Some(rank),
                dummy: Some(DummyKind::ConjunctEnd),
                ..Default::default()
            },
            &format!("end {container}"),
        );
        table.set(start.clone(), rank);
        table.set(end.clone(), rank);
        table.delete(&container);

        for child in g.children(&container).to_vec() {
            cg.set_edge(start.clone(), child.clone());
            cg.set_edge(child, end.clone());
        }

        let stand_in = EdgeKey::new(start.clone(), conclusion_key.w.clone(), None::<String>);
        g.set_edge_with_label(
            start.clone(),
            conclusion_key.w.clone(),
            EdgeLabel {
                weight: conclusion_label.weight,
                synthetic: true,
                ..Default::default()
            },
        );

        conjuncts.push(ConjunctSentinels {
            container,
            start,
            end,
            conclusion: (conclusion_key, conclusion_label),
            stand_in,
        });
    }

    let sinks: Vec<String> = g
        .node_ids()
        .into_iter()
        .filter(|id| g.node(id).is_some_and(|n| n.warrant_sink))
        .collect();
    for sink in sinks {
        let Some(target) = g.node(&sink).and_then(|n| n.edge_obj.clone()) else {
            continue;
        };
        // Inert warrants (targeted edge vanished before ranking) sit on an
        // integer rank and get no column.
        let on_half_rank = g
            .node(&sink)
            .and_then(|n| n.rank)
            .is_some_and(|r| r.fract() != 0.0);
        if !on_half_rank {
            continue;
        }
        let (Some(u_rank), Some(w_rank)) = (
            g.node(&target.v).and_then(|n| n.rank),
            g.node(&target.w).and_then(|n| n.rank),
        ) else {
            continue;
        };

        let sources: Vec<String> = g
            .predecessors(&sink)
            .into_iter()
            .filter(|s| g.node(s).is_some_and(|n| !n.is_dummy()))
            .map(str::to_string)
            .collect();
        let width = sources
            .first()
            .and_then(|s| g.node(s))
            .map(|n| n.width)
            .unwrap_or(0.0);

        let start = add_dummy_node(
            g,
            NodeLabel {
                width,
                rank: Some(u_rank),
                dummy: Some(DummyKind::WarrantColumn),
                ..Default::default()
            },
            &format!("start {sink}"),
        );
        let end = add_dummy_node(
            g,
            NodeLabel {
                width,
                rank: Some(w_rank),
                dummy: Some(DummyKind::WarrantColumn),
                ..Default::default()
            },
            &format!("end {sink}"),
        );
        table.set(start.clone(), u_rank);
        table.set(end.clone(), w_rank);

        cg.set_edge(target.v.clone(), start.clone());
        cg.set_edge(target.w.clone(), end.clone());

        warrants.push(WarrantColumn {
            sink,
            sources,
            start,
            end,
        });
    }

    Constraints {
        graph: cg,
        conjuncts,
        warrants,
    }
}
