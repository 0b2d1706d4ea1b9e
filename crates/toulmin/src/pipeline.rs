//! Layout entry point.
//!
//! The caller's graph is validated, copied into a private working graph
//! (multigraph, so reversed edges and merge stand-ins can coexist with their
//! originals), run through cycle removal, ranking, ordering, positioning,
//! and routing, and finally read back: vertex coordinates, edge control
//! points, and the overall dimensions. Nothing is written on error.

use crate::error::{Error, Result};
use crate::model::{LayoutGraph, NodeLabel};
use crate::{acyclic, order, position, rank, router};
use toulmin_graphlib::{Graph, GraphOptions};

pub fn layout(g: &mut LayoutGraph) -> Result<()> {
    if !g.is_directed() {
        return Err(Error::Undirected);
    }
    for key in g.edge_keys() {
        let Some(label) = g.edge_by_key(&key) else {
            continue;
        };
        if label.minlen < 1 {
            return Err(Error::BadMinlen {
                v: key.v,
                w: key.w,
                minlen: label.minlen,
            });
        }
    }
    if g.node_count() == 0 {
        return Ok(());
    }

    let mut working = working_copy(g);
    let removed = acyclic::remove_cycles(&mut working);
    let mut table = rank::assign_ranks(&mut working)?;
    let mut artifacts = order::run(&mut working, &mut table);
    position::run(&mut working, &mut artifacts);
    router::route(&mut working, &artifacts, &removed);

    write_back(g, &working);
    Ok(())
}

/// Per-call working graph: caller labels cloned with scratch cleared, parent
/// links carried over.
fn working_copy(g: &LayoutGraph) -> LayoutGraph {
    let mut working: LayoutGraph = Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: true,
    });
    working.set_graph(g.graph().clone());
    working.graph_mut().dummy_chains.clear();
    working.graph_mut().width = None;
    working.graph_mut().height = None;

    for id in g.nodes() {
        let Some(label) = g.node(id) else {
            continue;
        };
        let label = NodeLabel {
            x: None,
            y: None,
            rank: None,
            order: None,
            dummy: None,
            edge_label: None,
            ..label.clone()
        };
        working.set_node(id, label);
    }
    for key in g.edges() {
        let Some(label) = g.edge_by_key(key) else {
            continue;
        };
        let mut label = label.clone();
        label.points.clear();
        label.conflicted = false;
        label.reversed = false;
        label.forward_name = None;
        label.synthetic = false;
        working.set_edge_named(key.v.clone(), key.w.clone(), key.name.clone(), Some(label));
    }
    for id in g.nodes() {
        if let Some(parent) = g.parent(id) {
            // The caller's relation is already a forest.
            let _ = working.set_parent(id.to_string(), parent.to_string());
        }
    }
    working
}

/// Copies outputs only: coordinates, control points, overall dimensions.
fn write_back(g: &mut LayoutGraph, working: &LayoutGraph) {
    for id in g.node_ids() {
        let Some(done) = working.node(&id) else {
            continue;
        };
        let (x, y) = (done.x, done.y);
        if let Some(node) = g.node_mut(&id) {
            node.x = x;
            node.y = y;
        }
    }
    for key in g.edge_keys() {
        let Some(done) = working.edge_by_key(&key) else {
            continue;
        };
        let points = done.points.clone();
        if let Some(label) = g.edge_mut_by_key(&key) {
            label.points = points;
        }
    }
    let (width, height) = (working.graph().width, working.graph().height);
    let label = g.graph_mut();
    label.width = width;
    label.height = height;
}
