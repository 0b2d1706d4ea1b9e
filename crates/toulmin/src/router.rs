//! Edge routing and output shaping.
//!
//! Every surviving edge gets a three-point quadratic Bezier control
//! sequence, dummy chains collapse back into their original edges, warrant
//! geometry is pinned to its targeted edge, the cycle remover's edits are
//! undone, and the graph's bounding box is recorded.

use crate::acyclic::{self, RemovedEdges};
use crate::model::{LayoutGraph, Point};
use crate::normalize;
use crate::order::OrderArtifacts;

pub fn route(g: &mut LayoutGraph, artifacts: &OrderArtifacts, removed: &RemovedEdges) {
    fix_warrant_coordinates(g, artifacts);
    emit_control_points(g);
    normalize::undo(g);

    for wc in &artifacts.warrants {
        g.remove_node(&wc.start);
        g.remove_node(&wc.end);
    }

    acyclic::undo(g, removed);
    set_graph_dimensions(g);
}

/// The warrant sink sits on its targeted edge: it takes the x of the edge's
/// source. The warrant statement itself moves into the column its sentinels
/// reserved beside the edge.
fn fix_warrant_coordinates(g: &mut LayoutGraph, artifacts: &OrderArtifacts) {
    for wc in &artifacts.warrants {
        let Some(target) = g.node(&wc.sink).and_then(|n| n.edge_obj.clone()) else {
            continue;
        };
        if let Some(x) = g.node(&target.v).and_then(|n| n.x) {
            if let Some(sink) = g.node_mut(&wc.sink) {
                sink.x = Some(x);
            }
        }

        let start_x = g.node(&wc.start).and_then(|n| n.x);
        let end_x = g.node(&wc.end).and_then(|n| n.x);
        if let (Some(a), Some(b)) = (start_x, end_x) {
            let column = (a + b) / 2.0;
            for source in &wc.sources {
                if let Some(node) = g.node_mut(source) {
                    node.x = Some(column);
                }
            }
        }
    }
}

/// Three control points per edge: both vertex centers, and the quadratic
/// midpoint of the two-segment polygon bending at `(x(v), y(w))` when the
/// source fans out, else at `(x(w), y(v))` so fan-ins bend on their incoming
/// side.
fn emit_control_points(g: &mut LayoutGraph) {
    for key in g.edge_keys() {
        if key.v == key.w {
            continue;
        }
        let Some((vx, vy)) = center(g, &key.v) else {
            continue;
        };
        let Some((wx, wy)) = center(g, &key.w) else {
            continue;
        };

        let fan_out = g.node_edges(&key.v).len() > 1;
        let (bx, by) = if fan_out { (vx, wy) } else { (wx, vy) };
        let mid = Point {
            x: (vx + 2.0 * bx + wx) / 4.0,
            y: (vy + 2.0 * by + wy) / 4.0,
        };

        if let Some(label) = g.edge_mut_by_key(&key) {
            label.points = vec![Point { x: vx, y: vy }, mid, Point { x: wx, y: wy }];
        }
    }
}

fn center(g: &LayoutGraph, v: &str) -> Option<(f64, f64)> {
    let node = g.node(v)?;
    Some((node.x?, node.y?))
}

fn set_graph_dimensions(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for id in g.nodes() {
        let Some(node) = g.node(id) else {
            continue;
        };
        let (Some(x), Some(y)) = (node.x, node.y) else {
            continue;
        };
        min_x = min_x.min(x - node.width / 2.0);
        max_x = max_x.max(x + node.width / 2.0);
        min_y = min_y.min(y - node.height / 2.0);
        max_y = max_y.max(y + node.height / 2.0);
    }
    if min_x.is_finite() {
        let label = g.graph_mut();
        label.width = Some(max_x - min_x);
        label.height = Some(max_y - min_y);
    }
}
