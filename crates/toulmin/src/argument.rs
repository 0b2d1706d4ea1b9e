//! Argument-map extensions over the layout graph: conjunct clusters and
//! warrant edges.
//!
//! A conjunct cluster groups premises that jointly imply one conclusion; the
//! group is materialized as a compound container vertex holding the premises
//! as children, with a single outgoing edge to the conclusion. A warrant is
//! a statement that licenses an inference; it is materialized as a synthetic
//! sink vertex standing in for the targeted edge.

use crate::error::{Error, Result};
use crate::model::{EdgeLabel, LayoutGraph, NodeLabel};
use toulmin_graphlib::{EdgeKey, GraphOptions};

/// A layout graph with the options the engine expects: directed, simple,
/// compound.
pub fn new_layout_graph() -> LayoutGraph {
    LayoutGraph::new(GraphOptions {
        directed: true,
        multigraph: false,
        compound: true,
    })
}

pub fn conjunct_container_id(target: &str) -> String {
    format!("-> {target}")
}

pub fn warrant_sink_id(v: &str, w: &str) -> String {
    format!("{v} -> {w}")
}

/// Adds `v` to the conjunct cluster implying `w` through the inference
/// `(u, w)`. The first call for an inference synthesizes the container and
/// moves the inference edge onto it; later calls join the existing cluster.
pub fn set_conjunct_node(g: &mut LayoutGraph, v: &str, edge: (&str, &str)) -> Result<()> {
    let (u, w) = edge;
    g.ensure_node(v);

    let container = match g.parent(u) {
        Some(parent) => parent.to_string(),
        None => {
            let Some(label) = g.remove_edge(u, w, None) else {
                return Err(Error::MissingConjunctEdge {
                    v: u.to_string(),
                    w: w.to_string(),
                });
            };
            let container = conjunct_container_id(w);
            g.set_node(
                container.clone(),
                NodeLabel {
                    conjunct: true,
                    ..Default::default()
                },
            );
            g.set_edge_with_label(container.clone(), w, label);
            g.set_parent(u, container.clone())
                .map_err(|e| Error::unreachable(e.to_string()))?;
            container
        }
    };

    g.set_parent(v, container)
        .map_err(|e| Error::unreachable(e.to_string()))?;
    Ok(())
}

/// Installs a warrant: statement `s` licenses the inference `(u, w)`. The
/// targeted edge is materialized as the zero-extent sink `"<u> -> <w>"`, and
/// `s` points at it with `label`.
pub fn set_warrant_edge(
    g: &mut LayoutGraph,
    s: &str,
    edge: (&str, &str),
    label: EdgeLabel,
) -> Result<()> {
    let (u, w) = edge;
    if !g.has_edge(u, w, None) {
        return Err(Error::MissingWarrantEdge {
            v: u.to_string(),
            w: w.to_string(),
        });
    }

    let sink = warrant_sink_id(u, w);
    if let Some(node) = g.node_mut(&sink) {
        node.warrant_sink = true;
        node.width = 0.0;
        node.height = 0.0;
        node.edge_obj = Some(EdgeKey::new(u, w, None::<String>));
    } else {
        g.set_node(
            sink.clone(),
            NodeLabel {
                warrant_sink: true,
                edge_obj: Some(EdgeKey::new(u, w, None::<String>)),
                ..Default::default()
            },
        );
    }
    g.ensure_node(s);
    g.set_edge_named(s, sink, None::<String>, Some(label));
    Ok(())
}

/// Removes an edge and tears down any argument-map structure that depended
/// on it: a conjunct container left without children, a warrant sink the
/// edge pointed at, and the warrant sink standing in for the removed edge.
pub fn remove_edge_and_cleanup(
    g: &mut LayoutGraph,
    v: &str,
    w: &str,
    name: Option<&str>,
) -> Option<EdgeLabel> {
    let label = g.remove_edge(v, w, name)?;

    let source_is_empty_container =
        g.node(v).is_some_and(|n| n.conjunct) && g.children(v).is_empty();
    if source_is_empty_container {
        g.remove_node(v);
    }

    if g.node(w).is_some_and(|n| n.warrant_sink) {
        g.remove_node(w);
    }

    let sink = warrant_sink_id(v, w);
    if g.node(&sink).is_some_and(|n| n.warrant_sink) {
        g.remove_node(&sink);
    }

    Some(label)
}
