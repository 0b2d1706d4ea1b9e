//! Typed labels for the layout graph.
//!
//! The caller constructs a [`LayoutGraph`] with these labels, fills in the
//! input fields, and reads back the output fields after layout. Everything
//! else is scratch owned by the engine: it lives on the per-call working
//! copy and is never written back.

use std::collections::BTreeMap;
use toulmin_graphlib::EdgeKey;

/// Graph-level configuration and output dimensions.
#[derive(Debug, Clone)]
pub struct GraphLabel {
    /// Vertical distance between adjacent ranks.
    pub ranksep: f64,
    /// Minimum horizontal gap between vertices sharing a rank.
    pub nodesep: f64,
    /// Iteration cap for the ranking refinement loop.
    pub max_ranking_loops: usize,
    /// Iteration cap for the crossing-minimization sweeps.
    pub max_crossing_loops: usize,

    /// Output: bounding-box width over all vertex boxes.
    pub width: Option<f64>,
    /// Output: bounding-box height over all vertex boxes.
    pub height: Option<f64>,

    /// Scratch: first dummy vertex of each split long edge.
    pub dummy_chains: Vec<String>,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            ranksep: 225.0,
            nodesep: 100.0,
            max_ranking_loops: 100,
            max_crossing_loops: 100,
            width: None,
            height: None,
            dummy_chains: Vec::new(),
        }
    }
}

/// Role of a vertex synthesized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyKind {
    /// Intermediate vertex of a split long edge.
    Edge,
    /// Left ordering sentinel of a conjunct cluster.
    ConjunctStart,
    /// Right ordering sentinel of a conjunct cluster.
    ConjunctEnd,
    /// Column reservation for a warrant, sitting on the ranks adjacent to
    /// the targeted edge.
    WarrantColumn,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,

    /// Output: vertex center.
    pub x: Option<f64>,
    pub y: Option<f64>,

    /// Scratch: assigned rank; half-integers appear only on warrant sources
    /// and sinks.
    pub rank: Option<f64>,
    /// Scratch: index within the rank's row.
    pub order: Option<usize>,
    /// Scratch: synthesized-vertex role.
    pub dummy: Option<DummyKind>,
    /// Scratch: original label of the edge this dummy chain replaces.
    pub edge_label: Option<EdgeLabel>,
    /// Scratch: identity of the edge this dummy chain replaces.
    pub edge_obj: Option<EdgeKey>,

    /// This vertex is a conjunct container.
    pub conjunct: bool,
    /// This vertex is the synthetic target of a warrant edge.
    pub warrant_sink: bool,

    /// Freeform attributes; carried through layout untouched.
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl NodeLabel {
    /// Input label with the documented default extent.
    pub fn statement() -> Self {
        Self {
            width: 300.0,
            height: 100.0,
            ..Default::default()
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.dummy.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    /// Minimum number of ranks this edge must span. Must be at least 1.
    pub minlen: i32,
    /// Pull strength in ranking and crossing counting.
    pub weight: f64,

    /// Output: quadratic Bezier control polygon, exactly three points.
    pub points: Vec<Point>,

    /// Scratch: ineligible for vertical alignment (type-1 conflict or a
    /// conjunct side edge).
    pub conflicted: bool,
    /// Scratch: this edge currently runs opposite its input direction.
    pub reversed: bool,
    /// Scratch: name the edge carried before reversal.
    pub forward_name: Option<String>,
    /// Scratch: stand-in created while argument structures are merged; never
    /// stashed or restored.
    pub synthetic: bool,

    /// Freeform attributes; carried through layout untouched.
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
            points: Vec::new(),
            conflicted: false,
            reversed: false,
            forward_name: None,
            synthetic: false,
            extras: BTreeMap::new(),
        }
    }
}

pub type LayoutGraph = toulmin_graphlib::Graph<NodeLabel, EdgeLabel, GraphLabel>;
