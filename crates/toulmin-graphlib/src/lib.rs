//! Directed compound graph container used by the `toulmin` layout engine.
//!
//! The container stores typed labels on the graph, its vertices, and its
//! edges, and keeps every iteration surface (vertices, edges, adjacency) in
//! insertion order so layout passes are deterministic. Vertex and edge
//! storage is slotted: removal leaves a tombstone instead of reindexing, so
//! identifiers handed out earlier stay valid for the lifetime of the graph.

use hashbrown::Equivalent;
use rustc_hash::FxBuildHasher;
use std::hash::{Hash, Hasher};

pub mod alg;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("setting parent of {child:?} to {parent:?} would create a cycle")]
    ParentCycle { child: String, parent: String },
}

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub directed: bool,
    pub multigraph: bool,
    pub compound: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            directed: true,
            multigraph: false,
            compound: false,
        }
    }
}

/// Identity of an edge: endpoints plus an optional name slot.
///
/// Non-multigraphs always store `name: None`, so at most one edge exists per
/// ordered vertex pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(v: impl Into<String>, w: impl Into<String>, name: Option<impl Into<String>>) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }
}

impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.hash(state);
        self.w.hash(state);
        self.name.as_deref().hash(state);
    }
}

/// Borrowed view of an [`EdgeKey`], so presence/label queries by `&str`
/// endpoints never allocate.
#[derive(Clone, Copy)]
struct EdgeKeyRef<'a> {
    v: &'a str,
    w: &'a str,
    name: Option<&'a str>,
}

impl Hash for EdgeKeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.hash(state);
        self.w.hash(state);
        self.name.hash(state);
    }
}

impl Equivalent<EdgeKey> for EdgeKeyRef<'_> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w && key.name.as_deref() == self.name
    }
}

#[derive(Debug, Clone)]
struct NodeSlot<N> {
    id: String,
    label: N,
    /// Edge-slot indices, in insertion order.
    ins: Vec<usize>,
    outs: Vec<usize>,
}

#[derive(Debug, Clone)]
struct EdgeSlot<E> {
    key: EdgeKey,
    label: E,
}

pub struct Graph<N, E, G> {
    options: GraphOptions,
    label: G,

    nodes: Vec<Option<NodeSlot<N>>>,
    node_ix: HashMap<String, usize>,

    edges: Vec<Option<EdgeSlot<E>>>,
    edge_ix: HashMap<EdgeKey, usize>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            label: G::default(),
            nodes: Vec::new(),
            node_ix: HashMap::default(),
            edges: Vec::new(),
            edge_ix: HashMap::default(),
            parent: HashMap::default(),
            children: HashMap::default(),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.label
    }

    // ---- vertices ----

    pub fn has_node(&self, id: &str) -> bool {
        self.node_ix.contains_key(id)
    }

    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&ix) = self.node_ix.get(&id) {
            if let Some(slot) = self.nodes[ix].as_mut() {
                slot.label = label;
            }
            return self;
        }
        let ix = self.nodes.len();
        self.nodes.push(Some(NodeSlot {
            id: id.clone(),
            label,
            ins: Vec::new(),
            outs: Vec::new(),
        }));
        self.node_ix.insert(id, ix);
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if !self.node_ix.contains_key(&id) {
            self.set_node(id, N::default());
        }
        self
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        let &ix = self.node_ix.get(id)?;
        self.nodes[ix].as_ref().map(|slot| &slot.label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        let &ix = self.node_ix.get(id)?;
        self.nodes[ix].as_mut().map(|slot| &mut slot.label)
    }

    pub fn node_count(&self) -> usize {
        self.node_ix.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter_map(|slot| slot.as_ref().map(|s| s.id.as_str()))
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes().map(|s| s.to_string()).collect()
    }

    /// Removes a vertex together with its incident edges and any parent or
    /// child links. Returns `false` if the vertex was absent.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(ix) = self.node_ix.remove(id) else {
            return false;
        };
        let Some(slot) = self.nodes[ix].take() else {
            return false;
        };

        let mut incident: Vec<usize> = slot.ins;
        incident.extend(slot.outs);
        incident.sort_unstable();
        incident.dedup();
        for e_ix in incident {
            if let Some(edge) = self.edges[e_ix].as_ref() {
                let key = edge.key.clone();
                self.detach_edge(&key);
            }
        }

        if let Some(parent) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| c != id);
            }
        }
        if let Some(orphans) = self.children.remove(id) {
            for child in orphans {
                self.parent.remove(&child);
            }
        }
        true
    }

    // ---- edges ----

    pub fn edge_count(&self) -> usize {
        self.edge_ix.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges
            .iter()
            .filter_map(|slot| slot.as_ref().map(|s| &s.key))
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges().cloned().collect()
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    pub fn set_edge_key(&mut self, key: EdgeKey, label: E) -> &mut Self {
        self.set_edge_named(key.v, key.w, key.name, Some(label))
    }

    /// Inserts or updates the edge `(v, w, name)`. Missing endpoints are
    /// created with default labels. Without a label, a fresh edge gets
    /// `E::default()` and an existing edge is left untouched.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let v = v.into();
        let w = w.into();
        let name = if self.options.multigraph {
            name.map(Into::into)
        } else {
            None
        };
        self.ensure_node(v.clone());
        self.ensure_node(w.clone());

        let key = EdgeKey { v, w, name };
        if let Some(&ix) = self.edge_ix.get(&key) {
            if let Some(label) = label {
                if let Some(slot) = self.edges[ix].as_mut() {
                    slot.label = label;
                }
            }
            return self;
        }

        let ix = self.edges.len();
        self.edges.push(Some(EdgeSlot {
            key: key.clone(),
            label: label.unwrap_or_default(),
        }));
        let v_ix = self.node_ix[&key.v];
        let w_ix = self.node_ix[&key.w];
        if let Some(slot) = self.nodes[v_ix].as_mut() {
            slot.outs.push(ix);
        }
        if let Some(slot) = self.nodes[w_ix].as_mut() {
            slot.ins.push(ix);
        }
        self.edge_ix.insert(key, ix);
        self
    }

    fn key_ref<'a>(&self, v: &'a str, w: &'a str, name: Option<&'a str>) -> EdgeKeyRef<'a> {
        EdgeKeyRef {
            v,
            w,
            name: if self.options.multigraph { name } else { None },
        }
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_ix.contains_key(&self.key_ref(v, w, name))
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let &ix = self.edge_ix.get(&self.key_ref(v, w, name))?;
        self.edges[ix].as_ref().map(|slot| &slot.label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let &ix = self.edge_ix.get(&self.key_ref(v, w, name))?;
        self.edges[ix].as_mut().map(|slot| &mut slot.label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        let &ix = self.edge_ix.get(key)?;
        self.edges[ix].as_ref().map(|slot| &slot.label)
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        let &ix = self.edge_ix.get(key)?;
        self.edges[ix].as_mut().map(|slot| &mut slot.label)
    }

    pub fn remove_edge(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<E> {
        let &ix = self.edge_ix.get(&self.key_ref(v, w, name))?;
        let key = self.edges[ix].as_ref()?.key.clone();
        self.detach_edge(&key)
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> Option<E> {
        self.detach_edge(key)
    }

    fn detach_edge(&mut self, key: &EdgeKey) -> Option<E> {
        let ix = self.edge_ix.remove(key)?;
        let slot = self.edges[ix].take()?;
        if let Some(&v_ix) = self.node_ix.get(&slot.key.v) {
            if let Some(node) = self.nodes[v_ix].as_mut() {
                node.outs.retain(|&e| e != ix);
            }
        }
        if let Some(&w_ix) = self.node_ix.get(&slot.key.w) {
            if let Some(node) = self.nodes[w_ix].as_mut() {
                node.ins.retain(|&e| e != ix);
            }
        }
        Some(slot.label)
    }

    // ---- adjacency ----

    fn node_slot(&self, id: &str) -> Option<&NodeSlot<N>> {
        let &ix = self.node_ix.get(id)?;
        self.nodes[ix].as_ref()
    }

    pub fn out_edges(&self, v: &str, w: Option<&str>) -> Vec<EdgeKey> {
        let Some(slot) = self.node_slot(v) else {
            return Vec::new();
        };
        slot.outs
            .iter()
            .filter_map(|&ix| self.edges[ix].as_ref())
            .filter(|e| w.is_none_or(|w| e.key.w == w))
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn in_edges(&self, v: &str, u: Option<&str>) -> Vec<EdgeKey> {
        let Some(slot) = self.node_slot(v) else {
            return Vec::new();
        };
        slot.ins
            .iter()
            .filter_map(|&ix| self.edges[ix].as_ref())
            .filter(|e| u.is_none_or(|u| e.key.v == u))
            .map(|e| e.key.clone())
            .collect()
    }

    /// All incident edges, out-edges first, each self-loop reported once.
    pub fn node_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(slot) = self.node_slot(v) else {
            return Vec::new();
        };
        let mut out: Vec<EdgeKey> = Vec::with_capacity(slot.outs.len() + slot.ins.len());
        for &ix in &slot.outs {
            if let Some(e) = self.edges[ix].as_ref() {
                out.push(e.key.clone());
            }
        }
        for &ix in &slot.ins {
            if let Some(e) = self.edges[ix].as_ref() {
                if e.key.v != e.key.w {
                    out.push(e.key.clone());
                }
            }
        }
        out
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(slot) = self.node_slot(v) else {
            return Vec::new();
        };
        slot.outs
            .iter()
            .filter_map(|&ix| self.edges[ix].as_ref())
            .map(|e| e.key.w.as_str())
            .collect()
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        let Some(slot) = self.node_slot(v) else {
            return Vec::new();
        };
        slot.ins
            .iter()
            .filter_map(|&ix| self.edges[ix].as_ref())
            .map(|e| e.key.v.as_str())
            .collect()
    }

    /// Successors then predecessors, deduplicated, insertion order.
    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for w in self.successors(v) {
            if !out.contains(&w) {
                out.push(w);
            }
        }
        for u in self.predecessors(v) {
            if !out.contains(&u) {
                out.push(u);
            }
        }
        out
    }

    pub fn sources(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|slot| slot.as_ref())
            .filter(|slot| slot.ins.is_empty())
            .map(|slot| slot.id.as_str())
            .collect()
    }

    pub fn sinks(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|slot| slot.as_ref())
            .filter(|slot| slot.outs.is_empty())
            .map(|slot| slot.id.as_str())
            .collect()
    }

    // ---- compound forest ----

    /// Assigns `parent` as the container of `child`. Fails if the link would
    /// make the parent relation cyclic. No-op on non-compound graphs.
    pub fn set_parent(
        &mut self,
        child: impl Into<String>,
        parent: impl Into<String>,
    ) -> Result<(), GraphError> {
        if !self.options.compound {
            return Ok(());
        }
        let child = child.into();
        let parent = parent.into();

        let mut ancestor: Option<&str> = Some(parent.as_str());
        while let Some(a) = ancestor {
            if a == child {
                return Err(GraphError::ParentCycle { child, parent });
            }
            ancestor = self.parent.get(a).map(|s| s.as_str());
        }

        self.ensure_node(child.clone());
        self.ensure_node(parent.clone());
        if let Some(prev) = self.parent.insert(child.clone(), parent.clone()) {
            if let Some(siblings) = self.children.get_mut(&prev) {
                siblings.retain(|c| c != &child);
            }
        }
        let siblings = self.children.entry(parent).or_default();
        if !siblings.contains(&child) {
            siblings.push(child);
        }
        Ok(())
    }

    pub fn remove_parent(&mut self, child: &str) {
        if let Some(parent) = self.parent.remove(child) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| c != child);
            }
        }
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(|s| s.as_str())
    }

    pub fn children(&self, parent: &str) -> &[String] {
        self.children
            .get(parent)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    // ---- copies ----

    /// Structure-only snapshot: vertices, edges, and parent links carry over
    /// in insertion order; every label is defaulted. The copy's labels may be
    /// clobbered freely without touching this graph.
    pub fn copy_structure<N2, E2, G2>(&self) -> Graph<N2, E2, G2>
    where
        N2: Default,
        E2: Default,
        G2: Default,
    {
        let mut copy: Graph<N2, E2, G2> = Graph::new(self.options);
        for id in self.nodes() {
            copy.set_node(id, N2::default());
        }
        for key in self.edges() {
            copy.set_edge_named(
                key.v.clone(),
                key.w.clone(),
                key.name.clone(),
                Some(E2::default()),
            );
        }
        for slot in self.nodes.iter().filter_map(|s| s.as_ref()) {
            if let Some(parent) = self.parent.get(&slot.id) {
                // The source relation is a forest, so this cannot fail.
                let _ = copy.set_parent(slot.id.clone(), parent.clone());
            }
        }
        copy
    }
}

impl<N, E, G> Clone for Graph<N, E, G>
where
    N: Default + Clone,
    E: Default + Clone,
    G: Default + Clone,
{
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            label: self.label.clone(),
            nodes: self.nodes.clone(),
            node_ix: self.node_ix.clone(),
            edges: self.edges.clone(),
            edge_ix: self.edge_ix.clone(),
            parent: self.parent.clone(),
            children: self.children.clone(),
        }
    }
}
