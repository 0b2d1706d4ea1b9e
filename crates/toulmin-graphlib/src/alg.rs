//! Small traversal helpers shared by the layout engine and tests.

use crate::Graph;
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;

/// Depth-first postorder over undirected adjacency, visiting each vertex
/// once. Multiple roots yield a forest traversal in root order.
pub fn postorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    dfs(g, roots, true)
}

/// Depth-first preorder over undirected adjacency.
pub fn preorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    dfs(g, roots, false)
}

fn dfs<N, E, G>(g: &Graph<N, E, G>, roots: &[&str], post: bool) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    let mut out: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::default();

    for root in roots {
        if visited.contains(*root) || !g.has_node(root) {
            continue;
        }
        // (vertex, expanded) pairs make the postorder emission explicit
        // without recursion.
        let mut stack: Vec<(String, bool)> = vec![(root.to_string(), false)];
        while let Some((v, expanded)) = stack.pop() {
            if expanded {
                out.push(v);
                continue;
            }
            if !visited.insert(v.clone()) {
                continue;
            }
            if post {
                stack.push((v.clone(), true));
            } else {
                out.push(v.clone());
            }
            let neighbors = g.neighbors(&v);
            for w in neighbors.into_iter().rev() {
                if !visited.contains(w) {
                    stack.push((w.to_string(), false));
                }
            }
        }
    }
    out
}

/// Kahn's algorithm; self-loops count as cycles.
pub fn is_acyclic<N, E, G>(g: &Graph<N, E, G>) -> bool
where
    N: Default,
    E: Default,
    G: Default,
{
    let ids = g.node_ids();
    let mut indegree: std::collections::HashMap<&str, usize> =
        ids.iter().map(|id| (id.as_str(), 0)).collect();
    for e in g.edges() {
        if e.v == e.w {
            return false;
        }
        if let Some(d) = indegree.get_mut(e.w.as_str()) {
            *d += 1;
        }
    }

    let mut queue: VecDeque<&str> = ids
        .iter()
        .map(|id| id.as_str())
        .filter(|id| indegree[id] == 0)
        .collect();
    let mut seen = 0usize;
    while let Some(v) = queue.pop_front() {
        seen += 1;
        for w in g.successors(v) {
            if let Some(d) = indegree.get_mut(w) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(w);
                }
            }
        }
    }
    seen == g.node_count()
}
