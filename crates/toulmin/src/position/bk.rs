//! Brandes-Koepf horizontal placement primitives: conflict marking,
//! vertical alignment into blocks, and block compaction with class shifts.

use crate::model::{DummyKind, LayoutGraph};
use rustc_hash::FxHashMap as HashMap;

/// Marks type-1 conflicts on edges: a non-inner edge crossing an inner
/// segment (dummy-to-dummy) loses its eligibility for vertical alignment.
/// The south row is scanned keeping the window of north positions covered by
/// the most recent inner segment; any edge reaching outside the window is
/// conflicted.
pub fn mark_type1_conflicts(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    for i in 1..layering.len() {
        let north = &layering[i - 1];
        let south = &layering[i];
        let north_pos: HashMap<&str, usize> = north
            .iter()
            .enumerate()
            .map(|(p, id)| (id.as_str(), p))
            .collect();

        let mut k0 = 0usize;
        let mut scan_start = 0usize;
        let last = south.last().map(|s| s.as_str());

        let mut marks: Vec<(String, String)> = Vec::new();
        for (idx, v) in south.iter().enumerate() {
            let inner_north = inner_segment_north(g, v)
                .filter(|w| north_pos.contains_key(w.as_str()));
            let is_boundary = inner_north.is_some() || last == Some(v.as_str());
            if !is_boundary {
                continue;
            }
            let k1 = inner_north
                .as_deref()
                .and_then(|w| north_pos.get(w).copied())
                .unwrap_or(north.len());

            for scan_node in &south[scan_start..=idx] {
                let scan_dummy = is_edge_dummy(g, scan_node);
                for u in g.predecessors(scan_node) {
                    let Some(&u_pos) = north_pos.get(u) else {
                        continue;
                    };
                    let u_dummy = is_edge_dummy(g, u);
                    if (u_pos < k0 || k1 < u_pos) && !(u_dummy && scan_dummy) {
                        marks.push((u.to_string(), scan_node.clone()));
                    }
                }
            }
            scan_start = idx + 1;
            k0 = k1;
        }

        for (u, v) in marks {
            mark_conflicted(g, &u, &v);
        }
    }
}

fn is_edge_dummy(g: &LayoutGraph, v: &str) -> bool {
    g.node(v).is_some_and(|n| n.dummy == Some(DummyKind::Edge))
}

/// North endpoint of the inner segment ending at `v`, if `v` is a chain
/// dummy aligned with another chain dummy above it.
fn inner_segment_north(g: &LayoutGraph, v: &str) -> Option<String> {
    if !is_edge_dummy(g, v) {
        return None;
    }
    g.predecessors(v)
        .into_iter()
        .find(|u| is_edge_dummy(g, u))
        .map(str::to_string)
}

pub fn mark_conflicted(g: &mut LayoutGraph, a: &str, b: &str) {
    for key in g.out_edges(a, Some(b)).into_iter().chain(g.out_edges(b, Some(a))) {
        if let Some(label) = g.edge_mut_by_key(&key) {
            label.conflicted = true;
        }
    }
}

pub fn has_conflict(g: &LayoutGraph, a: &str, b: &str) -> bool {
    g.out_edges(a, Some(b))
        .into_iter()
        .chain(g.out_edges(b, Some(a)))
        .any(|key| g.edge_by_key(&key).is_some_and(|l| l.conflicted))
}

#[derive(Debug, Clone)]
pub struct Alignment {
    /// Block root of every vertex.
    pub root: HashMap<String, String>,
    /// Next vertex in the block; following it from the root cycles back.
    pub align: HashMap<String, String>,
}

/// Aligns each vertex with the median eligible neighbor in the previous row
/// of `layering` (already adjusted for the sweep direction). Neighbors come
/// from predecessors for downward sweeps and successors for upward ones.
pub fn vertical_alignment(
    g: &LayoutGraph,
    layering: &[Vec<String>],
    use_predecessors: bool,
) -> Alignment {
    let mut root: HashMap<String, String> = HashMap::default();
    let mut align: HashMap<String, String> = HashMap::default();
    let mut pos: HashMap<String, usize> = HashMap::default();
    let mut row_of: HashMap<String, usize> = HashMap::default();

    for (li, layer) in layering.iter().enumerate() {
        for (p, v) in layer.iter().enumerate() {
            root.insert(v.clone(), v.clone());
            align.insert(v.clone(), v.clone());
            pos.insert(v.clone(), p);
            row_of.insert(v.clone(), li);
        }
    }

    for (li, layer) in layering.iter().enumerate() {
        if li == 0 {
            continue;
        }
        let mut prev_idx: isize = -1;
        for v in layer {
            let mut ws: Vec<String> = if use_predecessors {
                g.predecessors(v).into_iter().map(str::to_string).collect()
            } else {
                g.successors(v).into_iter().map(str::to_string).collect()
            };
            ws.retain(|w| row_of.get(w).copied() == Some(li - 1));
            if ws.is_empty() {
                continue;
            }
            ws.sort_by_key(|w| pos.get(w).copied().unwrap_or(usize::MAX));

            let mid = (ws.len() - 1) as f64 / 2.0;
            let lo = mid.floor() as usize;
            let hi = mid.ceil() as usize;
            for w in &ws[lo..=hi] {
                let v_align = align.get(v).cloned().unwrap_or_else(|| v.clone());
                let w_pos = pos.get(w).copied().unwrap_or(usize::MAX) as isize;
                if v_align == *v && prev_idx < w_pos && !has_conflict(g, v, w) {
                    align.insert(w.clone(), v.clone());
                    let w_root = root.get(w).cloned().unwrap_or_else(|| w.clone());
                    align.insert(v.clone(), w_root.clone());
                    root.insert(v.clone(), w_root);
                    prev_idx = w_pos;
                }
            }
        }
    }

    Alignment { root, align }
}

/// Places every block by longest path over its row predecessors. Blocks in
/// the same class pack against each other directly; a block meeting a
/// different class folds the clearance into that class sink's shift, applied
/// afterwards to every member.
pub fn horizontal_compaction(
    g: &LayoutGraph,
    layering: &[Vec<String>],
    alignment: &Alignment,
    nodesep: f64,
) -> HashMap<String, f64> {
    let root = &alignment.root;
    let align = &alignment.align;

    let mut pos: HashMap<&str, usize> = HashMap::default();
    let mut row_of: HashMap<&str, usize> = HashMap::default();
    for (li, layer) in layering.iter().enumerate() {
        for (p, v) in layer.iter().enumerate() {
            pos.insert(v.as_str(), p);
            row_of.insert(v.as_str(), li);
        }
    }

    fn pred_of<'a>(
        layering: &'a [Vec<String>],
        pos: &HashMap<&str, usize>,
        row_of: &HashMap<&str, usize>,
        w: &str,
    ) -> Option<&'a str> {
        let p = *pos.get(w)?;
        if p == 0 {
            return None;
        }
        let row = *row_of.get(w)?;
        Some(layering[row][p - 1].as_str())
    }
    let width = |v: &str| g.node(v).map(|n| n.width).unwrap_or(0.0);

    let mut sink: HashMap<String, String> = HashMap::default();
    let mut shift: HashMap<String, f64> = HashMap::default();
    let mut xs: HashMap<String, f64> = HashMap::default();
    for v in root.values() {
        sink.entry(v.clone()).or_insert_with(|| v.clone());
        shift.entry(v.clone()).or_insert(f64::INFINITY);
    }

    let members = |block: &str| -> Vec<String> {
        let mut out = vec![block.to_string()];
        let mut w = align.get(block).cloned().unwrap_or_else(|| block.to_string());
        while w != block {
            out.push(w.clone());
            w = align.get(&w).cloned().unwrap_or_else(|| block.to_string());
        }
        out
    };

    let roots: Vec<String> = {
        let mut seen: Vec<String> = Vec::new();
        for layer in layering {
            for v in layer {
                let r = root.get(v).cloned().unwrap_or_else(|| v.clone());
                if !seen.contains(&r) {
                    seen.push(r);
                }
            }
        }
        seen
    };

    for start in &roots {
        if xs.contains_key(start) {
            continue;
        }
        let mut stack: Vec<(String, bool)> = vec![(start.clone(), false)];
        while let Some((block, expanded)) = stack.pop() {
            if xs.contains_key(&block) {
                continue;
            }
            if !expanded {
                stack.push((block.clone(), true));
                for w in members(&block) {
                    let Some(p) = pred_of(layering, &pos, &row_of, &w) else {
                        continue;
                    };
                    let u = root.get(p).cloned().unwrap_or_else(|| p.to_string());
                    if !xs.contains_key(&u) {
                        stack.push((u, false));
                    }
                }
                continue;
            }

            let mut x = 0.0f64;
            for w in members(&block) {
                let Some(p) = pred_of(layering, &pos, &row_of, &w) else {
                    continue;
                };
                let u = root.get(p).cloned().unwrap_or_else(|| p.to_string());
                let Some(&u_x) = xs.get(&u) else {
                    continue;
                };
                let sep = nodesep + (width(p) + width(&w)) / 2.0;

                let block_sink = sink.get(&block).cloned().unwrap_or_else(|| block.clone());
                let u_sink = sink.get(&u).cloned().unwrap_or_else(|| u.clone());
                if block_sink == block {
                    sink.insert(block.clone(), u_sink.clone());
                }
                let block_sink = sink.get(&block).cloned().unwrap_or_else(|| block.clone());
                if block_sink != u_sink {
                    let entry = shift.entry(u_sink).or_insert(f64::INFINITY);
                    *entry = entry.min(x - u_x - sep);
                } else {
                    x = x.max(u_x + sep);
                }
            }
            xs.insert(block, x);
        }
    }

    let mut out: HashMap<String, f64> = HashMap::default();
    for layer in layering {
        for v in layer {
            let r = root.get(v).cloned().unwrap_or_else(|| v.clone());
            let mut x = xs.get(&r).copied().unwrap_or(0.0);
            let s = sink.get(&r).cloned().unwrap_or_else(|| r.clone());
            if let Some(&delta) = shift.get(&s) {
                if delta.is_finite() {
                    x += delta;
                }
            }
            out.insert(v.clone(), x);
        }
    }
    out
}

/// Width of an assignment: bounding extent over every vertex box.
pub fn assignment_width(g: &LayoutGraph, xs: &HashMap<String, f64>) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (v, &x) in xs {
        let half = g.node(v).map(|n| n.width / 2.0).unwrap_or(0.0);
        min = min.min(x - half);
        max = max.max(x + half);
    }
    if min.is_finite() {
        max - min
    } else {
        0.0
    }
}
