//! Bidirectional vertex-to-rank table.
//!
//! Ranks are half-integers: warrant sources and sinks sit between the
//! integer layers of ordinary statements. Rows are keyed internally by the
//! rank doubled into integer units, so row ordering and equality never touch
//! floating-point comparison.

use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeMap;

/// Rank in half-layer units; `Key(3)` is rank 1.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Key(pub(crate) i32);

impl Key {
    pub(crate) fn from_rank(rank: f64) -> Self {
        Key((rank * 2.0).round() as i32)
    }

    pub(crate) fn rank(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RankTable {
    by_node: HashMap<String, Key>,
    rows: BTreeMap<Key, Vec<String>>,
}

impl RankTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `rank` to `v`, moving it out of any previous row. Re-setting
    /// the same rank keeps the vertex's position within its row.
    pub fn set(&mut self, v: impl Into<String>, rank: f64) {
        let v = v.into();
        let key = Key::from_rank(rank);
        if let Some(&prev) = self.by_node.get(&v) {
            if prev == key {
                return;
            }
            self.remove_from_row(&v, prev);
        }
        self.by_node.insert(v.clone(), key);
        self.rows.entry(key).or_default().push(v);
    }

    pub fn delete(&mut self, v: &str) {
        if let Some(key) = self.by_node.remove(v) {
            self.remove_from_row(v, key);
        }
    }

    fn remove_from_row(&mut self, v: &str, key: Key) {
        if let Some(row) = self.rows.get_mut(&key) {
            row.retain(|n| n != v);
            if row.is_empty() {
                self.rows.remove(&key);
            }
        }
    }

    pub fn rank(&self, v: &str) -> Option<f64> {
        self.by_node.get(v).map(|k| k.rank())
    }

    pub fn contains(&self, v: &str) -> bool {
        self.by_node.contains_key(v)
    }

    /// Vertices assigned exactly this rank, in assignment order.
    pub fn nodes(&self, rank: f64) -> &[String] {
        self.rows
            .get(&Key::from_rank(rank))
            .map(|row| row.as_slice())
            .unwrap_or(&[])
    }

    pub fn min_rank(&self) -> Option<f64> {
        self.rows.keys().next().map(|k| k.rank())
    }

    pub fn max_rank(&self) -> Option<f64> {
        self.rows.keys().next_back().map(|k| k.rank())
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// Rows in ascending rank order.
    pub fn rows(&self) -> impl Iterator<Item = (f64, &[String])> {
        self.rows.iter().map(|(k, row)| (k.rank(), row.as_slice()))
    }

}
