//! String dispatch tables.
//!
//! Labels are sorted by hash code rather than lexically, so the first probe
//! is a binary search over `i32` hashes. A hit is confirmed by full equality.
//! When two labels share a hash the table records it at build time, and only
//! then does a failed confirmation fall back to scanning the run of entries
//! with that hash.

use std::sync::Arc;

use mrt_ir::{string_hash, RuntimeError, RuntimeResult, Value};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::table::{case_count, case_index, non_null, SwitchTable, NULL_INDEX};

/// Hash function used to order string labels.
pub type StringHasher = fn(&str) -> i32;

/// Hash-sorted table of string labels.
#[derive(Clone, Debug)]
pub struct StringTable {
    /// Labels in case order.
    cases: Box<[Arc<str>]>,
    /// Hashes in ascending order.
    hashes: Box<[i32]>,
    /// `labels[i]` has hash `hashes[i]`.
    labels: Box<[Arc<str>]>,
    /// `positions[i]` is the case index of `labels[i]`.
    positions: Box<[i32]>,
    collisions: bool,
    hasher: StringHasher,
}

impl StringTable {
    /// Build a table ordered by the runtime string hash.
    pub fn new(labels: &[Value]) -> RuntimeResult<Self> {
        Self::with_hasher(labels, string_hash)
    }

    /// Build a table ordered by `hasher`.
    ///
    /// # Errors
    ///
    /// `InvalidLabelSet` for a null or non-string label, or a repeated one.
    pub fn with_hasher(labels: &[Value], hasher: StringHasher) -> RuntimeResult<Self> {
        case_count(labels)?;

        let mut seen = FxHashSet::default();
        let cases = labels
            .iter()
            .enumerate()
            .map(|(position, label)| match non_null(label, position)? {
                Value::Str(s) if seen.insert(Arc::clone(s)) => Ok(Arc::clone(s)),
                Value::Str(s) => {
                    Err(RuntimeError::invalid_labels(format!("duplicate label {s:?}")))
                }
                other => Err(RuntimeError::invalid_labels(format!(
                    "label {other} at position {position} is not a string"
                ))),
            })
            .collect::<RuntimeResult<Box<[Arc<str>]>>>()?;

        let case_hashes: Vec<i32> = cases.iter().map(|s| hasher(s)).collect();
        let mut order: Vec<usize> = (0..cases.len()).collect();
        order.sort_by_key(|&position| case_hashes[position]);

        let hashes: Box<[i32]> = order.iter().map(|&position| case_hashes[position]).collect();
        let collisions = hashes.windows(2).any(|pair| pair[0] == pair[1]);

        debug!(labels = cases.len(), collisions, "built string dispatch table");
        Ok(StringTable {
            labels: order.iter().map(|&position| Arc::clone(&cases[position])).collect(),
            positions: order.iter().map(|&position| case_index(position)).collect(),
            cases,
            hashes,
            collisions,
            hasher,
        })
    }

    /// Whether two or more labels share a hash.
    #[inline]
    pub fn has_collisions(&self) -> bool {
        self.collisions
    }

    fn string_of<'v>(&self, target: &'v Value) -> Option<&'v str> {
        let s = target.as_str();
        debug_assert!(s.is_some(), "string switch dispatched on {target:?}");
        s
    }

    /// Case index of `s` among the entries hashing to `hash`, found at `hit`.
    fn probe_run(&self, s: &str, hash: i32, hit: usize) -> Option<i32> {
        if *self.labels[hit] == *s {
            return Some(self.positions[hit]);
        }
        if !self.collisions {
            return None;
        }
        let start = self.hashes[..hit]
            .iter()
            .rposition(|&h| h != hash)
            .map_or(0, |before| before + 1);
        let end = self.hashes[hit..]
            .iter()
            .position(|&h| h != hash)
            .map_or(self.hashes.len(), |after| hit + after);
        (start..end)
            .find(|&i| *self.labels[i] == *s)
            .map(|i| self.positions[i])
    }
}

impl SwitchTable for StringTable {
    fn label_count(&self) -> usize {
        self.cases.len()
    }

    fn dispatch(&self, target: &Value) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        let Some(s) = self.string_of(target) else {
            return self.miss();
        };
        let hash = (self.hasher)(s);
        match self.hashes.binary_search(&hash) {
            Ok(hit) => self.probe_run(s, hash, hit).unwrap_or_else(|| self.miss()),
            Err(_) => self.miss(),
        }
    }

    fn scan(&self, target: &Value) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        self.string_of(target)
            .and_then(|s| self.cases.iter().position(|case| **case == *s))
            .map_or_else(|| self.miss(), case_index)
    }
}
