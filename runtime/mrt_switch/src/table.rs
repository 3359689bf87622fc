//! Common dispatch-table contract.
//!
//! Every table maps a runtime value to an `i32` case index:
//!
//! - `0..len`: original position of the matching label
//! - `len`: no label matched
//! - [`NULL_INDEX`]: the target was null; the table is never consulted

use mrt_ir::{RuntimeError, RuntimeResult, Value};

/// Index reported for a null target.
pub const NULL_INDEX: i32 = -1;

/// A built, immutable dispatch table.
///
/// `dispatch` is the indexed lookup; `scan` walks the labels in case order.
/// Both must agree on every input, so a call site may start on `scan` and
/// relink to `dispatch` without observable change.
pub trait SwitchTable: Send + Sync + 'static {
    /// Number of case labels.
    fn label_count(&self) -> usize;

    /// Indexed lookup.
    fn dispatch(&self, target: &Value) -> i32;

    /// Linear lookup in case order.
    fn scan(&self, target: &Value) -> i32;

    /// Index reported when no label matches.
    #[inline]
    fn miss(&self) -> i32 {
        // Checked at build time by `case_count`.
        i32::try_from(self.label_count()).unwrap_or(i32::MAX)
    }
}

/// Label count as a case index, rejecting tables too large to index.
pub(crate) fn case_count(labels: &[Value]) -> RuntimeResult<i32> {
    i32::try_from(labels.len()).map_err(|_| {
        RuntimeError::invalid_labels(format!("{} labels exceed the index range", labels.len()))
    })
}

/// Reject a null label at `position`.
pub(crate) fn non_null(label: &Value, position: usize) -> RuntimeResult<&Value> {
    if label.is_null() {
        return Err(RuntimeError::invalid_labels(format!("null label at position {position}")));
    }
    Ok(label)
}

/// Case index of the label at `position` in a table of at most `i32::MAX` labels.
#[inline]
pub(crate) fn case_index(position: usize) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}
