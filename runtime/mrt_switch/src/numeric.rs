//! Numeric dispatch tables.
//!
//! Labels of one numeric kind are folded to `i64` keys, sorted, and searched
//! with a binary search; a permutation maps the sorted position back to the
//! label's case position.
//!
//! Folding is bit-preserving: int-like scalars (boolean, byte, short, char,
//! int) widen to `i64`, `float` goes through its 32-bit raw bits, `double`
//! through its 64-bit raw bits. Floating labels therefore match by bits, so
//! `NaN` matches a `NaN` label and `-0.0` does not match `0.0`.

use std::fmt;

use mrt_ir::{ClassId, PrimKind, RtType, RuntimeError, RuntimeResult, Value};
use tracing::debug;

use crate::table::{case_count, case_index, non_null, SwitchTable, NULL_INDEX};

/// Key family of a numeric switch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// boolean, byte, short, char and int.
    Int,
    /// long, plus any int-like value.
    Long,
    Float,
    Double,
}

impl NumericKind {
    /// Kind of a switch over values of type `ty` (scalar or boxed).
    pub fn of_type(ty: RtType) -> Option<NumericKind> {
        let kind = match ty {
            RtType::Prim(kind) => kind,
            RtType::Ref(class) => PrimKind::from_boxed(class)?,
        };
        Some(match kind {
            PrimKind::Boolean
            | PrimKind::Byte
            | PrimKind::Short
            | PrimKind::Char
            | PrimKind::Int => NumericKind::Int,
            PrimKind::Long => NumericKind::Long,
            PrimKind::Float => NumericKind::Float,
            PrimKind::Double => NumericKind::Double,
        })
    }

    /// The boxed class whose instances this kind dispatches on.
    pub fn boxed(self) -> ClassId {
        match self {
            NumericKind::Int => ClassId::INTEGER,
            NumericKind::Long => ClassId::LONG,
            NumericKind::Float => ClassId::FLOAT,
            NumericKind::Double => ClassId::DOUBLE,
        }
    }

    /// Folded key of `value`, or `None` when it is not of this kind.
    pub fn key(self, value: &Value) -> Option<i64> {
        match (self, value) {
            (NumericKind::Int, Value::Bool(b)) => Some(i64::from(*b)),
            (NumericKind::Int, Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_))
            | (NumericKind::Long, _) => value.integral(),
            (NumericKind::Float, Value::Float(x)) => {
                Some(i64::from(i32::from_ne_bytes(x.to_bits().to_ne_bytes())))
            }
            (NumericKind::Double, Value::Double(x)) => {
                Some(i64::from_ne_bytes(x.to_bits().to_ne_bytes()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericKind::Int => "int",
            NumericKind::Long => "long",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
        };
        f.write_str(name)
    }
}

/// Sorted-key table for one numeric kind.
#[derive(Clone, Debug)]
pub struct NumericTable {
    kind: NumericKind,
    /// Keys in case order.
    cases: Box<[i64]>,
    /// Keys in ascending order.
    sorted: Box<[i64]>,
    /// `positions[i]` is the case index of `sorted[i]`.
    positions: Box<[i32]>,
}

impl NumericTable {
    /// Build a table over `labels`.
    ///
    /// # Errors
    ///
    /// `InvalidLabelSet` for a null label, a label of another kind, or two
    /// labels with the same key.
    pub fn new(kind: NumericKind, labels: &[Value]) -> RuntimeResult<Self> {
        case_count(labels)?;

        let cases = labels
            .iter()
            .enumerate()
            .map(|(position, label)| {
                kind.key(non_null(label, position)?).ok_or_else(|| {
                    RuntimeError::invalid_labels(format!(
                        "label {label} at position {position} is not a {kind} constant"
                    ))
                })
            })
            .collect::<RuntimeResult<Box<[i64]>>>()?;

        let mut order: Vec<usize> = (0..cases.len()).collect();
        order.sort_unstable_by_key(|&position| cases[position]);

        if let Some(pair) = order.windows(2).find(|pair| cases[pair[0]] == cases[pair[1]]) {
            return Err(RuntimeError::invalid_labels(format!(
                "duplicate label {} at positions {} and {}",
                labels[pair[1]],
                pair[0].min(pair[1]),
                pair[0].max(pair[1])
            )));
        }

        let sorted = order.iter().map(|&position| cases[position]).collect();
        let positions = order.iter().map(|&position| case_index(position)).collect();

        debug!(%kind, labels = labels.len(), "built numeric dispatch table");
        Ok(NumericTable {
            kind,
            cases,
            sorted,
            positions,
        })
    }

    #[inline]
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    fn key_of(&self, target: &Value) -> Option<i64> {
        let key = self.kind.key(target);
        debug_assert!(key.is_some(), "{} switch dispatched on {target:?}", self.kind);
        key
    }
}

impl SwitchTable for NumericTable {
    fn label_count(&self) -> usize {
        self.cases.len()
    }

    fn dispatch(&self, target: &Value) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        let Some(key) = self.key_of(target) else {
            return self.miss();
        };
        match self.sorted.binary_search(&key) {
            Ok(found) => self.positions[found],
            Err(_) => self.miss(),
        }
    }

    fn scan(&self, target: &Value) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        self.key_of(target)
            .and_then(|key| self.cases.iter().position(|&case| case == key))
            .map_or_else(|| self.miss(), case_index)
    }
}
