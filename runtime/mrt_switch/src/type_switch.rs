//! Type switches.
//!
//! Case labels are classes, string constants or int constants. Dispatch
//! scans from a restart index and reports the first label the target
//! satisfies: a class label when the target is an instance of it, a string
//! label when the target equals it, an int label when the target is an
//! int-like scalar with that value. Restarting past a label lets a guarded
//! case fall through to the cases after it.
//!
//! Labels may repeat (a guarded case and an unguarded one for the same type)
//! and are never reordered.
//!
//! When every label is a class, the result depends only on the target's
//! runtime class and the restart index, and is memoized per pair in a
//! concurrent map.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use mrt_ir::{ClassId, ClassRegistry, PrimKind, RuntimeError, RuntimeResult, Value};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use tracing::debug;

use crate::table::{case_index, NULL_INDEX};

/// One type-switch case label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeLabel {
    /// Matches instances of the class (an enumeration class matches all its
    /// constants).
    Class(ClassId),
    Str(Arc<str>),
    Int(i32),
}

impl TypeLabel {
    fn accepts(&self, target: &Value) -> bool {
        match self {
            TypeLabel::Class(class) => target.is_instance_of(*class),
            TypeLabel::Str(s) => target.as_str() == Some(&**s),
            TypeLabel::Int(n) => match target.prim_kind() {
                Some(PrimKind::Byte | PrimKind::Short | PrimKind::Char | PrimKind::Int) => {
                    target.integral() == Some(i64::from(*n))
                }
                _ => false,
            },
        }
    }
}

impl TryFrom<&Value> for TypeLabel {
    type Error = RuntimeError;

    /// Constant labels; classes are given as [`TypeLabel::Class`] directly.
    fn try_from(value: &Value) -> RuntimeResult<Self> {
        match value {
            Value::Str(s) => Ok(TypeLabel::Str(Arc::clone(s))),
            Value::Int(n) => Ok(TypeLabel::Int(*n)),
            Value::Null => Err(RuntimeError::invalid_labels("null label")),
            other => Err(RuntimeError::invalid_labels(format!(
                "label {other} of type {} is not a class, string or int",
                other.type_name()
            ))),
        }
    }
}

impl From<ClassId> for TypeLabel {
    fn from(class: ClassId) -> Self {
        TypeLabel::Class(class)
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeLabel::Class(class) => write!(f, "{}.class", ClassRegistry::global().name(*class)),
            TypeLabel::Str(s) => write!(f, "{s:?}"),
            TypeLabel::Int(n) => write!(f, "{n}"),
        }
    }
}

type Memo = DashMap<(ClassId, usize), i32, FxBuildHasher>;

/// A built type switch.
#[derive(Debug)]
pub struct TypeSwitch {
    labels: SmallVec<[TypeLabel; 8]>,
    /// Present only when every label is a class. Keyed by runtime class and
    /// restart index clamped to the label count.
    memo: Option<Memo>,
}

impl TypeSwitch {
    /// Build a switch over `labels`.
    pub fn new(labels: impl IntoIterator<Item = TypeLabel>) -> RuntimeResult<Self> {
        let labels: SmallVec<[TypeLabel; 8]> = labels.into_iter().collect();
        if i32::try_from(labels.len()).is_err() {
            return Err(RuntimeError::invalid_labels(format!(
                "{} labels exceed the index range",
                labels.len()
            )));
        }
        let class_only = labels.iter().all(|label| matches!(label, TypeLabel::Class(_)));
        debug!(labels = labels.len(), class_only, "built type switch");
        Ok(TypeSwitch {
            labels,
            memo: class_only.then(|| DashMap::with_hasher(FxBuildHasher)),
        })
    }

    /// Build a switch over constant label values.
    ///
    /// # Errors
    ///
    /// `InvalidLabelSet` for a null label or one that is neither a string
    /// nor an int.
    pub fn from_values(labels: &[Value]) -> RuntimeResult<Self> {
        let labels = labels
            .iter()
            .enumerate()
            .map(|(position, label)| {
                TypeLabel::try_from(label).map_err(|err| match err {
                    RuntimeError::InvalidLabelSet { reason } => {
                        RuntimeError::invalid_labels(format!("{reason} at position {position}"))
                    }
                    other => other,
                })
            })
            .collect::<RuntimeResult<Vec<_>>>()?;
        Self::new(labels)
    }

    #[inline]
    pub fn labels(&self) -> &[TypeLabel] {
        &self.labels
    }

    #[inline]
    pub fn is_class_only(&self) -> bool {
        self.memo.is_some()
    }

    #[inline]
    fn miss(&self) -> i32 {
        case_index(self.labels.len())
    }

    /// First label at or after `restart` that `target` satisfies, without
    /// consulting the memo.
    pub fn scan(&self, target: &Value, restart: usize) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        self.labels
            .iter()
            .enumerate()
            .skip(restart)
            .find(|(_, label)| label.accepts(target))
            .map_or_else(|| self.miss(), |(position, _)| case_index(position))
    }

    /// Same result as [`TypeSwitch::scan`], memoized per runtime class when
    /// the switch has only class labels.
    pub fn dispatch(&self, target: &Value, restart: usize) -> i32 {
        let (Some(memo), Some(class)) = (&self.memo, target.class_of()) else {
            return self.scan(target, restart);
        };
        // Every restart past the last label misses.
        let key = (class, restart.min(self.labels.len()));
        if let Some(index) = memo.get(&key) {
            return *index;
        }
        let index = self.scan(target, key.1);
        memo.insert(key, index);
        index
    }
}

#[cfg(test)]
mod tests;
