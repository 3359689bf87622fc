//! Enumeration dispatch tables.
//!
//! A direct array indexed by declaration ordinal, sized to the whole
//! enumeration and filled with the miss index; each label name resolved
//! against the enumeration writes its case position into its ordinal's slot.
//! Names the enumeration does not declare are accepted and never match.
//!
//! [`EnumSwitch`] is the restartable form: labels are constant names or the
//! enumeration class itself, may repeat, and are scanned from a restart index
//! so a guarded case can fall through. Dispatch from case 0 uses the same
//! ordinal array.

use std::fmt;

use mrt_ir::{ClassId, ClassRegistry, RuntimeError, RuntimeResult, Value};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::table::{case_count, case_index, non_null, SwitchTable, NULL_INDEX};
use crate::type_switch::TypeLabel;

/// Ordinal-indexed table for one enumeration.
#[derive(Clone, Debug)]
pub struct EnumTable {
    class: ClassId,
    /// Resolved ordinal of each label in case order; `None` if unresolved.
    cases: Box<[Option<u32>]>,
    /// Case index per declaration ordinal.
    by_ordinal: Box<[i32]>,
}

impl EnumTable {
    /// Build a table over constant `names` of enumeration `class`.
    ///
    /// # Errors
    ///
    /// `InvalidLabelSet` when `class` is not an enumeration, or for a null,
    /// non-string or repeated name.
    pub fn new(class: ClassId, names: &[Value]) -> RuntimeResult<Self> {
        let miss = case_count(names)?;
        let registry = ClassRegistry::global();
        let info = registry.get(class);
        let Some(constants) = info.enum_constants() else {
            return Err(RuntimeError::invalid_labels(format!(
                "{} is not an enumeration",
                info.name
            )));
        };

        let mut seen = FxHashSet::default();
        let mut by_ordinal = vec![miss; constants.len()].into_boxed_slice();
        let mut cases = Vec::with_capacity(names.len());
        for (position, label) in names.iter().enumerate() {
            let Value::Str(name) = non_null(label, position)? else {
                return Err(RuntimeError::invalid_labels(format!(
                    "label {label} at position {position} is not a constant name"
                )));
            };
            if !seen.insert(&**name) {
                return Err(RuntimeError::invalid_labels(format!("duplicate label {name:?}")));
            }
            let ordinal = constants.iter().position(|constant| constant == name);
            match ordinal {
                Some(ordinal) => by_ordinal[ordinal] = case_index(position),
                None => trace!(enumeration = %info.name, %name, "label names no constant"),
            }
            cases.push(ordinal.and_then(|ordinal| u32::try_from(ordinal).ok()));
        }

        debug!(enumeration = %info.name, labels = names.len(), "built enum dispatch table");
        Ok(EnumTable {
            class,
            cases: cases.into_boxed_slice(),
            by_ordinal,
        })
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    fn ordinal_of(&self, target: &Value) -> Option<u32> {
        let ordinal = target
            .as_enum()
            .filter(|constant| constant.class == self.class)
            .map(|constant| constant.ordinal);
        debug_assert!(ordinal.is_some(), "enum switch dispatched on {target:?}");
        ordinal
    }
}

impl SwitchTable for EnumTable {
    fn label_count(&self) -> usize {
        self.cases.len()
    }

    fn dispatch(&self, target: &Value) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        self.ordinal_of(target)
            .and_then(|ordinal| self.by_ordinal.get(ordinal as usize).copied())
            .unwrap_or_else(|| self.miss())
    }

    fn scan(&self, target: &Value) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        self.ordinal_of(target)
            .and_then(|ordinal| self.cases.iter().position(|&case| case == Some(ordinal)))
            .map_or_else(|| self.miss(), case_index)
    }
}

/// One case of an [`EnumSwitch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EnumCase {
    Constant(u32),
    /// A name the enumeration does not declare.
    Unresolved,
    /// The enumeration class: matches every constant.
    Any,
}

impl EnumCase {
    #[inline]
    fn accepts(self, ordinal: u32) -> bool {
        match self {
            EnumCase::Constant(constant) => constant == ordinal,
            EnumCase::Unresolved => false,
            EnumCase::Any => true,
        }
    }
}

/// Restartable enumeration switch: `(constant, restart) -> case index`.
#[derive(Clone)]
pub struct EnumSwitch {
    class: ClassId,
    cases: Box<[EnumCase]>,
    /// Case index per declaration ordinal when scanning from case 0.
    first: Box<[i32]>,
}

impl EnumSwitch {
    /// Build a switch over `labels` for enumeration `class`.
    ///
    /// # Errors
    ///
    /// `InvalidLabelSet` when `class` is not an enumeration, for a class
    /// label naming any other class, or for an int label.
    pub fn new(class: ClassId, labels: &[TypeLabel]) -> RuntimeResult<Self> {
        let miss = i32::try_from(labels.len()).map_err(|_| {
            RuntimeError::invalid_labels(format!("{} labels exceed the index range", labels.len()))
        })?;
        let registry = ClassRegistry::global();
        let info = registry.get(class);
        let Some(constants) = info.enum_constants() else {
            return Err(RuntimeError::invalid_labels(format!(
                "{} is not an enumeration",
                info.name
            )));
        };

        let cases = labels
            .iter()
            .enumerate()
            .map(|(position, label)| match label {
                TypeLabel::Str(name) => Ok(constants
                    .iter()
                    .position(|constant| constant == name)
                    .and_then(|ordinal| u32::try_from(ordinal).ok())
                    .map_or_else(
                        || {
                            trace!(enumeration = %info.name, %name, "label names no constant");
                            EnumCase::Unresolved
                        },
                        EnumCase::Constant,
                    )),
                TypeLabel::Class(other) if *other == class => Ok(EnumCase::Any),
                other => Err(RuntimeError::invalid_labels(format!(
                    "label {other} at position {position} is not a constant name or {}.class",
                    info.name
                ))),
            })
            .collect::<RuntimeResult<Box<[EnumCase]>>>()?;

        let first = (0..constants.len())
            .map(|ordinal| {
                u32::try_from(ordinal)
                    .ok()
                    .and_then(|ordinal| cases.iter().position(|case| case.accepts(ordinal)))
                    .map_or(miss, case_index)
            })
            .collect();

        debug!(enumeration = %info.name, labels = labels.len(), "built restartable enum switch");
        Ok(EnumSwitch { class, cases, first })
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn label_count(&self) -> usize {
        self.cases.len()
    }

    #[inline]
    fn miss(&self) -> i32 {
        case_index(self.cases.len())
    }

    fn ordinal_of(&self, target: &Value) -> Option<u32> {
        let ordinal = target
            .as_enum()
            .filter(|constant| constant.class == self.class)
            .map(|constant| constant.ordinal);
        debug_assert!(ordinal.is_some(), "enum switch dispatched on {target:?}");
        ordinal
    }

    /// First case at or after `restart` that `target` matches, in case order.
    pub fn scan(&self, target: &Value, restart: usize) -> i32 {
        if target.is_null() {
            return NULL_INDEX;
        }
        self.ordinal_of(target)
            .and_then(|ordinal| {
                self.cases
                    .iter()
                    .enumerate()
                    .skip(restart)
                    .find(|(_, case)| case.accepts(ordinal))
            })
            .map_or_else(|| self.miss(), |(position, _)| case_index(position))
    }

    /// Same result as [`EnumSwitch::scan`]; a switch entered at case 0 reads
    /// the ordinal array.
    pub fn dispatch(&self, target: &Value, restart: usize) -> i32 {
        if restart != 0 || target.is_null() {
            return self.scan(target, restart);
        }
        self.ordinal_of(target)
            .and_then(|ordinal| self.first.get(ordinal as usize).copied())
            .unwrap_or_else(|| self.miss())
    }
}

impl fmt::Debug for EnumSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumSwitch")
            .field("class", &ClassRegistry::global().name(self.class))
            .field("cases", &self.cases)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
