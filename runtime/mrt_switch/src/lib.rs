//! Mrt Switch - dispatch tables for switch call sites.
//!
//! A table maps a runtime value to the case position of the label it
//! matches, `labels.len()` when none does, or `-1` for a null target. Tables
//! are built once per call site from the ordered label list, validated
//! eagerly, and immutable afterwards.
//!
//! # Tables
//!
//! - [`NumericTable`]: sorted folded keys, binary search
//! - [`StringTable`]: hash-sorted, equality-confirmed, collision-aware
//! - [`EnumTable`]: direct array over declaration ordinals
//! - [`EnumSwitch`]: enumeration cases with a restart index, for guards
//! - [`TypeSwitch`]: ordered class / constant tests with a restart index
//!
//! [`LazyCallSite`] wraps a table in a call site that starts on a linear scan
//! and links to the indexed lookup on its first invocation.

mod call_site;
mod enum_table;
mod numeric;
mod string;
mod table;
mod type_switch;

pub use call_site::{table_site, LazyCallSite, Linker};
pub use enum_table::{EnumSwitch, EnumTable};
pub use numeric::{NumericKind, NumericTable};
pub use string::{StringHasher, StringTable};
pub use table::{SwitchTable, NULL_INDEX};
pub use type_switch::{TypeLabel, TypeSwitch};
