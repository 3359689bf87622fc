//! Mrt IR - shared vocabulary of the match runtime.
//!
//! This crate provides:
//! - The managed-environment type model (`PrimKind`, `RtType`, `ClassId`, `ClassRegistry`)
//! - Runtime values (`Value`, `Instance`, `EnumConst`, `Opaque`)
//! - Typed callable handles (`Handle`, `Signature`, `NoMatch`)
//! - The error taxonomy shared by every runtime crate (`RuntimeError`, `ErrorCode`)
//! - Process-wide configuration (`RuntimeConfig`)
//!
//! # Architecture
//!
//! Everything the front-end hands to the runtime is expressed in these types:
//! carriers, pattern handles and dispatch tables are all built from `Handle`s
//! whose `Signature`s are checked eagerly, so a malformed request fails at
//! construction time rather than at match time.

mod class;
mod config;
mod error;
mod handle;
mod ty;
mod value;

pub use class::{
    ClassDef, ClassFlags, ClassId, ClassInfo, ClassKind, ClassRegistry, RecordComponent,
};
pub use config::{RuntimeConfig, MAX_SPECIALIZE_LIMIT};
pub use error::{ErrorCode, RuntimeError, RuntimeResult};
pub use handle::{Handle, HandleResult, NoMatch, Signature};
pub use ty::{PrimKind, RtType};
pub use value::{string_hash, EnumConst, Instance, Opaque, Value};
