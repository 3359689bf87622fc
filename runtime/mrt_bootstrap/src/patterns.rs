//! Pattern entry points.
//!
//! A pattern handle reduces to two kinds of callable: the match attempt and
//! one component extractor per binding. Generated code links each of them
//! into its own call site.

use mrt_ir::{RuntimeResult, Signature};
use mrt_patterns::PatternHandle;

use crate::CallSite;

/// Match-attempt site of `pattern`: `(target) -> carrier`.
pub fn match_attempt_of(
    invocation: &Signature,
    pattern: &PatternHandle,
) -> RuntimeResult<CallSite> {
    CallSite::checked(invocation, pattern.try_match().clone())
}

/// Extractor site for binding `index` of `pattern`: `(carrier) -> binding`.
///
/// # Errors
///
/// `ComponentOutOfBounds` for a bad index, `ContractMismatch` when the
/// invocation type is not the extractor's.
pub fn component_of(
    invocation: &Signature,
    pattern: &PatternHandle,
    index: usize,
) -> RuntimeResult<CallSite> {
    CallSite::checked(invocation, pattern.component(index)?.clone())
}
