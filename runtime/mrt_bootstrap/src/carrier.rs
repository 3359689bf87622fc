//! Carrier entry points.

use mrt_carrier::carrier_elements;
use mrt_ir::{RtType, RuntimeResult, Signature};
use tracing::debug;

use crate::CallSite;

/// Constructor site for a carrier over `types`.
///
/// The invocation type must be `(types...) -> Carrier`.
pub fn carrier(invocation: &Signature, types: &[RtType]) -> RuntimeResult<CallSite> {
    let elements = carrier_elements(types)?;
    debug!(%invocation, shape = %elements.shape(), "bootstrapping carrier constructor");
    CallSite::checked(invocation, elements.constructor().clone())
}

/// Accessor site for component `index` of a carrier over `types`.
///
/// The invocation type must be `(Carrier) -> types[index]`.
pub fn carrier_component(
    invocation: &Signature,
    types: &[RtType],
    index: usize,
) -> RuntimeResult<CallSite> {
    CallSite::checked(invocation, mrt_carrier::component(types, index)?)
}
