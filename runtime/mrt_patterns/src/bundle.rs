//! Match carriers for a list of binding types.
//!
//! How the bindings of a successful match travel from `try_match` to the
//! components depends on how many there are:
//!
//! - none: a shared non-null token
//! - one: the binding itself, with `null` replaced by a private sentinel so
//!   that a null binding is still a successful (non-null) carrier; a value
//!   the binding type does not accept is rejected
//! - several: a carrier from `mrt_carrier`

use std::sync::OnceLock;

use mrt_carrier::carrier_elements;
use mrt_ir::{ClassId, Handle, NoMatch, RtType, RuntimeResult, Signature, Value};

static NULL_SENTINEL: OnceLock<Value> = OnceLock::new();

/// The carrier that stands for a matched `null`.
pub(crate) fn null_sentinel() -> &'static Value {
    NULL_SENTINEL.get_or_init(|| Value::opaque(ClassId::OBJECT, NullSentinel))
}

#[derive(Debug)]
struct NullSentinel;

/// Replace `null` by the sentinel.
pub(crate) fn wrap_null(value: &Value) -> Value {
    if value.is_null() {
        null_sentinel().clone()
    } else {
        value.clone()
    }
}

/// Replace the sentinel by `null`.
pub(crate) fn unwrap_null(carrier: &Value) -> Value {
    if carrier.equals(null_sentinel()) {
        Value::Null
    } else {
        carrier.clone()
    }
}

/// Constructor and components of the match carrier for a binding list.
pub(crate) struct Bundle {
    carrier_type: RtType,
    constructor: Handle,
    components: Vec<Handle>,
}

impl Bundle {
    pub(crate) fn of(bindings: &[RtType]) -> RuntimeResult<Bundle> {
        match bindings {
            [] => Ok(Bundle {
                carrier_type: RtType::OBJECT,
                constructor: Handle::constant(
                    Signature::new(RtType::OBJECT, []),
                    Value::Bool(true),
                ),
                components: Vec::new(),
            }),
            [single] => {
                let ty = *single;
                Ok(Bundle {
                    carrier_type: RtType::OBJECT,
                    constructor: Handle::unary(ty, RtType::OBJECT, move |v| {
                        if ty.accepts(v) {
                            Ok(wrap_null(v))
                        } else {
                            Err(NoMatch)
                        }
                    }),
                    components: vec![Handle::unary(RtType::OBJECT, ty, |c| Ok(unwrap_null(c)))],
                })
            }
            _ => {
                let elements = carrier_elements(bindings)?;
                Ok(Bundle {
                    carrier_type: RtType::CARRIER,
                    constructor: elements.constructor().clone(),
                    components: elements.accessors().to_vec(),
                })
            }
        }
    }

    #[inline]
    pub(crate) fn carrier_type(&self) -> RtType {
        self.carrier_type
    }

    /// `(bindings...) -> carrier`.
    #[inline]
    pub(crate) fn constructor(&self) -> &Handle {
        &self.constructor
    }

    /// Bundle binding values into a carrier.
    ///
    /// Values that do not fit the declared binding types produce `NoMatch`.
    pub(crate) fn construct(&self, values: &[Value]) -> Result<Value, NoMatch> {
        if values.len() != self.constructor.signature().param_count() {
            return Err(NoMatch);
        }
        self.constructor.invoke(values)
    }

    /// `(carrier) -> binding i`.
    #[inline]
    pub(crate) fn components(&self) -> &[Handle] {
        &self.components
    }
}

#[cfg(test)]
mod tests;
