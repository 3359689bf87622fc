//! Typed callable handles.
//!
//! A `Handle` is a shared closure over `&[Value]` together with the
//! `Signature` it was declared with. Everything the runtime hands back to
//! generated code (carrier constructors and accessors, match attempts,
//! component extractors, dispatchers) is a `Handle`, and combinators build new
//! handles by capturing existing ones.
//!
//! Signatures are checked when a handle is built or composed, not when it is
//! invoked; `invoke` only carries a debug assertion on arity.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{RuntimeError, RuntimeResult};
use crate::ty::RtType;
use crate::value::Value;

/// Marker returned by a handle body that found the target does not hold the
/// shape it expected.
///
/// Zero-sized; returning it never allocates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoMatch;

/// Result of invoking a handle.
pub type HandleResult = Result<Value, NoMatch>;

type Body = dyn Fn(&[Value]) -> HandleResult + Send + Sync;

/// Declared parameter and return types of a handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    params: SmallVec<[RtType; 4]>,
    ret: RtType,
}

impl Signature {
    pub fn new(ret: RtType, params: impl IntoIterator<Item = RtType>) -> Self {
        Signature {
            params: params.into_iter().collect(),
            ret,
        }
    }

    /// `(param) -> ret`.
    pub fn unary(param: RtType, ret: RtType) -> Self {
        Signature::new(ret, [param])
    }

    #[inline]
    pub fn params(&self) -> &[RtType] {
        &self.params
    }

    #[inline]
    pub fn param(&self, index: usize) -> Option<RtType> {
        self.params.get(index).copied()
    }

    #[inline]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn ret(&self) -> RtType {
        self.ret
    }

    #[must_use]
    pub fn with_ret(&self, ret: RtType) -> Self {
        Signature {
            params: self.params.clone(),
            ret,
        }
    }

    #[must_use]
    pub fn with_param(&self, index: usize, ty: RtType) -> Self {
        let mut params = self.params.clone();
        if let Some(slot) = params.get_mut(index) {
            *slot = ty;
        }
        Signature {
            params,
            ret: self.ret,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// A typed, shareable callable.
#[derive(Clone)]
pub struct Handle {
    sig: Signature,
    body: Arc<Body>,
}

impl Handle {
    pub fn new<F>(sig: Signature, body: F) -> Self
    where
        F: Fn(&[Value]) -> HandleResult + Send + Sync + 'static,
    {
        Handle {
            sig,
            body: Arc::new(body),
        }
    }

    /// A single-parameter handle.
    pub fn unary<F>(param: RtType, ret: RtType, body: F) -> Self
    where
        F: Fn(&Value) -> HandleResult + Send + Sync + 'static,
    {
        Handle::new(Signature::unary(param, ret), move |args| match args {
            [arg] => body(arg),
            _ => Err(NoMatch),
        })
    }

    /// `(ty) -> ty`, returning its argument.
    pub fn identity(ty: RtType) -> Self {
        Handle::unary(ty, ty, |arg| Ok(arg.clone()))
    }

    /// A handle of the given signature that ignores its arguments.
    pub fn constant(sig: Signature, value: Value) -> Self {
        Handle::new(sig, move |_| Ok(value.clone()))
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.sig
    }

    /// Invoke the handle.
    pub fn invoke(&self, args: &[Value]) -> HandleResult {
        debug_assert_eq!(
            args.len(),
            self.sig.param_count(),
            "handle {} invoked with {} arguments",
            self.sig,
            args.len()
        );
        (self.body)(args)
    }

    /// Invoke a single-parameter handle.
    #[inline]
    pub fn invoke1(&self, arg: &Value) -> HandleResult {
        self.invoke(std::slice::from_ref(arg))
    }

    /// Same body under a different declared signature.
    ///
    /// The parameter count must be preserved.
    pub fn retype(&self, sig: Signature) -> RuntimeResult<Handle> {
        if sig.param_count() != self.sig.param_count() {
            return Err(RuntimeError::contract_mismatch(&sig, self.sig.to_string()));
        }
        Ok(Handle {
            sig,
            body: Arc::clone(&self.body),
        })
    }

    /// Whether both handles share one body.
    pub fn same_body(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle{}", self.sig)
    }
}

#[cfg(test)]
mod tests;
