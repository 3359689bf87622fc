//! Pattern handles and their descriptors.
//!
//! A `PatternHandle` reduces any pattern to two callable artifacts:
//!
//! - `try_match`: `(target) -> carrier`, returning `Null` when the target
//!   does not match and a non-null carrier otherwise
//! - `components[i]`: `(carrier) -> binding i`
//!
//! The pairing is checked once, in [`PatternHandle::new`]; a handle that
//! exists is always well-formed. Reference-typed carriers are normalized to
//! `Object` so handles over different carrier shapes are interchangeable.

use std::fmt;
use std::sync::Arc;

use mrt_ir::{Handle, NoMatch, RtType, RuntimeError, RuntimeResult, Value};
use smallvec::SmallVec;

/// Binding values produced by one successful match.
pub type Bindings = SmallVec<[Value; 4]>;

/// Target type and ordered binding types of a pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    target: RtType,
    bindings: SmallVec<[RtType; 4]>,
}

impl Descriptor {
    pub fn new(target: RtType, bindings: impl IntoIterator<Item = RtType>) -> Self {
        Descriptor {
            target,
            bindings: bindings.into_iter().collect(),
        }
    }

    #[inline]
    pub fn target(&self) -> RtType {
        self.target
    }

    #[inline]
    pub fn bindings(&self) -> &[RtType] {
        &self.bindings
    }

    #[inline]
    pub fn binding(&self, index: usize) -> Option<RtType> {
        self.bindings.get(index).copied()
    }

    #[inline]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn with_target(&self, target: RtType) -> Self {
        Descriptor {
            target,
            bindings: self.bindings.clone(),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.target)?;
        for (i, binding) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{binding}")?;
        }
        write!(f, ")")
    }
}

/// A match-and-extract unit.
#[derive(Clone, Debug)]
pub struct PatternHandle {
    descriptor: Descriptor,
    try_match: Handle,
    components: Arc<[Handle]>,
}

impl PatternHandle {
    /// Pair a match attempt with its component extractors.
    ///
    /// # Errors
    ///
    /// `IllegalDescriptor` unless all of the following hold:
    /// - there is one component per binding
    /// - `try_match` takes exactly the target type
    /// - every component takes exactly the carrier type `try_match` returns
    /// - component `i` returns binding type `i`
    pub fn new(
        descriptor: Descriptor,
        try_match: Handle,
        components: Vec<Handle>,
    ) -> RuntimeResult<PatternHandle> {
        let illegal = |reason: String| RuntimeError::IllegalDescriptor {
            descriptor: descriptor.to_string(),
            reason,
        };

        if components.len() != descriptor.binding_count() {
            return Err(illegal(format!(
                "{} bindings but {} components",
                descriptor.binding_count(),
                components.len()
            )));
        }

        let match_sig = try_match.signature();
        if match_sig.param_count() != 1 || match_sig.param(0) != Some(descriptor.target()) {
            return Err(illegal(format!(
                "match attempt {match_sig} does not take the target type"
            )));
        }

        let carrier_type = match_sig.ret();
        for (i, component) in components.iter().enumerate() {
            let sig = component.signature();
            if sig.param_count() != 1 || sig.param(0) != Some(carrier_type) {
                return Err(illegal(format!(
                    "component {i} {sig} does not take the carrier type {carrier_type}"
                )));
            }
            if Some(sig.ret()) != descriptor.binding(i) {
                return Err(illegal(format!(
                    "component {i} {sig} does not return the binding type"
                )));
            }
        }

        let erased = carrier_type.is_primitive() || carrier_type == RtType::OBJECT;
        let (try_match, components) = if erased {
            (try_match, components)
        } else {
            let try_match = try_match.retype(match_sig.with_ret(RtType::OBJECT))?;
            let components = components
                .iter()
                .map(|c| c.retype(c.signature().with_param(0, RtType::OBJECT)))
                .collect::<RuntimeResult<Vec<_>>>()?;
            (try_match, components)
        };

        Ok(PatternHandle {
            descriptor,
            try_match,
            components: components.into(),
        })
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// `(target) -> carrier`; `Null` means no match.
    #[inline]
    pub fn try_match(&self) -> &Handle {
        &self.try_match
    }

    #[inline]
    pub fn components(&self) -> &[Handle] {
        &self.components
    }

    /// `(carrier) -> binding index`.
    pub fn component(&self, index: usize) -> RuntimeResult<&Handle> {
        self.components
            .get(index)
            .ok_or(RuntimeError::ComponentOutOfBounds {
                index,
                count: self.components.len(),
            })
    }

    /// Declared carrier type after normalization.
    #[inline]
    pub fn carrier_type(&self) -> RtType {
        self.try_match.signature().ret()
    }

    /// Run the match attempt; `None` when the target does not match.
    pub fn match_carrier(&self, target: &Value) -> Option<Value> {
        match self.try_match.invoke1(target) {
            Ok(Value::Null) | Err(NoMatch) => None,
            Ok(carrier) => Some(carrier),
        }
    }

    /// Read every binding out of a carrier produced by this pattern.
    pub fn bindings(&self, carrier: &Value) -> Result<Bindings, NoMatch> {
        self.components.iter().map(|c| c.invoke1(carrier)).collect()
    }

    /// Match and read the bindings in one step.
    pub fn match_bindings(&self, target: &Value) -> Option<Bindings> {
        let carrier = self.match_carrier(target)?;
        self.bindings(&carrier).ok()
    }

    /// Whether the target matches, ignoring bindings.
    pub fn matches(&self, target: &Value) -> bool {
        self.match_carrier(target).is_some()
    }
}
