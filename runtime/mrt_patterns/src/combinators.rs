//! Pattern combinators.
//!
//! Each combinator builds a new `PatternHandle` from existing ones by
//! wrapping their `try_match` and component handles; none of them inspects
//! how the inner patterns are implemented.

use mrt_ir::{ClassRegistry, Handle, RtType, RuntimeError, RuntimeResult, Value};
use smallvec::SmallVec;

use crate::bundle::Bundle;
use crate::pattern::{Bindings, Descriptor, PatternHandle};

/// Make `pattern` testable against `new_target`.
///
/// Legal when `new_target` is a supertype of the boxed class of a scalar
/// target, or a supertype or subtype of a reference target. The adapted
/// match attempt first checks that the value could have been passed to the
/// original one and fails without calling it otherwise.
///
/// # Errors
///
/// `IncompatibleTargetType` when the two targets are unrelated.
pub fn adapt_target(pattern: &PatternHandle, new_target: RtType) -> RuntimeResult<PatternHandle> {
    let old_target = pattern.descriptor().target();
    if old_target == new_target {
        return Ok(pattern.clone());
    }

    let registry = ClassRegistry::global();
    let guard: Box<dyn Fn(&Value) -> bool + Send + Sync> = match (old_target, new_target) {
        (RtType::Prim(kind), RtType::Ref(new_class))
            if registry.is_subclass(kind.boxed(), new_class) =>
        {
            // Boxing, optionally followed by widening: null never matches.
            let wrapper = kind.boxed();
            Box::new(move |value: &Value| value.is_instance_of(wrapper))
        }
        _ if new_target.is_assignable_from(old_target)
            || old_target.is_assignable_from(new_target) =>
        {
            Box::new(move |value: &Value| value.is_null() || old_target.accepts(value))
        }
        _ => {
            return Err(RuntimeError::IncompatibleTargetType {
                old_target: old_target.to_string(),
                new_target: new_target.to_string(),
            })
        }
    };

    let inner = pattern.try_match().clone();
    let sig = inner.signature().with_param(0, new_target);
    let try_match = Handle::new(sig, move |args| match args {
        [value] if guard(value) => inner.invoke(args),
        _ => Ok(Value::Null),
    });
    PatternHandle::new(
        pattern.descriptor().with_target(new_target),
        try_match,
        pattern.components().to_vec(),
    )
}

/// Hide the bindings at `positions`; matching is unchanged.
///
/// # Errors
///
/// `ComponentOutOfBounds` for a position past the last binding.
pub fn drop_bindings(pattern: &PatternHandle, positions: &[usize]) -> RuntimeResult<PatternHandle> {
    let count = pattern.descriptor().binding_count();
    if let Some(&index) = positions.iter().find(|&&p| p >= count) {
        return Err(RuntimeError::ComponentOutOfBounds { index, count });
    }

    let kept: SmallVec<[usize; 4]> = (0..count).filter(|i| !positions.contains(i)).collect();
    let descriptor = Descriptor::new(
        pattern.descriptor().target(),
        kept.iter().filter_map(|&i| pattern.descriptor().binding(i)),
    );
    let components = kept
        .iter()
        .map(|&i| pattern.components()[i].clone())
        .collect();
    PatternHandle::new(descriptor, pattern.try_match().clone(), components)
}

/// Match `outer`, then match each present inner pattern against the outer
/// binding at the same position.
///
/// The bindings are `outer`'s own, in order, followed by the bindings of
/// every present inner pattern, in inner-pattern order. An absent inner
/// contributes nothing. Inner patterns whose target differs from the outer
/// binding type are adapted to it first.
///
/// # Errors
///
/// `ComponentOutOfBounds` when there are more inner patterns than outer
/// bindings; `IncompatibleTargetType` when an inner pattern cannot be
/// adapted to its outer binding type.
pub fn nested(
    outer: &PatternHandle,
    inners: &[Option<PatternHandle>],
) -> RuntimeResult<PatternHandle> {
    let outer_count = outer.descriptor().binding_count();
    if inners.len() > outer_count {
        return Err(RuntimeError::ComponentOutOfBounds {
            index: inners.len() - 1,
            count: outer_count,
        });
    }

    let mut present: Vec<(usize, PatternHandle)> = Vec::with_capacity(inners.len());
    for (position, inner) in inners.iter().enumerate() {
        let Some(inner) = inner else { continue };
        let binding_type = outer.descriptor().bindings()[position];
        present.push((position, adapt_target(inner, binding_type)?));
    }

    let mut binding_types: SmallVec<[RtType; 4]> =
        outer.descriptor().bindings().iter().copied().collect();
    for (_, inner) in &present {
        binding_types.extend_from_slice(inner.descriptor().bindings());
    }
    let descriptor = Descriptor::new(outer.descriptor().target(), binding_types);
    let bundle = Bundle::of(descriptor.bindings())?;
    let carrier_type = bundle.carrier_type();
    let components = bundle.components().to_vec();

    let outer = outer.clone();
    let try_match = Handle::unary(descriptor.target(), carrier_type, move |target| {
        Ok(nested_match(&outer, &present, &bundle, target).unwrap_or(Value::Null))
    });
    PatternHandle::new(descriptor, try_match, components)
}

fn nested_match(
    outer: &PatternHandle,
    inners: &[(usize, PatternHandle)],
    bundle: &Bundle,
    target: &Value,
) -> Option<Value> {
    let carrier = outer.match_carrier(target)?;
    let mut bindings: Bindings = outer.bindings(&carrier).ok()?;
    for (position, inner) in inners {
        let inner_bindings = inner.match_bindings(&bindings[*position])?;
        bindings.extend(inner_bindings);
    }
    bundle.construct(&bindings).ok()
}

/// A handle `(target) -> consumer result` that matches `pattern`, feeds the
/// bindings to `consumer` on success, and returns `default` on failure.
///
/// # Errors
///
/// `ContractMismatch` when `consumer` does not take exactly the binding
/// types of `pattern`.
pub fn compose(pattern: &PatternHandle, consumer: Handle, default: Value) -> RuntimeResult<Handle> {
    if consumer.signature().params() != pattern.descriptor().bindings() {
        return Err(RuntimeError::contract_mismatch(
            consumer.signature(),
            format!("a consumer of {}", pattern.descriptor()),
        ));
    }

    let pattern = pattern.clone();
    Ok(Handle::unary(
        pattern.descriptor().target(),
        consumer.signature().ret(),
        move |target| match pattern.match_carrier(target) {
            None => Ok(default.clone()),
            Some(carrier) => {
                let bindings = pattern.bindings(&carrier)?;
                consumer.invoke(&bindings)
            }
        },
    ))
}
