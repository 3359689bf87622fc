//! Primitive patterns: type tests, constants, projections, digesters.

use std::cell::Cell;
use std::sync::Arc;

use mrt_ir::{
    ClassId, ClassRegistry, Handle, NoMatch, RtType, RuntimeError, RuntimeResult, Value,
};
use smallvec::SmallVec;
use tracing::trace;

use crate::bundle::{unwrap_null, wrap_null, Bundle};
use crate::combinators::adapt_target;
use crate::pattern::{Descriptor, PatternHandle};

/// Matches non-null instances of `ty`, binding the target itself.
///
/// For a scalar `ty` every target matches.
pub fn of_type(ty: RtType) -> RuntimeResult<PatternHandle> {
    let try_match = match ty {
        RtType::Prim(_) => Handle::identity(ty),
        RtType::Ref(class) => Handle::unary(ty, ty, move |target| {
            Ok(if target.is_instance_of(class) {
                target.clone()
            } else {
                Value::Null
            })
        }),
    };
    PatternHandle::new(Descriptor::new(ty, [ty]), try_match, vec![Handle::identity(ty)])
}

/// [`of_type`] adapted to a different target type.
pub fn of_type_for(ty: RtType, target: RtType) -> RuntimeResult<PatternHandle> {
    adapt_target(&of_type(ty)?, target)
}

/// Like [`of_type`], but `null` also matches and binds `null`.
pub fn of_type_nullable(ty: RtType) -> RuntimeResult<PatternHandle> {
    let RtType::Ref(class) = ty else {
        return of_type(ty);
    };
    let try_match = Handle::unary(ty, RtType::OBJECT, move |target| {
        Ok(if target.is_null() || target.is_instance_of(class) {
            wrap_null(target)
        } else {
            Value::Null
        })
    });
    let component = Handle::unary(RtType::OBJECT, ty, |carrier| Ok(unwrap_null(carrier)));
    PatternHandle::new(Descriptor::new(ty, [ty]), try_match, vec![component])
}

/// [`of_type_nullable`] adapted to a different target type.
pub fn of_type_nullable_for(ty: RtType, target: RtType) -> RuntimeResult<PatternHandle> {
    adapt_target(&of_type_nullable(ty)?, target)
}

/// Matches targets equal to `constant`; no bindings.
///
/// The target type is the runtime class of the constant, or `Object` for a
/// `null` constant.
pub fn of_constant(constant: Value) -> RuntimeResult<PatternHandle> {
    let target = RtType::Ref(constant.class_of().unwrap_or(ClassId::OBJECT));
    let try_match = Handle::unary(target, RtType::OBJECT, move |value| {
        Ok(if value.equals(&constant) {
            Value::Bool(true)
        } else {
            Value::Null
        })
    });
    PatternHandle::new(Descriptor::new(target, []), try_match, Vec::new())
}

/// [`of_constant`] adapted to a different target type.
pub fn of_constant_for(constant: Value, target: RtType) -> RuntimeResult<PatternHandle> {
    adapt_target(&of_constant(constant)?, target)
}

/// Projection whose extractors run when a binding is read.
///
/// Matches any non-null target; the carrier is the target itself.
pub fn of_lazy_projection(target: RtType, extractors: Vec<Handle>) -> RuntimeResult<PatternHandle> {
    let descriptor = projection_descriptor(target, &extractors)?;
    let try_match = Handle::unary(target, target, |value| Ok(value.clone()));
    PatternHandle::new(descriptor, try_match, extractors)
}

/// Projection whose extractors all run at match time.
///
/// The results are bundled into one carrier, so reading a binding never
/// re-runs an extractor. An extractor that reports `NoMatch` fails the match.
pub fn of_eager_projection(
    target: RtType,
    extractors: Vec<Handle>,
) -> RuntimeResult<PatternHandle> {
    let descriptor = projection_descriptor(target, &extractors)?;
    let bundle = Bundle::of(descriptor.bindings())?;
    let carrier_type = bundle.carrier_type();
    let constructor = bundle.constructor().clone();

    let try_match = Handle::unary(target, carrier_type, move |value| {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let extracted: Result<SmallVec<[Value; 4]>, NoMatch> =
            extractors.iter().map(|e| e.invoke1(value)).collect();
        Ok(extracted
            .and_then(|values| constructor.invoke(&values))
            .unwrap_or(Value::Null))
    });
    PatternHandle::new(descriptor, try_match, bundle.components().to_vec())
}

/// Deconstruction pattern for a record class.
///
/// An eager projection over the record components in declaration order.
pub fn of_record(class: ClassId) -> RuntimeResult<PatternHandle> {
    let info = ClassRegistry::global().get(class);
    let Some(components) = info.record_components() else {
        return Err(RuntimeError::IllegalDescriptor {
            descriptor: info.name.to_string(),
            reason: "not a record class".to_string(),
        });
    };
    trace!(record = %info.name, components = components.len(), "synthesizing record pattern");
    let target = RtType::Ref(class);
    let extractors = components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            Handle::unary(target, component.ty, move |value| {
                value
                    .as_object()
                    .filter(|instance| instance.class == class)
                    .and_then(|instance| instance.fields.get(index).cloned())
                    .ok_or(NoMatch)
            })
        })
        .collect();
    of_eager_projection(target, extractors)
}

/// Continuation handed to a digester.
///
/// Calling [`Bind::bind`] with one value per binding produces the match
/// carrier the digester should return.
pub struct Bind<'a> {
    bundle: &'a Bundle,
    bound: Cell<bool>,
}

impl Bind<'_> {
    /// Bundle the bindings of a successful match.
    ///
    /// Values that do not fit the descriptor yield `Null`, failing the match.
    pub fn bind(&self, values: &[Value]) -> Value {
        self.bound.set(true);
        self.bundle.construct(values).unwrap_or(Value::Null)
    }
}

/// User-supplied match-and-bind function.
pub type Digester = Arc<dyn Fn(&Value, &Bind<'_>) -> Value + Send + Sync>;

/// Pattern whose match decision is made entirely by `digester`.
///
/// The digester receives the target and a [`Bind`]; it matches by returning
/// the result of `bind`, and fails by returning `Null` or by never calling
/// `bind`. A `null` target fails without calling the digester.
pub fn of_imperative(descriptor: Descriptor, digester: Digester) -> RuntimeResult<PatternHandle> {
    let bundle = Bundle::of(descriptor.bindings())?;
    let components = bundle.components().to_vec();
    let bundle = Arc::new(bundle);
    let try_match = Handle::unary(descriptor.target(), bundle.carrier_type(), move |value| {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let bind = Bind {
            bundle: &bundle,
            bound: Cell::new(false),
        };
        let carrier = digester(value, &bind);
        Ok(if bind.bound.get() { carrier } else { Value::Null })
    });
    PatternHandle::new(descriptor, try_match, components)
}

fn projection_descriptor(target: RtType, extractors: &[Handle]) -> RuntimeResult<Descriptor> {
    for (i, extractor) in extractors.iter().enumerate() {
        let sig = extractor.signature();
        if sig.param_count() != 1 || sig.param(0) != Some(target) {
            return Err(RuntimeError::IllegalDescriptor {
                descriptor: target.to_string(),
                reason: format!("extractor {i} {sig} does not take the target type"),
            });
        }
    }
    Ok(Descriptor::new(
        target,
        extractors.iter().map(|e| e.signature().ret()),
    ))
}

#[cfg(test)]
mod tests;
