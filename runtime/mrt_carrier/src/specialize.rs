//! Carrier specialization.
//!
//! Each distinct shape up to the specialization ceiling gets one synthetic
//! carrier class, registered once and cached for the life of the process.
//! A specialized instance stores its components in three typed arrays, one
//! per region. Shapes above the ceiling (but within the arity limit) get an
//! uncached carrier backed by a plain ordered sequence of values.
//!
//! The raw constructor and accessors work in canonical positions and
//! canonical types (`Object`, `int`, `long`); `layout` maps them back to the
//! caller's declared order and types.
//!
//! # Thread Safety
//!
//! The cache is a `DashMap`. Construction happens inside the entry's shard
//! lock, so concurrent first requests for one shape materialize it exactly
//! once and every caller observes the same `RawCarrier`.

use std::sync::{Arc, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mrt_ir::{
    ClassDef, ClassFlags, ClassId, ClassRegistry, Handle, NoMatch, RtType, RuntimeConfig,
    RuntimeError, RuntimeResult, Signature, Value,
};
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

use crate::shape::{Shape, SlotClass};

/// Maximum slot count of any carrier.
pub const MAX_SLOTS: usize = 254;

type CarrierCache = DashMap<Shape, Arc<RawCarrier>, FxBuildHasher>;

static CARRIER_CACHE: OnceLock<CarrierCache> = OnceLock::new();

fn cache() -> &'static CarrierCache {
    CARRIER_CACHE.get_or_init(|| DashMap::with_hasher(FxBuildHasher))
}

/// Instance layout of a specialized carrier.
#[derive(Debug)]
struct CarrierInstance {
    refs: Box<[Value]>,
    ints: Box<[i32]>,
    longs: Box<[i64]>,
}

/// Instance layout of the ordered-sequence fallback.
#[derive(Debug)]
struct CarrierArray {
    values: Box<[Value]>,
}

/// Canonical constructor and accessors for one shape.
#[derive(Debug)]
pub struct RawCarrier {
    shape: Shape,
    class: Option<ClassId>,
    constructor: Handle,
    accessors: Arc<[Handle]>,
}

impl RawCarrier {
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The synthetic carrier class, or `None` for the array fallback.
    #[inline]
    pub fn class(&self) -> Option<ClassId> {
        self.class
    }

    #[inline]
    pub fn is_specialized(&self) -> bool {
        self.class.is_some()
    }

    /// Takes one canonical value per component, in canonical order.
    #[inline]
    pub fn constructor(&self) -> &Handle {
        &self.constructor
    }

    /// One accessor per canonical position.
    #[inline]
    pub fn accessors(&self) -> &[Handle] {
        &self.accessors
    }
}

/// Canonical carrier for `shape`.
///
/// # Errors
///
/// `ArityExceeded` when the shape needs more than [`MAX_SLOTS`] slots,
/// checked before anything else. `SpecializationFailed` when the carrier
/// class cannot be registered.
pub fn specialize(shape: Shape) -> RuntimeResult<Arc<RawCarrier>> {
    let slots = shape.slot_count();
    if slots > MAX_SLOTS {
        return Err(RuntimeError::ArityExceeded {
            shape: shape.name(),
            slots,
            max: MAX_SLOTS,
        });
    }

    if slots > RuntimeConfig::global().specialize_limit {
        trace!(%shape, slots, "using array carrier");
        return Ok(Arc::new(array_carrier(shape)));
    }

    // Fast path: already materialized
    if let Some(raw) = cache().get(&shape) {
        return Ok(Arc::clone(raw.value()));
    }

    match cache().entry(shape) {
        Entry::Occupied(existing) => Ok(Arc::clone(existing.get())),
        Entry::Vacant(slot) => {
            let raw = Arc::new(materialize(shape)?);
            slot.insert(Arc::clone(&raw));
            Ok(raw)
        }
    }
}

/// Number of shapes materialized so far.
pub fn specialized_count() -> usize {
    cache().len()
}

fn materialize(shape: Shape) -> RuntimeResult<RawCarrier> {
    let name = shape.name();
    let registry = ClassRegistry::global();
    let class = registry.define(
        ClassDef::new(name.as_str())
            .extends(ClassId::CARRIER)
            .with_flags(ClassFlags::FINAL | ClassFlags::SYNTHETIC),
    );

    // A user class that claimed the name first is not a carrier.
    let info = registry.get(class);
    if info.superclass != Some(ClassId::CARRIER) || !info.flags.contains(ClassFlags::SYNTHETIC) {
        return Err(RuntimeError::SpecializationFailed {
            shape: name,
            reason: "class name is already taken by a non-carrier class".to_string(),
        });
    }

    debug!(%shape, class = class.raw(), "materialized carrier class");

    let refs = shape.refs();
    let narrow = shape.narrow();
    let constructor = Handle::new(constructor_signature(shape), move |args| {
        if args.len() != shape.component_count() {
            return Err(NoMatch);
        }
        let (ref_args, scalar_args) = args.split_at(refs);
        let (int_args, long_args) = scalar_args.split_at(narrow);
        let ints = int_args
            .iter()
            .map(|v| match v {
                Value::Int(n) => Ok(*n),
                _ => Err(NoMatch),
            })
            .collect::<Result<Box<[i32]>, NoMatch>>()?;
        let longs = long_args
            .iter()
            .map(|v| match v {
                Value::Long(n) => Ok(*n),
                _ => Err(NoMatch),
            })
            .collect::<Result<Box<[i64]>, NoMatch>>()?;
        Ok(Value::opaque(
            class,
            CarrierInstance {
                refs: ref_args.into(),
                ints,
                longs,
            },
        ))
    });

    let accessors = (0..shape.component_count())
        .map(|position| {
            let class_of_slot = shape.class_at(position);
            let index = position - shape.offset(class_of_slot);
            Handle::unary(RtType::CARRIER, class_of_slot.canonical_type(), move |carrier| {
                let instance = carrier
                    .as_opaque()
                    .and_then(|o| o.downcast_ref::<CarrierInstance>())
                    .ok_or(NoMatch)?;
                let value = match class_of_slot {
                    SlotClass::Ref => instance.refs.get(index).cloned(),
                    SlotClass::Narrow => instance.ints.get(index).copied().map(Value::Int),
                    SlotClass::Wide => instance.longs.get(index).copied().map(Value::Long),
                };
                value.ok_or(NoMatch)
            })
        })
        .collect();

    Ok(RawCarrier {
        shape,
        class: Some(class),
        constructor,
        accessors,
    })
}

fn array_carrier(shape: Shape) -> RawCarrier {
    let count = shape.component_count();
    let constructor = Handle::new(constructor_signature(shape), move |args| {
        if args.len() != count {
            return Err(NoMatch);
        }
        Ok(Value::opaque(
            ClassId::CARRIER,
            CarrierArray {
                values: args.into(),
            },
        ))
    });

    let accessors = (0..count)
        .map(|position| {
            let ret = shape.class_at(position).canonical_type();
            Handle::unary(RtType::CARRIER, ret, move |carrier| {
                carrier
                    .as_opaque()
                    .and_then(|o| o.downcast_ref::<CarrierArray>())
                    .and_then(|array| array.values.get(position).cloned())
                    .ok_or(NoMatch)
            })
        })
        .collect();

    RawCarrier {
        shape,
        class: None,
        constructor,
        accessors,
    }
}

fn constructor_signature(shape: Shape) -> Signature {
    Signature::new(RtType::CARRIER, shape.canonical_types())
}

#[cfg(test)]
mod tests;
