//! Mrt Carrier - shape-specialized value carriers.
//!
//! A carrier bundles several values of known static types into one opaque
//! value, without boxing scalars into a uniform representation. Callers ask
//! for a carrier by the ordered list of component types and get back a typed
//! constructor plus one typed accessor per component.
//!
//! # Architecture
//!
//! - `shape`: region counts (references, narrow scalars, wide scalars)
//! - `specialize`: one cached synthetic class per shape, array fallback above
//!   the specialization ceiling
//! - `layout`: declared-order permutation and scalar entry/exit conversions
//!
//! Typed elements for specialized shapes are cached per type list as well,
//! so repeated requests from generated code return the same handles.

mod layout;
mod shape;
mod specialize;

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use mrt_ir::{Handle, HandleResult, RtType, RuntimeError, RuntimeResult, Value};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

pub use layout::{permutation, Permutation};
pub use shape::{Shape, SlotClass};
pub use specialize::{specialize, specialized_count, RawCarrier, MAX_SLOTS};

type TypeList = SmallVec<[RtType; 8]>;

static ELEMENTS_CACHE: OnceLock<DashMap<TypeList, Arc<CarrierElements>, FxBuildHasher>> =
    OnceLock::new();

/// Typed constructor and accessors of a carrier for one type list.
#[derive(Debug)]
pub struct CarrierElements {
    types: TypeList,
    shape: Shape,
    constructor: Handle,
    accessors: Arc<[Handle]>,
}

impl CarrierElements {
    #[inline]
    pub fn types(&self) -> &[RtType] {
        &self.types
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// `(types...) -> Carrier`.
    #[inline]
    pub fn constructor(&self) -> &Handle {
        &self.constructor
    }

    /// `(Carrier) -> types[i]`, in declared order.
    #[inline]
    pub fn accessors(&self) -> &[Handle] {
        &self.accessors
    }

    pub fn component(&self, index: usize) -> RuntimeResult<&Handle> {
        self.accessors
            .get(index)
            .ok_or(RuntimeError::ComponentOutOfBounds {
                index,
                count: self.accessors.len(),
            })
    }

    /// Build a carrier from values in declared order.
    pub fn construct(&self, values: &[Value]) -> HandleResult {
        self.constructor.invoke(values)
    }
}

/// Typed carrier elements for the ordered component `types`.
///
/// # Errors
///
/// `ArityExceeded` when the types need more than [`MAX_SLOTS`] slots.
pub fn carrier_elements(types: &[RtType]) -> RuntimeResult<Arc<CarrierElements>> {
    let cache = ELEMENTS_CACHE.get_or_init(|| DashMap::with_hasher(FxBuildHasher));
    if let Some(elements) = cache.get(types) {
        return Ok(Arc::clone(elements.value()));
    }

    let shape = Shape::of(types);
    let raw = specialize(shape)?;
    let elements = Arc::new(CarrierElements {
        types: types.iter().copied().collect(),
        shape,
        constructor: layout::build_constructor(types, shape, raw.constructor()),
        accessors: layout::build_accessors(types, shape, raw.accessors()).into(),
    });

    // Array carriers stay uncached so odd shapes do not grow the cache.
    if !raw.is_specialized() {
        return Ok(elements);
    }
    Ok(Arc::clone(
        cache
            .entry(elements.types.clone())
            .or_insert(elements)
            .value(),
    ))
}

/// Typed accessor for component `index` of a carrier over `types`.
///
/// Computes only the requested accessor.
///
/// # Errors
///
/// `ComponentOutOfBounds` for a bad index, `ArityExceeded` as for
/// [`carrier_elements`].
pub fn component(types: &[RtType], index: usize) -> RuntimeResult<Handle> {
    if index >= types.len() {
        return Err(RuntimeError::ComponentOutOfBounds {
            index,
            count: types.len(),
        });
    }
    let shape = Shape::of(types);
    let raw = specialize(shape)?;
    Ok(layout::build_accessor(types, shape, raw.accessors(), index))
}
