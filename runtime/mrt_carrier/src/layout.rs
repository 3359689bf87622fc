//! Mapping between declared component order and canonical carrier layout.
//!
//! Callers declare components in any order and of any type; a carrier stores
//! them grouped by region and widened to the region's canonical type. This
//! module computes the permutation between the two orders and wraps the raw
//! constructor and accessors with the entry and exit conversions:
//!
//! | declared  | stored as | entry                 | exit               |
//! |-----------|-----------|-----------------------|--------------------|
//! | boolean   | int       | `0` / `1`             | `!= 0`             |
//! | byte      | int       | sign-extend           | truncate           |
//! | short     | int       | sign-extend           | truncate           |
//! | char      | int       | zero-extend           | truncate           |
//! | float     | int       | raw bits              | from raw bits      |
//! | long      | long      | unchanged             | unchanged          |
//! | double    | long      | raw bits              | from raw bits      |
//! | reference | Object    | unchanged             | unchanged          |

use mrt_ir::{Handle, NoMatch, PrimKind, RtType, Signature, Value};
use smallvec::SmallVec;

use crate::shape::{Shape, SlotClass};

/// Canonical position of every declared component.
pub type Permutation = SmallVec<[usize; 8]>;

/// Canonical position of each declared component, in declared order.
pub fn permutation(types: &[RtType], shape: Shape) -> Permutation {
    let mut next = [
        shape.offset(SlotClass::Ref),
        shape.offset(SlotClass::Narrow),
        shape.offset(SlotClass::Wide),
    ];
    types
        .iter()
        .map(|&ty| {
            let region = region_index(SlotClass::of(ty));
            let position = next[region];
            next[region] += 1;
            position
        })
        .collect()
}

/// Canonical position of declared component `index` alone.
///
/// Counts the same-region components declared before it, without building
/// the full permutation.
pub(crate) fn position_of(types: &[RtType], shape: Shape, index: usize) -> usize {
    let class = SlotClass::of(types[index]);
    let preceding = types[..index]
        .iter()
        .filter(|&&ty| SlotClass::of(ty) == class)
        .count();
    shape.offset(class) + preceding
}

/// Wrap a raw constructor so it takes components in declared order and types.
pub fn build_constructor(types: &[RtType], shape: Shape, raw: &Handle) -> Handle {
    let positions = permutation(types, shape);
    let kinds: SmallVec<[RtType; 8]> = types.iter().copied().collect();
    let raw = raw.clone();
    Handle::new(
        Signature::new(RtType::CARRIER, types.iter().copied()),
        move |args| {
            if args.len() != kinds.len() {
                return Err(NoMatch);
            }
            let mut canonical = vec![Value::Null; args.len()];
            for ((arg, &ty), &position) in args.iter().zip(&kinds).zip(&positions) {
                canonical[position] = encode(ty, arg)?;
            }
            raw.invoke(&canonical)
        },
    )
}

/// Wrap raw accessors so they are indexed and typed in declared order.
pub fn build_accessors(types: &[RtType], shape: Shape, raw: &[Handle]) -> Vec<Handle> {
    permutation(types, shape)
        .into_iter()
        .zip(types)
        .map(|(position, &ty)| typed_accessor(ty, &raw[position]))
        .collect()
}

/// Typed accessor for declared component `index` only.
pub fn build_accessor(types: &[RtType], shape: Shape, raw: &[Handle], index: usize) -> Handle {
    typed_accessor(types[index], &raw[position_of(types, shape, index)])
}

fn typed_accessor(ty: RtType, raw: &Handle) -> Handle {
    let raw = raw.clone();
    Handle::unary(RtType::CARRIER, ty, move |carrier| {
        decode(ty, raw.invoke1(carrier)?)
    })
}

fn region_index(class: SlotClass) -> usize {
    match class {
        SlotClass::Ref => 0,
        SlotClass::Narrow => 1,
        SlotClass::Wide => 2,
    }
}

/// Entry conversion to the canonical storage type.
fn encode(ty: RtType, value: &Value) -> Result<Value, NoMatch> {
    let Some(kind) = ty.prim() else {
        return Ok(value.clone());
    };
    let encoded = match (kind, value) {
        (PrimKind::Boolean, Value::Bool(b)) => Value::Int(i32::from(*b)),
        (PrimKind::Byte, Value::Byte(n)) => Value::Int(i32::from(*n)),
        (PrimKind::Short, Value::Short(n)) => Value::Int(i32::from(*n)),
        (PrimKind::Char, Value::Char(c)) => Value::Int(i32::from(*c)),
        (PrimKind::Int, Value::Int(n)) => Value::Int(*n),
        (PrimKind::Float, Value::Float(x)) => {
            Value::Int(i32::from_ne_bytes(x.to_bits().to_ne_bytes()))
        }
        (PrimKind::Long, Value::Long(n)) => Value::Long(*n),
        (PrimKind::Double, Value::Double(x)) => {
            Value::Long(i64::from_ne_bytes(x.to_bits().to_ne_bytes()))
        }
        _ => return Err(NoMatch),
    };
    Ok(encoded)
}

/// Exit conversion back to the declared type.
#[expect(
    clippy::cast_possible_truncation,
    reason = "narrowing restores values that were widened on entry"
)]
fn decode(ty: RtType, stored: Value) -> Result<Value, NoMatch> {
    let Some(kind) = ty.prim() else {
        return Ok(stored);
    };
    let decoded = match (kind, stored) {
        (PrimKind::Boolean, Value::Int(n)) => Value::Bool(n != 0),
        (PrimKind::Byte, Value::Int(n)) => Value::Byte(n as i8),
        (PrimKind::Short, Value::Int(n)) => Value::Short(n as i16),
        (PrimKind::Char, Value::Int(n)) => {
            Value::Char(u16::from_ne_bytes((n as i16).to_ne_bytes()))
        }
        (PrimKind::Int, Value::Int(n)) => Value::Int(n),
        (PrimKind::Float, Value::Int(n)) => {
            Value::Float(f32::from_bits(u32::from_ne_bytes(n.to_ne_bytes())))
        }
        (PrimKind::Long, Value::Long(n)) => Value::Long(n),
        (PrimKind::Double, Value::Long(n)) => {
            Value::Double(f64::from_bits(u64::from_ne_bytes(n.to_ne_bytes())))
        }
        _ => return Err(NoMatch),
    };
    Ok(decoded)
}
