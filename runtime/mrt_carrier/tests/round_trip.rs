//! Property-based tests for carriers.
//!
//! For any ordered list of component types and matching values, reading
//! every accessor of a freshly constructed carrier returns the values that
//! went in, scalar widening and bit encodings included. Lists long enough to
//! cross the specialization ceiling exercise the array fallback too.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use mrt_carrier::{carrier_elements, component, Shape};
use mrt_ir::{RtType, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// -- Value Generation Strategies --

/// A declared type together with a value of that type.
fn typed_value_strategy() -> impl Strategy<Value = (RtType, Value)> {
    prop_oneof![
        any::<bool>().prop_map(|b| (RtType::BOOLEAN, Value::Bool(b))),
        any::<i8>().prop_map(|n| (RtType::BYTE, Value::Byte(n))),
        any::<i16>().prop_map(|n| (RtType::SHORT, Value::Short(n))),
        any::<u16>().prop_map(|c| (RtType::CHAR, Value::Char(c))),
        any::<i32>().prop_map(|n| (RtType::INT, Value::Int(n))),
        any::<i64>().prop_map(|n| (RtType::LONG, Value::Long(n))),
        any::<u32>().prop_map(|bits| (RtType::FLOAT, Value::Float(f32::from_bits(bits)))),
        any::<u64>().prop_map(|bits| (RtType::DOUBLE, Value::Double(f64::from_bits(bits)))),
        "[a-z]{0,8}".prop_map(|s| (RtType::STRING, Value::string(s))),
        Just((RtType::OBJECT, Value::Null)),
    ]
}

proptest! {
    #[test]
    fn accessors_return_constructed_values(
        components in prop::collection::vec(typed_value_strategy(), 0..48)
    ) {
        let (types, values): (Vec<RtType>, Vec<Value>) = components.into_iter().unzip();
        let elements = carrier_elements(&types).unwrap();
        let carrier = elements.construct(&values).unwrap();

        for (index, expected) in values.iter().enumerate() {
            let read = elements.accessors()[index].invoke1(&carrier).unwrap();
            prop_assert!(read.equals(expected), "component {index}: {read:?} != {expected:?}");

            let single = component(&types, index).unwrap();
            prop_assert!(single.invoke1(&carrier).unwrap().equals(expected));
        }
    }

    #[test]
    fn shape_counts_add_up(
        components in prop::collection::vec(typed_value_strategy(), 0..64)
    ) {
        let types: Vec<RtType> = components.into_iter().map(|(ty, _)| ty).collect();
        let shape = Shape::of(&types);
        prop_assert_eq!(shape.component_count(), types.len());
        let wide = types
            .iter()
            .filter(|ty| ty.prim().is_some_and(|kind| kind.is_wide()))
            .count();
        prop_assert_eq!(shape.slot_count(), types.len() + wide);
    }
}

#[test]
fn string_int_long_carrier() {
    let types = [RtType::STRING, RtType::INT, RtType::LONG];
    let elements = carrier_elements(&types).unwrap();
    let carrier = elements
        .construct(&[Value::string("x"), Value::Int(7), Value::Long(9_000_000_000)])
        .unwrap();

    assert_eq!(elements.component(1).unwrap().invoke1(&carrier), Ok(Value::Int(7)));
    assert_eq!(component(&types, 2).unwrap().invoke1(&carrier), Ok(Value::Long(9_000_000_000)));
    assert_eq!(elements.component(0).unwrap().invoke1(&carrier), Ok(Value::string("x")));
}

#[test]
fn typed_elements_are_cached_per_type_list() {
    let types = [RtType::INT, RtType::STRING, RtType::DOUBLE];
    let a = carrier_elements(&types).unwrap();
    let b = carrier_elements(&types).unwrap();
    assert!(a.constructor().same_body(b.constructor()));
}

#[test]
fn out_of_bounds_component() {
    let types = [RtType::INT];
    assert!(component(&types, 1).is_err());
    assert!(carrier_elements(&types).unwrap().component(3).is_err());
}

#[test]
fn over_arity_types_fail() {
    let types = vec![RtType::LONG; 128];
    assert!(carrier_elements(&types).is_err());
}
