#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn empty_bundle_is_a_token() {
    let bundle = Bundle::of(&[]).unwrap();
    let carrier = bundle.construct(&[]).unwrap();
    assert!(!carrier.is_null());
    assert!(bundle.components().is_empty());
}

#[test]
fn single_binding_wraps_null() {
    let bundle = Bundle::of(&[RtType::STRING]).unwrap();
    let carrier = bundle.construct(&[Value::Null]).unwrap();
    assert!(!carrier.is_null());
    let components = bundle.components();
    assert_eq!(components[0].invoke1(&carrier), Ok(Value::Null));
}

#[test]
fn single_binding_passes_values_through() {
    let bundle = Bundle::of(&[RtType::INT]).unwrap();
    let carrier = bundle.construct(&[Value::Int(3)]).unwrap();
    assert_eq!(carrier, Value::Int(3));
    assert_eq!(bundle.components()[0].invoke1(&carrier), Ok(Value::Int(3)));
}

#[test]
fn several_bindings_use_a_carrier() {
    let bundle = Bundle::of(&[RtType::INT, RtType::OBJECT, RtType::DOUBLE]).unwrap();
    assert_eq!(bundle.carrier_type(), RtType::CARRIER);
    let values = [Value::Int(1), Value::Null, Value::Double(0.5)];
    let carrier = bundle.construct(&values).unwrap();
    let read: Vec<Value> = bundle
        .components()
        .iter()
        .map(|c| c.invoke1(&carrier).unwrap())
        .collect();
    assert_eq!(read, values.to_vec());
}

#[test]
fn construct_rejects_wrong_arity() {
    let bundle = Bundle::of(&[RtType::INT, RtType::INT]).unwrap();
    assert_eq!(bundle.construct(&[Value::Int(1)]), Err(NoMatch));
}

#[test]
fn sentinel_never_escapes() {
    assert_eq!(unwrap_null(&wrap_null(&Value::Null)), Value::Null);
    assert_eq!(unwrap_null(&Value::Int(4)), Value::Int(4));
}

#[test]
fn single_binding_checks_its_type() {
    let ints = Bundle::of(&[RtType::INT]).unwrap();
    assert_eq!(ints.construct(&[Value::string("1")]), Err(NoMatch));
    assert_eq!(ints.construct(&[Value::Null]), Err(NoMatch));

    let strings = Bundle::of(&[RtType::STRING]).unwrap();
    assert_eq!(strings.construct(&[Value::Int(1)]), Err(NoMatch));
}
