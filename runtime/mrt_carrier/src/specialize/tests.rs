#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use super::*;
use pretty_assertions::assert_eq;
use rayon::prelude::*;

#[test]
fn arity_ceiling_is_checked_first() {
    let err = specialize(Shape::new(255, 0, 0)).err();
    assert_eq!(
        err,
        Some(RuntimeError::ArityExceeded {
            shape: "Carrier_o255_i0_l0".to_string(),
            slots: 255,
            max: MAX_SLOTS,
        })
    );

    // Wide components count twice.
    assert!(matches!(
        specialize(Shape::new(0, 0, 128)),
        Err(RuntimeError::ArityExceeded { slots: 256, .. })
    ));
    assert!(specialize(Shape::new(0, 0, 127)).is_ok());
}

#[test]
fn equal_shapes_share_one_carrier() {
    let a = specialize(Shape::new(1, 2, 0)).unwrap();
    let b = specialize(Shape::new(1, 2, 0)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(a.is_specialized());
    assert!(a.constructor().same_body(b.constructor()));
}

#[test]
fn concurrent_first_access_materializes_once() {
    let shape = Shape::new(4, 3, 2);
    let results: Vec<Arc<RawCarrier>> = (0..32)
        .into_par_iter()
        .map(|_| specialize(shape).unwrap())
        .collect();

    let first = &results[0];
    for raw in &results {
        assert!(Arc::ptr_eq(first, raw));
    }
    let class = first.class().unwrap();
    assert_eq!(ClassRegistry::global().lookup(&shape.name()), Some(class));
    assert!(class.is_subclass_of(ClassId::CARRIER));
}

#[test]
fn specialized_carrier_stores_regions() {
    let raw = specialize(Shape::new(1, 1, 1)).unwrap();
    let carrier = raw
        .constructor()
        .invoke(&[Value::string("x"), Value::Int(7), Value::Long(9_000_000_000)])
        .unwrap();
    let read: Vec<Value> = raw
        .accessors()
        .iter()
        .map(|a| a.invoke1(&carrier).unwrap())
        .collect();
    assert_eq!(read, vec![Value::string("x"), Value::Int(7), Value::Long(9_000_000_000)]);
}

#[test]
fn raw_constructor_rejects_non_canonical_scalars() {
    let raw = specialize(Shape::new(0, 1, 0)).unwrap();
    assert_eq!(raw.constructor().invoke(&[Value::Long(1)]), Err(NoMatch));
}

#[test]
fn oversized_shapes_use_uncached_array() {
    let shape = Shape::new(40, 0, 0);
    let a = specialize(shape).unwrap();
    let b = specialize(shape).unwrap();
    assert!(!a.is_specialized());
    assert!(!Arc::ptr_eq(&a, &b));

    let args: Vec<Value> = (0..40).map(Value::Int).collect();
    let carrier = a.constructor().invoke(&args).unwrap();
    assert_eq!(a.accessors()[39].invoke1(&carrier), Ok(Value::Int(39)));
    // Accessors of one array carrier read any other array carrier's sequence.
    assert_eq!(b.accessors()[5].invoke1(&carrier), Ok(Value::Int(5)));
}

#[test]
fn name_clash_with_user_class_fails() {
    let shape = Shape::new(3, 9, 5);
    ClassRegistry::global().define(ClassDef::new(shape.name()));
    assert!(matches!(
        specialize(shape),
        Err(RuntimeError::SpecializationFailed { .. })
    ));
}
