#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use super::*;
use mrt_ir::ClassDef;
use pretty_assertions::assert_eq;

fn point_class() -> ClassId {
    ClassRegistry::global().define(
        ClassDef::new("primitives_tests.Point").record([("x", RtType::INT), ("y", RtType::STRING)]),
    )
}

fn field(class: ClassId, index: usize, ty: RtType) -> Handle {
    Handle::unary(RtType::Ref(class), ty, move |v| {
        v.as_object()
            .and_then(|o| o.fields.get(index).cloned())
            .ok_or(NoMatch)
    })
}

#[test]
fn type_test_matches_instances() {
    let pattern = of_type(RtType::STRING).unwrap();
    let bindings = pattern.match_bindings(&Value::string("abc")).unwrap();
    assert_eq!(bindings.as_slice(), &[Value::string("abc")]);
    assert!(pattern.match_carrier(&Value::Int(5)).is_none());
    assert!(pattern.match_carrier(&Value::Null).is_none());
}

#[test]
fn type_test_follows_hierarchy() {
    let number = of_type(RtType::Ref(ClassId::NUMBER)).unwrap();
    assert!(number.matches(&Value::Long(1)));
    assert!(!number.matches(&Value::Char(1)));
}

#[test]
fn scalar_type_test_always_matches() {
    let pattern = of_type(RtType::INT).unwrap();
    assert_eq!(pattern.match_bindings(&Value::Int(9)).unwrap().as_slice(), &[Value::Int(9)]);
}

#[test]
fn nullable_type_test_binds_null() {
    let pattern = of_type_nullable(RtType::STRING).unwrap();
    let carrier = pattern.match_carrier(&Value::Null).unwrap();
    assert!(!carrier.is_null());
    assert_eq!(pattern.bindings(&carrier).unwrap().as_slice(), &[Value::Null]);
    assert!(pattern.matches(&Value::string("s")));
    assert!(!pattern.matches(&Value::Int(1)));
}

#[test]
fn constant_test() {
    let pattern = of_constant(Value::Int(42)).unwrap();
    assert_eq!(pattern.descriptor().target(), RtType::Ref(ClassId::INTEGER));
    assert_eq!(pattern.descriptor().binding_count(), 0);
    assert!(pattern.matches(&Value::Int(42)));
    assert!(!pattern.matches(&Value::Int(41)));

    let null = of_constant(Value::Null).unwrap();
    assert_eq!(null.descriptor().target(), RtType::OBJECT);
    assert!(null.matches(&Value::Null));
    assert!(!null.matches(&Value::string("x")));
}

#[test]
fn constant_for_wider_target() {
    let pattern = of_constant_for(Value::string("on"), RtType::OBJECT).unwrap();
    assert!(pattern.matches(&Value::string("on")));
    assert!(!pattern.matches(&Value::Int(1)));
}

#[test]
fn lazy_projection_defers_extraction() {
    let point = point_class();
    let pattern = of_lazy_projection(
        RtType::Ref(point),
        vec![field(point, 0, RtType::INT), field(point, 1, RtType::STRING)],
    )
    .unwrap();
    let value = Value::object(point, vec![Value::Int(3), Value::string("p")]);
    let carrier = pattern.match_carrier(&value).unwrap();
    assert_eq!(pattern.components()[1].invoke1(&carrier), Ok(Value::string("p")));
    assert!(pattern.match_carrier(&Value::Null).is_none());
}

#[test]
fn eager_projection_fails_on_no_match() {
    let point = point_class();
    let failing = Handle::unary(RtType::Ref(point), RtType::INT, |_| Err(NoMatch));
    let pattern =
        of_eager_projection(RtType::Ref(point), vec![field(point, 0, RtType::INT), failing])
            .unwrap();
    let value = Value::object(point, vec![Value::Int(3), Value::string("p")]);
    assert!(pattern.match_carrier(&value).is_none());
}

#[test]
fn projection_rejects_foreign_extractor() {
    let point = point_class();
    let err = of_eager_projection(RtType::Ref(point), vec![Handle::identity(RtType::STRING)]).err();
    assert!(matches!(err, Some(RuntimeError::IllegalDescriptor { .. })));
}

#[test]
fn record_pattern_reads_components() {
    let point = point_class();
    let pattern = of_record(point).unwrap();
    assert_eq!(pattern.descriptor().bindings(), &[RtType::INT, RtType::STRING]);
    let value = Value::object(point, vec![Value::Int(3), Value::string("p")]);
    let bindings = pattern.match_bindings(&value).unwrap();
    assert_eq!(bindings.as_slice(), &[Value::Int(3), Value::string("p")]);
}

#[test]
fn record_pattern_requires_record() {
    assert!(matches!(
        of_record(ClassId::STRING),
        Err(RuntimeError::IllegalDescriptor { .. })
    ));
}

#[test]
fn imperative_pattern_binds_through_continuation() {
    let descriptor = Descriptor::new(RtType::STRING, [RtType::INT, RtType::STRING]);
    let digester: Digester = Arc::new(|target: &Value, bind: &Bind<'_>| {
        let s = target.as_str().unwrap_or_default();
        match s.split_once('=') {
            Some((key, value)) => bind.bind(&[
                Value::Int(i32::try_from(key.len()).unwrap_or(i32::MAX)),
                Value::string(value),
            ]),
            None => Value::Null,
        }
    });
    let pattern = of_imperative(descriptor, digester).unwrap();
    assert_eq!(
        pattern.match_bindings(&Value::string("ab=cd")).unwrap().as_slice(),
        &[Value::Int(2), Value::string("cd")]
    );
    assert!(!pattern.matches(&Value::string("abcd")));
    assert!(!pattern.matches(&Value::Null));
}

#[test]
fn imperative_pattern_without_bind_fails() {
    let descriptor = Descriptor::new(RtType::OBJECT, []);
    let digester: Digester = Arc::new(|_: &Value, _: &Bind<'_>| Value::Bool(true));
    let pattern = of_imperative(descriptor, digester).unwrap();
    assert!(!pattern.matches(&Value::Int(1)));
}

#[test]
fn imperative_pattern_rejects_mistyped_binding() {
    let digester: Digester =
        Arc::new(|_: &Value, bind: &Bind<'_>| bind.bind(&[Value::string("seven")]));
    let single = of_imperative(Descriptor::new(RtType::OBJECT, [RtType::INT]), digester).unwrap();
    assert_eq!(single.match_bindings(&Value::Int(7)), None);

    let pair = Descriptor::new(RtType::OBJECT, [RtType::INT, RtType::INT]);
    let digester: Digester =
        Arc::new(|_: &Value, bind: &Bind<'_>| bind.bind(&[Value::string("seven"), Value::Int(7)]));
    assert_eq!(of_imperative(pair, digester).unwrap().match_bindings(&Value::Int(7)), None);

    // A reference binding still accepts null and subclasses.
    let number: Digester =
        Arc::new(|target: &Value, bind: &Bind<'_>| bind.bind(&[target.clone()]));
    let descriptor = Descriptor::new(RtType::OBJECT, [RtType::Ref(ClassId::NUMBER)]);
    let pattern = of_imperative(descriptor, number).unwrap();
    assert_eq!(pattern.match_bindings(&Value::Long(3)).unwrap().as_slice(), &[Value::Long(3)]);
    assert!(!pattern.matches(&Value::string("3")));
}
