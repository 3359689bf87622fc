#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use super::*;
use mrt_ir::ClassDef;
use pretty_assertions::assert_eq;

struct Shapes {
    shape: ClassId,
    circle: ClassId,
    square: ClassId,
}

fn shapes() -> Shapes {
    let registry = ClassRegistry::global();
    let shape = registry.define(ClassDef::new("type_switch_tests.Shape").interface());
    let circle = registry.define(
        ClassDef::new("type_switch_tests.Circle")
            .implements(shape)
            .record([("radius", mrt_ir::RtType::DOUBLE)]),
    );
    let square = registry.define(
        ClassDef::new("type_switch_tests.Square")
            .implements(shape)
            .record([("side", mrt_ir::RtType::DOUBLE)]),
    );
    Shapes { shape, circle, square }
}

#[test]
fn first_matching_class_wins() {
    let s = shapes();
    let switch =
        TypeSwitch::new([s.circle.into(), s.shape.into(), ClassId::OBJECT.into()]).unwrap();
    assert!(switch.is_class_only());

    let circle = Value::object(s.circle, vec![Value::Double(1.0)]);
    let square = Value::object(s.square, vec![Value::Double(2.0)]);
    assert_eq!(switch.dispatch(&circle, 0), 0);
    assert_eq!(switch.dispatch(&square, 0), 1);
    assert_eq!(switch.dispatch(&Value::string("s"), 0), 2);
    assert_eq!(switch.dispatch(&Value::Null, 0), NULL_INDEX);
}

#[test]
fn restart_skips_earlier_labels() {
    let s = shapes();
    let switch = TypeSwitch::new([s.circle.into(), s.circle.into(), s.shape.into()]).unwrap();
    let circle = Value::object(s.circle, vec![Value::Double(1.0)]);
    assert_eq!(switch.dispatch(&circle, 0), 0);
    assert_eq!(switch.dispatch(&circle, 1), 1);
    assert_eq!(switch.dispatch(&circle, 2), 2);
    assert_eq!(switch.dispatch(&circle, 3), 3);
    assert_eq!(switch.dispatch(&circle, 9), 3);
    // Memoized answers are stable.
    assert_eq!(switch.dispatch(&circle, 1), 1);
}

#[test]
fn no_match_reports_label_count() {
    let s = shapes();
    let switch = TypeSwitch::new([TypeLabel::Class(s.square)]).unwrap();
    assert_eq!(switch.dispatch(&Value::Int(1), 0), 1);
}

#[test]
fn constant_labels() {
    let switch = TypeSwitch::new([
        TypeLabel::Int(65),
        TypeLabel::Str(Arc::from("go")),
        TypeLabel::Class(ClassId::NUMBER),
    ])
    .unwrap();
    assert!(!switch.is_class_only());
    assert_eq!(switch.dispatch(&Value::Int(65), 0), 0);
    assert_eq!(switch.dispatch(&Value::Char(65), 0), 0);
    assert_eq!(switch.dispatch(&Value::Long(65), 0), 2);
    assert_eq!(switch.dispatch(&Value::string("go"), 0), 1);
    assert_eq!(switch.dispatch(&Value::string("stop"), 0), 3);
    assert_eq!(switch.dispatch(&Value::Int(65), 1), 2);
}

#[test]
fn enum_class_label_matches_all_constants() {
    let registry = ClassRegistry::global();
    let suit = registry
        .define(ClassDef::new("type_switch_tests.Suit").enumeration(["HEARTS", "SPADES"]));
    let switch = TypeSwitch::new([TypeLabel::Class(suit)]).unwrap();
    assert_eq!(switch.dispatch(&Value::enum_const(suit, 1), 0), 0);
    assert_eq!(switch.dispatch(&Value::string("HEARTS"), 0), 1);
}

#[test]
fn labels_from_values() {
    let switch = TypeSwitch::from_values(&[Value::string("a"), Value::Int(3)]).unwrap();
    assert_eq!(switch.labels(), &[TypeLabel::Str(Arc::from("a")), TypeLabel::Int(3)]);

    let err = TypeSwitch::from_values(&[Value::Int(1), Value::Null]).err();
    assert_eq!(err, Some(RuntimeError::invalid_labels("null label at position 1")));
    assert!(TypeSwitch::from_values(&[Value::Long(1)]).is_err());
    assert!(TypeSwitch::from_values(&[Value::Bool(true)]).is_err());
}

#[test]
fn label_display() {
    assert_eq!(TypeLabel::Class(ClassId::STRING).to_string(), "String.class");
    assert_eq!(TypeLabel::Str(Arc::from("x")).to_string(), "\"x\"");
}

#[test]
fn restarts_past_the_end_share_one_memo_entry() {
    let s = shapes();
    let switch = TypeSwitch::new([s.circle.into(), s.shape.into()]).unwrap();
    let circle = Value::object(s.circle, vec![Value::Double(1.0)]);
    for restart in [2, 3, 50, usize::MAX] {
        assert_eq!(switch.dispatch(&circle, restart), 2);
    }
    let memo = switch.memo.as_ref().unwrap();
    assert_eq!(memo.len(), 1);
    assert!(memo.contains_key(&(s.circle, 2)));
}
