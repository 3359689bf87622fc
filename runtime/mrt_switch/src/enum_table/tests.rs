#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use super::*;
use mrt_ir::ClassDef;
use pretty_assertions::assert_eq;

fn color() -> ClassId {
    ClassRegistry::global().define(
        ClassDef::new("enum_table_tests.Color").enumeration(["RED", "GREEN", "BLUE", "ALPHA"]),
    )
}

fn names(labels: &[&str]) -> Vec<Value> {
    labels.iter().map(|&s| Value::string(s)).collect()
}

#[test]
fn maps_constants_to_case_positions() {
    let color = color();
    let table = EnumTable::new(color, &names(&["BLUE", "RED"])).unwrap();
    assert_eq!(table.class(), color);
    assert_eq!(table.dispatch(&Value::enum_const(color, 2)), 0);
    assert_eq!(table.dispatch(&Value::enum_const(color, 0)), 1);
    assert_eq!(table.dispatch(&Value::enum_const(color, 1)), 2);
    assert_eq!(table.dispatch(&Value::enum_const(color, 3)), 2);
    assert_eq!(table.dispatch(&Value::Null), NULL_INDEX);
}

#[test]
fn unknown_names_never_match() {
    let color = color();
    let table = EnumTable::new(color, &names(&["PURPLE", "GREEN"])).unwrap();
    assert_eq!(table.dispatch(&Value::enum_const(color, 1)), 1);
    for ordinal in [0, 2, 3] {
        assert_eq!(table.dispatch(&Value::enum_const(color, ordinal)), 2);
        assert_eq!(table.scan(&Value::enum_const(color, ordinal)), 2);
    }
}

#[test]
fn scan_agrees_with_dispatch() {
    let color = color();
    let table = EnumTable::new(color, &names(&["ALPHA", "GREEN", "RED"])).unwrap();
    for ordinal in 0..4 {
        let value = Value::enum_const(color, ordinal);
        assert_eq!(table.scan(&value), table.dispatch(&value));
    }
}

#[test]
fn rejects_invalid_labels() {
    let color = color();
    assert!(EnumTable::new(color, &names(&["RED", "RED"])).is_err());
    assert!(EnumTable::new(color, &[Value::Null]).is_err());
    assert!(EnumTable::new(color, &[Value::Int(0)]).is_err());

    let err = EnumTable::new(ClassId::STRING, &names(&["RED"])).err();
    assert_eq!(err, Some(RuntimeError::invalid_labels("String is not an enumeration")));
}

fn name(label: &str) -> TypeLabel {
    TypeLabel::Str(label.into())
}

#[test]
fn guarded_constant_falls_through() {
    let color = color();
    // case RED when guard; case RED; case Color c
    let labels = [name("RED"), name("RED"), TypeLabel::Class(color)];
    let switch = EnumSwitch::new(color, &labels).unwrap();
    let red = Value::enum_const(color, 0);
    let blue = Value::enum_const(color, 2);

    assert_eq!(switch.dispatch(&red, 0), 0);
    assert_eq!(switch.dispatch(&red, 1), 1);
    assert_eq!(switch.dispatch(&red, 2), 2);
    assert_eq!(switch.dispatch(&red, 3), 3);
    assert_eq!(switch.dispatch(&blue, 0), 2);
    assert_eq!(switch.dispatch(&blue, 3), 3);
    assert_eq!(switch.dispatch(&Value::Null, 0), NULL_INDEX);
}

#[test]
fn restartable_scan_agrees_with_dispatch() {
    let color = color();
    let labels = [name("GREEN"), name("PURPLE"), name("ALPHA"), name("GREEN")];
    let switch = EnumSwitch::new(color, &labels).unwrap();
    assert_eq!(switch.label_count(), 4);
    for ordinal in 0..4 {
        let value = Value::enum_const(color, ordinal);
        for restart in 0..6 {
            assert_eq!(switch.dispatch(&value, restart), switch.scan(&value, restart));
        }
    }
    assert_eq!(switch.dispatch(&Value::enum_const(color, 1), 1), 3);
    assert_eq!(switch.dispatch(&Value::enum_const(color, 0), 0), 4);
}

#[test]
fn restartable_rejects_foreign_labels() {
    let color = color();
    let other = ClassRegistry::global()
        .define(ClassDef::new("enum_table_tests.Size").enumeration(["SMALL", "LARGE"]));

    let err = EnumSwitch::new(color, &[name("RED"), TypeLabel::Class(other)]).err();
    assert_eq!(
        err,
        Some(RuntimeError::invalid_labels(
            "label enum_table_tests.Size.class at position 1 is not a constant name or \
             enum_table_tests.Color.class"
        ))
    );
    assert!(EnumSwitch::new(color, &[TypeLabel::Int(0)]).is_err());
    assert!(EnumSwitch::new(ClassId::STRING, &[name("RED")]).is_err());
}
