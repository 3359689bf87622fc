use super::*;
use mrt_ir::ClassId;
use pretty_assertions::assert_eq;

#[test]
fn classification() {
    assert_eq!(SlotClass::of(RtType::STRING), SlotClass::Ref);
    assert_eq!(SlotClass::of(RtType::Ref(ClassId::INTEGER)), SlotClass::Ref);
    assert_eq!(SlotClass::of(RtType::BOOLEAN), SlotClass::Narrow);
    assert_eq!(SlotClass::of(RtType::CHAR), SlotClass::Narrow);
    assert_eq!(SlotClass::of(RtType::FLOAT), SlotClass::Narrow);
    assert_eq!(SlotClass::of(RtType::LONG), SlotClass::Wide);
    assert_eq!(SlotClass::of(RtType::DOUBLE), SlotClass::Wide);
}

#[test]
fn shape_of_mixed_types() {
    let shape =
        Shape::of(&[RtType::DOUBLE, RtType::STRING, RtType::BYTE, RtType::LONG, RtType::OBJECT]);
    assert_eq!(shape, Shape::new(2, 1, 2));
    assert_eq!(shape.slot_count(), 7);
    assert_eq!(shape.component_count(), 5);
    assert_eq!(shape.offset(SlotClass::Ref), 0);
    assert_eq!(shape.offset(SlotClass::Narrow), 2);
    assert_eq!(shape.offset(SlotClass::Wide), 3);
    assert_eq!(shape.class_at(1), SlotClass::Ref);
    assert_eq!(shape.class_at(2), SlotClass::Narrow);
    assert_eq!(shape.class_at(4), SlotClass::Wide);
}

#[test]
fn names_are_structural() {
    assert_eq!(Shape::new(1, 1, 1).name(), "Carrier_o1_i1_l1");
    assert_eq!(
        Shape::of(&[RtType::INT, RtType::STRING]).name(),
        Shape::of(&[RtType::OBJECT, RtType::CHAR]).name()
    );
}

#[test]
fn canonical_types_follow_regions() {
    let types: Vec<RtType> = Shape::new(1, 2, 1).canonical_types().collect();
    assert_eq!(types, vec![RtType::OBJECT, RtType::INT, RtType::INT, RtType::LONG]);
}
