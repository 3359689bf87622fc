use super::*;
use pretty_assertions::assert_eq;

#[test]
fn signature_display() {
    let sig = Signature::new(RtType::INT, [RtType::STRING, RtType::LONG]);
    assert_eq!(sig.to_string(), "(String, long) -> int");
    assert_eq!(Signature::new(RtType::OBJECT, []).to_string(), "() -> Object");
}

#[test]
fn signature_edits() {
    let sig = Signature::unary(RtType::OBJECT, RtType::BOOLEAN);
    assert_eq!(sig.with_ret(RtType::INT).ret(), RtType::INT);
    assert_eq!(sig.with_param(0, RtType::STRING).param(0), Some(RtType::STRING));
    assert_eq!(sig.with_param(3, RtType::STRING), sig);
}

#[test]
fn identity_and_constant() {
    let id = Handle::identity(RtType::INT);
    assert_eq!(id.invoke1(&Value::Int(4)), Ok(Value::Int(4)));

    let k = Handle::constant(Signature::unary(RtType::OBJECT, RtType::BOOLEAN), Value::Bool(true));
    assert_eq!(k.invoke1(&Value::Null), Ok(Value::Bool(true)));
}

#[test]
fn retype_shares_body() {
    let id = Handle::identity(RtType::OBJECT);
    let retyped = id
        .retype(Signature::unary(RtType::STRING, RtType::OBJECT))
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(retyped.same_body(&id));
    assert_eq!(retyped.signature().param(0), Some(RtType::STRING));
}

#[test]
fn retype_rejects_arity_change() {
    let id = Handle::identity(RtType::OBJECT);
    let err = id.retype(Signature::new(RtType::OBJECT, [])).err();
    assert!(matches!(err, Some(RuntimeError::ContractMismatch { .. })));
}

#[test]
fn no_match_propagates() {
    let failing = Handle::unary(RtType::OBJECT, RtType::OBJECT, |_| Err(NoMatch));
    assert_eq!(failing.invoke1(&Value::Int(1)), Err(NoMatch));
}
