//! Switch entry points.
//!
//! Every switch site maps its argument to `Value::Int(index)`: the case
//! position of the matching label, the label count when none matches, or
//! `-1` for a null target. Label sets are validated here, so a malformed
//! switch fails at bootstrap.
//!
//! Restartable switches take a second `int` argument, the case to resume
//! from after a guard fails.
//!
//! Sites start on a linear scan of the labels and link to the indexed lookup
//! on first use, unless relinking is disabled in the runtime configuration.

use std::sync::Arc;

use mrt_ir::{
    string_hash, ClassRegistry, Handle, NoMatch, RtType, RuntimeError, RuntimeResult, Signature,
    Value,
};
use mrt_switch::{
    table_site, EnumSwitch, EnumTable, LazyCallSite, Linker, NumericKind, NumericTable,
    StringHasher, StringTable, TypeLabel, TypeSwitch,
};
use tracing::debug;

use crate::CallSite;

/// The single parameter of a `(param) -> int` invocation.
fn unary_int_param(invocation: &Signature, expected: &str) -> RuntimeResult<RtType> {
    match invocation.params() {
        [param] if invocation.ret() == RtType::INT => Ok(*param),
        _ => Err(RuntimeError::contract_mismatch(invocation, expected)),
    }
}

fn numeric_switch(
    invocation: &Signature,
    labels: &[Value],
    accepts: impl Fn(NumericKind) -> bool,
    expected: &str,
) -> RuntimeResult<CallSite> {
    let param = unary_int_param(invocation, expected)?;
    let kind = NumericKind::of_type(param)
        .filter(|&kind| accepts(kind))
        .ok_or_else(|| RuntimeError::contract_mismatch(invocation, expected))?;
    let table = NumericTable::new(kind, labels)?;
    debug!(%invocation, %kind, labels = labels.len(), "bootstrapping numeric switch");
    CallSite::checked(invocation, table_site(table, param).into_handle())
}

/// Switch over int-like or long values (scalar or boxed).
pub fn int_switch(invocation: &Signature, labels: &[Value]) -> RuntimeResult<CallSite> {
    numeric_switch(
        invocation,
        labels,
        |kind| matches!(kind, NumericKind::Int | NumericKind::Long),
        "(int | long) -> int",
    )
}

/// Switch over float or double values (scalar or boxed), matched by bits.
pub fn float_switch(invocation: &Signature, labels: &[Value]) -> RuntimeResult<CallSite> {
    numeric_switch(
        invocation,
        labels,
        |kind| matches!(kind, NumericKind::Float | NumericKind::Double),
        "(float | double) -> int",
    )
}

/// Switch over strings, ordered by the runtime string hash.
pub fn string_switch(invocation: &Signature, labels: &[Value]) -> RuntimeResult<CallSite> {
    string_switch_with_hasher(invocation, labels, string_hash)
}

/// Switch over strings, ordered by `hasher`.
pub fn string_switch_with_hasher(
    invocation: &Signature,
    labels: &[Value],
    hasher: StringHasher,
) -> RuntimeResult<CallSite> {
    const EXPECTED: &str = "(String) -> int";
    if unary_int_param(invocation, EXPECTED)? != RtType::STRING {
        return Err(RuntimeError::contract_mismatch(invocation, EXPECTED));
    }
    let table = StringTable::with_hasher(labels, hasher)?;
    debug!(
        %invocation,
        labels = labels.len(),
        collisions = table.has_collisions(),
        "bootstrapping string switch"
    );
    CallSite::checked(invocation, table_site(table, RtType::STRING).into_handle())
}

/// Switch over the constants of the enumeration the invocation takes,
/// with labels given by constant name.
pub fn enum_switch(invocation: &Signature, names: &[Value]) -> RuntimeResult<CallSite> {
    const EXPECTED: &str = "(enum) -> int";
    let param = unary_int_param(invocation, EXPECTED)?;
    let class = param
        .class()
        .filter(|&class| ClassRegistry::global().get(class).enum_constants().is_some())
        .ok_or_else(|| RuntimeError::contract_mismatch(invocation, EXPECTED))?;
    let table = EnumTable::new(class, names)?;
    debug!(%invocation, labels = names.len(), "bootstrapping enum switch");
    CallSite::checked(invocation, table_site(table, param).into_handle())
}

/// The target of a `(target, int restart) -> int` invocation.
fn restart_target(invocation: &Signature, expected: &str) -> RuntimeResult<RtType> {
    match invocation.params() {
        [target, restart] if *restart == RtType::INT && invocation.ret() == RtType::INT => {
            Ok(*target)
        }
        _ => Err(RuntimeError::contract_mismatch(invocation, expected)),
    }
}

/// A `(target, restart) -> int` site over `switch`: `scan` until first use,
/// then `dispatch`.
fn restart_site<S: Send + Sync + 'static>(
    target: RtType,
    switch: S,
    scan: fn(&S, &Value, usize) -> i32,
    dispatch: fn(&S, &Value, usize) -> i32,
) -> LazyCallSite {
    let switch = Arc::new(switch);
    let sig = Signature::new(RtType::INT, [target, RtType::INT]);
    let generic = {
        let switch = Arc::clone(&switch);
        Handle::new(sig.clone(), move |args| {
            let (target, restart) = restart_args(args)?;
            Ok(Value::Int(scan(&switch, target, restart)))
        })
    };
    let linker: Linker = Arc::new(move |_: &[Value]| {
        let switch = Arc::clone(&switch);
        Handle::new(sig.clone(), move |args| {
            let (target, restart) = restart_args(args)?;
            Ok(Value::Int(dispatch(&switch, target, restart)))
        })
    });
    LazyCallSite::new(generic, linker)
}

/// Restartable switch over the constants of the enumeration the invocation
/// takes: `(enum, restart) -> int`.
///
/// Labels are constant names or the enumeration class itself and may repeat,
/// so a guarded case can fall through to a later case for the same constant.
pub fn enum_type_switch(invocation: &Signature, labels: &[TypeLabel]) -> RuntimeResult<CallSite> {
    const EXPECTED: &str = "(enum, int) -> int";
    let target = restart_target(invocation, EXPECTED)?;
    let class = target
        .class()
        .filter(|&class| ClassRegistry::global().get(class).enum_constants().is_some())
        .ok_or_else(|| RuntimeError::contract_mismatch(invocation, EXPECTED))?;
    let switch = EnumSwitch::new(class, labels)?;
    debug!(%invocation, labels = labels.len(), "bootstrapping restartable enum switch");
    let site = restart_site(target, switch, EnumSwitch::scan, EnumSwitch::dispatch);
    CallSite::checked(invocation, site.into_handle())
}

/// Type switch: `(target, restart) -> int`.
///
/// The target must be a reference type. A class-only switch links to its
/// memoized lookup on first use.
pub fn type_switch(invocation: &Signature, labels: Vec<TypeLabel>) -> RuntimeResult<CallSite> {
    const EXPECTED: &str = "(reference, int) -> int";
    let target = restart_target(invocation, EXPECTED)?;
    if target.is_primitive() {
        return Err(RuntimeError::contract_mismatch(invocation, EXPECTED));
    }

    let switch = TypeSwitch::new(labels)?;
    debug!(
        %invocation,
        labels = switch.labels().len(),
        class_only = switch.is_class_only(),
        "bootstrapping type switch"
    );
    let site = restart_site(target, switch, TypeSwitch::scan, TypeSwitch::dispatch);
    CallSite::checked(invocation, site.into_handle())
}

/// Target and restart index of a restartable switch invocation.
///
/// A negative restart index is a malformed invocation.
fn restart_args(args: &[Value]) -> Result<(&Value, usize), NoMatch> {
    match args {
        [target, Value::Int(restart)] => usize::try_from(*restart)
            .map(|restart| (target, restart))
            .map_err(|_| NoMatch),
        _ => Err(NoMatch),
    }
}
