//! Runtime values of the managed environment.
//!
//! # Thread Safety
//!
//! Every heap-backed variant is `Arc`-shared and immutable, so values can be
//! cloned freely across threads. Opaque payloads must be `Send + Sync`.
//!
//! # Equality
//!
//! `Value::equals` is value equality: scalars compare by kind and value
//! (floating values by raw bits, so `NaN` equals itself and `0.0` differs from
//! `-0.0`), strings by contents, objects field-wise, and opaque values by
//! identity.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::class::{ClassId, ClassRegistry};
use crate::ty::PrimKind;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    /// The absent reference.
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    /// A UTF-16 code unit.
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    /// An enumeration constant.
    Enum(EnumConst),
    /// An instance of a user class (records included).
    Object(Arc<Instance>),
    /// A runtime-internal value: carriers, sentinels.
    Opaque(Opaque),
}

/// An enumeration constant, identified by class and declaration ordinal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumConst {
    pub class: ClassId,
    pub ordinal: u32,
}

/// An instance of a user class.
#[derive(Clone, Debug)]
pub struct Instance {
    pub class: ClassId,
    pub fields: Box<[Value]>,
}

/// A type-erased runtime-internal value with identity semantics.
#[derive(Clone)]
pub struct Opaque {
    class: ClassId,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(class: ClassId, payload: T) -> Self {
        Opaque {
            class,
            payload: Arc::new(payload),
        }
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Opaque({}@{:p})",
            ClassRegistry::global().name(self.class),
            Arc::as_ptr(&self.payload).cast::<()>()
        )
    }
}

impl Value {
    // Factory Methods

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create an instance of `class` with the given fields.
    #[inline]
    pub fn object(class: ClassId, fields: Vec<Value>) -> Self {
        Value::Object(Arc::new(Instance {
            class,
            fields: fields.into_boxed_slice(),
        }))
    }

    /// Create an enumeration constant.
    #[inline]
    pub fn enum_const(class: ClassId, ordinal: u32) -> Self {
        Value::Enum(EnumConst { class, ordinal })
    }

    /// Wrap a runtime-internal payload.
    #[inline]
    pub fn opaque<T: Any + Send + Sync>(class: ClassId, payload: T) -> Self {
        Value::Opaque(Opaque::new(class, payload))
    }

    // Type Checking

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The scalar kind of this value, if it is a scalar.
    pub fn prim_kind(&self) -> Option<PrimKind> {
        match self {
            Value::Bool(_) => Some(PrimKind::Boolean),
            Value::Byte(_) => Some(PrimKind::Byte),
            Value::Short(_) => Some(PrimKind::Short),
            Value::Char(_) => Some(PrimKind::Char),
            Value::Int(_) => Some(PrimKind::Int),
            Value::Long(_) => Some(PrimKind::Long),
            Value::Float(_) => Some(PrimKind::Float),
            Value::Double(_) => Some(PrimKind::Double),
            Value::Null
            | Value::Str(_)
            | Value::Enum(_)
            | Value::Object(_)
            | Value::Opaque(_) => None,
        }
    }

    /// Runtime class of this value; scalars report their boxed class.
    ///
    /// Returns `None` for `Null`.
    pub fn class_of(&self) -> Option<ClassId> {
        match self {
            Value::Null => None,
            Value::Str(_) => Some(ClassId::STRING),
            Value::Enum(e) => Some(e.class),
            Value::Object(o) => Some(o.class),
            Value::Opaque(o) => Some(o.class),
            scalar => scalar.prim_kind().map(PrimKind::boxed),
        }
    }

    /// Whether this value is an instance of `class` (null never is).
    pub fn is_instance_of(&self, class: ClassId) -> bool {
        self.class_of()
            .is_some_and(|actual| ClassRegistry::global().is_subclass(actual, class))
    }

    // Accessors

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumConst> {
        match self {
            Value::Enum(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Value::Opaque(o) => Some(o),
            _ => None,
        }
    }

    /// Integral value widened to `i64`, for int-like scalars.
    ///
    /// Covers byte, short, char, int and long; booleans and floating values
    /// are not integral.
    pub fn integral(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::Short(n) => Some(i64::from(*n)),
            Value::Char(c) => Some(i64::from(*c)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    // Equality

    /// Value equality.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.class == b.class
                        && a.fields.len() == b.fields.len()
                        && a.fields.iter().zip(b.fields.iter()).all(|(x, y)| x.equals(y)))
            }
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Get the type name of this value for diagnostics.
    pub fn type_name(&self) -> Arc<str> {
        match self.class_of() {
            None => Arc::from("null"),
            Some(class) => match self.prim_kind() {
                Some(kind) => Arc::from(kind.name()),
                None => ClassRegistry::global().name(class),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Byte(n) => write!(f, "Byte({n})"),
            Value::Short(n) => write!(f, "Short({n})"),
            Value::Char(c) => write!(f, "Char({c:#06x})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Long(n) => write!(f, "Long({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Double(x) => write!(f, "Double({x:?})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Enum(e) => write!(
                f,
                "Enum({}#{})",
                ClassRegistry::global().name(e.class),
                e.ordinal
            ),
            Value::Object(o) => {
                write!(f, "{}", ClassRegistry::global().name(o.class))?;
                f.debug_list().entries(o.fields.iter()).finish()
            }
            Value::Opaque(o) => write!(f, "{o:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Byte(n) => write!(f, "{n}"),
            Value::Short(n) => write!(f, "{n}"),
            Value::Char(c) => match char::from_u32(u32::from(*c)) {
                Some(ch) => write!(f, "{ch}"),
                None => write!(f, "\\u{c:04x}"),
            },
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Double(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Enum(e) => {
                let info = ClassRegistry::global().get(e.class);
                let name = info
                    .enum_constants()
                    .and_then(|constants| constants.get(e.ordinal as usize));
                match name {
                    Some(name) => write!(f, "{}.{name}", info.name),
                    None => write!(f, "{}#{}", info.name, e.ordinal),
                }
            }
            Value::Object(o) => {
                write!(f, "{}(", ClassRegistry::global().name(o.class))?;
                for (i, field) in o.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            }
            Value::Opaque(o) => write!(f, "{o:?}"),
        }
    }
}

/// Hash code of a string in the managed environment.
///
/// The 31-polynomial over UTF-16 code units with wrapping 32-bit arithmetic,
/// so that `"Aa"` and `"BB"` collide as they do in the host environment.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
