//! Scalar kinds and runtime types.
//!
//! `RtType` is the static type vocabulary used by handle signatures and
//! pattern descriptors. A type is either a scalar (`Prim`) or a reference to
//! an interned class (`Ref`). Scalars have a canonical boxed class, which is
//! what a scalar value looks like when it flows through a reference slot.

use std::fmt;

use crate::class::{ClassId, ClassRegistry};
use crate::value::Value;

/// Scalar kinds of the managed environment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimKind {
    /// All scalar kinds, in declaration order.
    pub const ALL: [PrimKind; 8] = [
        PrimKind::Boolean,
        PrimKind::Byte,
        PrimKind::Short,
        PrimKind::Char,
        PrimKind::Int,
        PrimKind::Long,
        PrimKind::Float,
        PrimKind::Double,
    ];

    /// Source-level name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            PrimKind::Boolean => "boolean",
            PrimKind::Byte => "byte",
            PrimKind::Short => "short",
            PrimKind::Char => "char",
            PrimKind::Int => "int",
            PrimKind::Long => "long",
            PrimKind::Float => "float",
            PrimKind::Double => "double",
        }
    }

    /// The boxed class a value of this kind has in a reference slot.
    pub const fn boxed(self) -> ClassId {
        match self {
            PrimKind::Boolean => ClassId::BOOLEAN,
            PrimKind::Byte => ClassId::BYTE,
            PrimKind::Short => ClassId::SHORT,
            PrimKind::Char => ClassId::CHARACTER,
            PrimKind::Int => ClassId::INTEGER,
            PrimKind::Long => ClassId::LONG,
            PrimKind::Float => ClassId::FLOAT,
            PrimKind::Double => ClassId::DOUBLE,
        }
    }

    /// Inverse of [`PrimKind::boxed`].
    pub fn from_boxed(class: ClassId) -> Option<PrimKind> {
        PrimKind::ALL.into_iter().find(|k| k.boxed() == class)
    }

    /// Kinds whose canonical encoding is 64 bits wide.
    #[inline]
    pub const fn is_wide(self) -> bool {
        matches!(self, PrimKind::Long | PrimKind::Double)
    }

    /// Kinds that hold floating-point values.
    #[inline]
    pub const fn is_floating(self) -> bool {
        matches!(self, PrimKind::Float | PrimKind::Double)
    }
}

impl fmt::Display for PrimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A static type in the managed environment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RtType {
    /// A scalar type.
    Prim(PrimKind),
    /// A reference to an instance of the class (or a subclass), or null.
    Ref(ClassId),
}

impl RtType {
    pub const BOOLEAN: RtType = RtType::Prim(PrimKind::Boolean);
    pub const BYTE: RtType = RtType::Prim(PrimKind::Byte);
    pub const SHORT: RtType = RtType::Prim(PrimKind::Short);
    pub const CHAR: RtType = RtType::Prim(PrimKind::Char);
    pub const INT: RtType = RtType::Prim(PrimKind::Int);
    pub const LONG: RtType = RtType::Prim(PrimKind::Long);
    pub const FLOAT: RtType = RtType::Prim(PrimKind::Float);
    pub const DOUBLE: RtType = RtType::Prim(PrimKind::Double);
    pub const OBJECT: RtType = RtType::Ref(ClassId::OBJECT);
    pub const STRING: RtType = RtType::Ref(ClassId::STRING);
    pub const CARRIER: RtType = RtType::Ref(ClassId::CARRIER);

    #[inline]
    pub const fn is_primitive(self) -> bool {
        matches!(self, RtType::Prim(_))
    }

    #[inline]
    pub const fn prim(self) -> Option<PrimKind> {
        match self {
            RtType::Prim(kind) => Some(kind),
            RtType::Ref(_) => None,
        }
    }

    #[inline]
    pub const fn class(self) -> Option<ClassId> {
        match self {
            RtType::Prim(_) => None,
            RtType::Ref(class) => Some(class),
        }
    }

    /// The class of this type in a reference slot: boxed class for scalars.
    #[inline]
    pub const fn boxed(self) -> ClassId {
        match self {
            RtType::Prim(kind) => kind.boxed(),
            RtType::Ref(class) => class,
        }
    }

    /// Whether a value statically typed `other` may be stored in `self`.
    ///
    /// Scalars are only assignable from the identical scalar kind; no
    /// implicit widening or boxing happens here.
    pub fn is_assignable_from(self, other: RtType) -> bool {
        match (self, other) {
            (RtType::Prim(a), RtType::Prim(b)) => a == b,
            (RtType::Ref(a), RtType::Ref(b)) => ClassRegistry::global().is_subclass(b, a),
            _ => false,
        }
    }

    /// Whether `value` is a legal runtime inhabitant of this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            RtType::Prim(kind) => value.prim_kind() == Some(kind),
            RtType::Ref(class) => match value.class_of() {
                None => true,
                Some(actual) => ClassRegistry::global().is_subclass(actual, class),
            },
        }
    }
}

impl From<PrimKind> for RtType {
    fn from(kind: PrimKind) -> Self {
        RtType::Prim(kind)
    }
}

impl From<ClassId> for RtType {
    fn from(class: ClassId) -> Self {
        RtType::Ref(class)
    }
}

impl fmt::Display for RtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtType::Prim(kind) => write!(f, "{kind}"),
            RtType::Ref(class) => write!(f, "{}", ClassRegistry::global().name(*class)),
        }
    }
}
