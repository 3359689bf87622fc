//! Class interner for the managed environment.
//!
//! Classes are interned once per name in a process-wide registry and then
//! referred to by a copyable `ClassId`. Well-known classes have fixed ids so
//! they can be named as constants without a registry lookup.
//!
//! # Thread Safety
//!
//! The name map is a `DashMap` (sharded, concurrent), and the id-indexed
//! class table sits behind a `parking_lot::RwLock`. Definition takes the name
//! shard first and the table second; lookups only ever take one of the two,
//! so there is no lock-order inversion.

use std::fmt;
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use crate::ty::{PrimKind, RtType};
use crate::value::Value;

/// Interned class identifier.
///
/// Pre-interned classes have known indices (0-13).
/// User classes are interned on first definition.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    pub const OBJECT: ClassId = ClassId(0);
    pub const STRING: ClassId = ClassId(1);
    pub const NUMBER: ClassId = ClassId(2);
    pub const BOOLEAN: ClassId = ClassId(3);
    pub const BYTE: ClassId = ClassId(4);
    pub const SHORT: ClassId = ClassId(5);
    pub const CHARACTER: ClassId = ClassId(6);
    pub const INTEGER: ClassId = ClassId(7);
    pub const LONG: ClassId = ClassId(8);
    pub const FLOAT: ClassId = ClassId(9);
    pub const DOUBLE: ClassId = ClassId(10);
    /// Common superclass of all enumerations.
    pub const ENUM: ClassId = ClassId(11);
    /// Common superclass of all records.
    pub const RECORD: ClassId = ClassId(12);
    /// Common superclass of all carrier classes.
    pub const CARRIER: ClassId = ClassId(13);

    /// First index handed out to user classes.
    pub const FIRST_USER: u32 = 14;

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether instances of `self` may be used where `other` is expected.
    #[inline]
    pub fn is_subclass_of(self, other: ClassId) -> bool {
        ClassRegistry::global().is_subclass(self, other)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({}: {})", self.0, ClassRegistry::global().name(*self))
    }
}

bitflags! {
    /// Class modifiers.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ClassFlags: u8 {
        const FINAL = 1 << 0;
        const ABSTRACT = 1 << 1;
        /// Generated by the runtime rather than declared by the program.
        const SYNTHETIC = 1 << 2;
    }
}

/// One component of a record class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordComponent {
    pub name: Arc<str>,
    pub ty: RtType,
}

impl RecordComponent {
    pub fn new(name: &str, ty: RtType) -> Self {
        RecordComponent {
            name: Arc::from(name),
            ty,
        }
    }
}

/// What sort of class this is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Plain,
    Interface,
    /// Boxed form of a scalar kind.
    Boxed(PrimKind),
    /// Enumeration with constants in declaration (ordinal) order.
    Enum { constants: Arc<[Arc<str>]> },
    /// Record with components in declaration order.
    Record { components: Arc<[RecordComponent]> },
}

/// Interned class metadata.
#[derive(Clone, Debug)]
pub struct ClassInfo {
    pub name: Arc<str>,
    pub superclass: Option<ClassId>,
    pub interfaces: SmallVec<[ClassId; 2]>,
    pub kind: ClassKind,
    pub flags: ClassFlags,
}

impl ClassInfo {
    /// Enumeration constants, if this is an enum class.
    pub fn enum_constants(&self) -> Option<&[Arc<str>]> {
        match &self.kind {
            ClassKind::Enum { constants } => Some(constants),
            _ => None,
        }
    }

    /// Record components, if this is a record class.
    pub fn record_components(&self) -> Option<&[RecordComponent]> {
        match &self.kind {
            ClassKind::Record { components } => Some(components),
            _ => None,
        }
    }
}

/// Builder for a class definition.
///
/// ```text
/// let shape = registry.define(ClassDef::new("Shape").interface());
/// let point = registry.define(
///     ClassDef::new("Point").record([("x", RtType::INT), ("y", RtType::INT)]),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ClassDef {
    name: String,
    superclass: ClassId,
    interfaces: SmallVec<[ClassId; 2]>,
    kind: ClassKind,
    flags: ClassFlags,
}

impl ClassDef {
    /// A plain class extending `Object`.
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            superclass: ClassId::OBJECT,
            interfaces: SmallVec::new(),
            kind: ClassKind::Plain,
            flags: ClassFlags::empty(),
        }
    }

    #[must_use]
    pub fn extends(mut self, superclass: ClassId) -> Self {
        self.superclass = superclass;
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: ClassId) -> Self {
        self.interfaces.push(interface);
        self
    }

    #[must_use]
    pub fn interface(mut self) -> Self {
        self.kind = ClassKind::Interface;
        self.flags |= ClassFlags::ABSTRACT;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// An enumeration extending `Enum` with the given constants.
    #[must_use]
    pub fn enumeration<'a>(mut self, constants: impl IntoIterator<Item = &'a str>) -> Self {
        self.superclass = ClassId::ENUM;
        self.kind = ClassKind::Enum {
            constants: constants.into_iter().map(Arc::from).collect(),
        };
        self.flags |= ClassFlags::FINAL;
        self
    }

    /// A record extending `Record` with the given components.
    #[must_use]
    pub fn record<'a>(mut self, components: impl IntoIterator<Item = (&'a str, RtType)>) -> Self {
        self.superclass = ClassId::RECORD;
        self.kind = ClassKind::Record {
            components: components
                .into_iter()
                .map(|(name, ty)| RecordComponent::new(name, ty))
                .collect(),
        };
        self.flags |= ClassFlags::FINAL;
        self
    }
}

static GLOBAL_REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();

/// Class interner for concurrent class definition and lookup.
pub struct ClassRegistry {
    /// Map from class name to id.
    by_name: DashMap<Arc<str>, ClassId, FxBuildHasher>,
    /// Class metadata indexed by id.
    classes: RwLock<Vec<Arc<ClassInfo>>>,
}

impl ClassRegistry {
    /// Create a new registry with the well-known classes pre-interned.
    pub fn new() -> Self {
        let registry = ClassRegistry {
            by_name: DashMap::with_hasher(FxBuildHasher),
            classes: RwLock::new(Vec::with_capacity(64)),
        };
        registry.pre_intern_well_known();
        registry
    }

    /// The process-wide registry.
    pub fn global() -> &'static ClassRegistry {
        GLOBAL_REGISTRY.get_or_init(ClassRegistry::new)
    }

    fn pre_intern_well_known(&self) {
        let object = ClassInfo {
            name: Arc::from("Object"),
            superclass: None,
            interfaces: SmallVec::new(),
            kind: ClassKind::Plain,
            flags: ClassFlags::empty(),
        };
        let derived = |name: &str, superclass: ClassId, kind: ClassKind, flags: ClassFlags| {
            ClassInfo {
                name: Arc::from(name),
                superclass: Some(superclass),
                interfaces: SmallVec::new(),
                kind,
                flags,
            }
        };
        let well_known = [
            (ClassId::OBJECT, object),
            (
                ClassId::STRING,
                derived("String", ClassId::OBJECT, ClassKind::Plain, ClassFlags::FINAL),
            ),
            (
                ClassId::NUMBER,
                derived("Number", ClassId::OBJECT, ClassKind::Plain, ClassFlags::ABSTRACT),
            ),
            (ClassId::BOOLEAN, boxed("Boolean", ClassId::OBJECT, PrimKind::Boolean)),
            (ClassId::BYTE, boxed("Byte", ClassId::NUMBER, PrimKind::Byte)),
            (ClassId::SHORT, boxed("Short", ClassId::NUMBER, PrimKind::Short)),
            (ClassId::CHARACTER, boxed("Character", ClassId::OBJECT, PrimKind::Char)),
            (ClassId::INTEGER, boxed("Integer", ClassId::NUMBER, PrimKind::Int)),
            (ClassId::LONG, boxed("Long", ClassId::NUMBER, PrimKind::Long)),
            (ClassId::FLOAT, boxed("Float", ClassId::NUMBER, PrimKind::Float)),
            (ClassId::DOUBLE, boxed("Double", ClassId::NUMBER, PrimKind::Double)),
            (
                ClassId::ENUM,
                derived("Enum", ClassId::OBJECT, ClassKind::Plain, ClassFlags::ABSTRACT),
            ),
            (
                ClassId::RECORD,
                derived("Record", ClassId::OBJECT, ClassKind::Plain, ClassFlags::ABSTRACT),
            ),
            (
                ClassId::CARRIER,
                derived("Carrier", ClassId::OBJECT, ClassKind::Plain, ClassFlags::ABSTRACT),
            ),
        ];

        let mut classes = self.classes.write();
        for (id, info) in well_known {
            debug_assert_eq!(id.index(), classes.len());
            self.by_name.insert(Arc::clone(&info.name), id);
            classes.push(Arc::new(info));
        }
    }

    /// Define a class, returning its id.
    ///
    /// Definition is idempotent by name: defining a name that already exists
    /// returns the existing id and ignores the new definition.
    pub fn define(&self, def: ClassDef) -> ClassId {
        // Fast path: already interned
        if let Some(id) = self.by_name.get(def.name.as_str()) {
            return *id;
        }

        // Slow path: the entry holds the shard lock, so concurrent
        // definitions of the same name cannot both allocate an id.
        match self.by_name.entry(Arc::from(def.name.as_str())) {
            Entry::Occupied(existing) => *existing.get(),
            Entry::Vacant(slot) => {
                let info = ClassInfo {
                    name: Arc::clone(slot.key()),
                    superclass: Some(def.superclass),
                    interfaces: def.interfaces,
                    kind: def.kind,
                    flags: def.flags,
                };
                let mut classes = self.classes.write();
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "class count is bounded far below u32::MAX"
                )]
                let id = ClassId(classes.len() as u32);
                classes.push(Arc::new(info));
                drop(classes);
                tracing::trace!(class = %slot.key(), id = id.raw(), "defined class");
                slot.insert(id);
                id
            }
        }
    }

    /// Look up a class by name.
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).map(|id| *id)
    }

    /// Metadata for a class.
    ///
    /// Ids only come from this registry, so a miss indicates an id minted by
    /// a different registry instance; `Object` is returned in that case.
    pub fn get(&self, id: ClassId) -> Arc<ClassInfo> {
        let classes = self.classes.read();
        let info = classes.get(id.index()).unwrap_or(&classes[0]);
        Arc::clone(info)
    }

    /// Class name for display.
    pub fn name(&self, id: ClassId) -> Arc<str> {
        Arc::clone(&self.get(id).name)
    }

    /// Number of interned classes.
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Always false: the well-known classes are pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `sub` is `sup` or transitively extends/implements it.
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup || sup == ClassId::OBJECT {
            return true;
        }
        let classes = self.classes.read();
        let mut pending: SmallVec<[ClassId; 8]> = SmallVec::new();
        pending.push(sub);
        while let Some(current) = pending.pop() {
            let Some(info) = classes.get(current.index()) else {
                continue;
            };
            if let Some(superclass) = info.superclass {
                if superclass == sup {
                    return true;
                }
                pending.push(superclass);
            }
            for &interface in &info.interfaces {
                if interface == sup {
                    return true;
                }
                pending.push(interface);
            }
        }
        false
    }

    /// Resolve an enumeration constant by name.
    ///
    /// Returns `None` when `class` is not an enum or has no such constant.
    pub fn enum_constant(&self, class: ClassId, name: &str) -> Option<Value> {
        let info = self.get(class);
        let ordinal = info
            .enum_constants()?
            .iter()
            .position(|constant| &**constant == name)?;
        u32::try_from(ordinal)
            .ok()
            .map(|ordinal| Value::enum_const(class, ordinal))
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn boxed(name: &str, superclass: ClassId, kind: PrimKind) -> ClassInfo {
    ClassInfo {
        name: Arc::from(name),
        superclass: Some(superclass),
        interfaces: SmallVec::new(),
        kind: ClassKind::Boxed(kind),
        flags: ClassFlags::FINAL,
    }
}
