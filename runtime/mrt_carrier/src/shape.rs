//! Carrier shapes.
//!
//! A carrier stores its components in three regions, always in this order:
//! references, narrow scalars (everything that fits in an `int`), and wide
//! scalars (`long` and `double`, stored as `long`). A `Shape` is the count of
//! components in each region.

use std::fmt;

use mrt_ir::{PrimKind, RtType};

/// Storage region of a component.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotClass {
    Ref,
    Narrow,
    Wide,
}

impl SlotClass {
    /// Region a component of type `ty` is stored in.
    pub fn of(ty: RtType) -> Self {
        match ty {
            RtType::Ref(_) => SlotClass::Ref,
            RtType::Prim(PrimKind::Long | PrimKind::Double) => SlotClass::Wide,
            RtType::Prim(_) => SlotClass::Narrow,
        }
    }

    /// The canonical storage type of the region.
    pub fn canonical_type(self) -> RtType {
        match self {
            SlotClass::Ref => RtType::OBJECT,
            SlotClass::Narrow => RtType::INT,
            SlotClass::Wide => RtType::LONG,
        }
    }
}

/// Region counts of a carrier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    refs: usize,
    narrow: usize,
    wide: usize,
}

impl Shape {
    pub const fn new(refs: usize, narrow: usize, wide: usize) -> Self {
        Shape { refs, narrow, wide }
    }

    /// Shape needed to store components of the given types.
    pub fn of(types: &[RtType]) -> Self {
        types.iter().fold(Shape::default(), |mut shape, &ty| {
            match SlotClass::of(ty) {
                SlotClass::Ref => shape.refs += 1,
                SlotClass::Narrow => shape.narrow += 1,
                SlotClass::Wide => shape.wide += 1,
            }
            shape
        })
    }

    #[inline]
    pub const fn refs(self) -> usize {
        self.refs
    }

    #[inline]
    pub const fn narrow(self) -> usize {
        self.narrow
    }

    #[inline]
    pub const fn wide(self) -> usize {
        self.wide
    }

    /// Slots used, counting a wide component as two.
    #[inline]
    pub const fn slot_count(self) -> usize {
        self.refs + self.narrow + 2 * self.wide
    }

    /// Number of components.
    #[inline]
    pub const fn component_count(self) -> usize {
        self.refs + self.narrow + self.wide
    }

    /// First canonical position of a region.
    #[inline]
    pub const fn offset(self, class: SlotClass) -> usize {
        match class {
            SlotClass::Ref => 0,
            SlotClass::Narrow => self.refs,
            SlotClass::Wide => self.refs + self.narrow,
        }
    }

    /// Region of a canonical position.
    pub const fn class_at(self, position: usize) -> SlotClass {
        if position < self.refs {
            SlotClass::Ref
        } else if position < self.refs + self.narrow {
            SlotClass::Narrow
        } else {
            SlotClass::Wide
        }
    }

    /// Canonical storage types in canonical order.
    pub fn canonical_types(self) -> impl Iterator<Item = RtType> {
        std::iter::repeat(RtType::OBJECT)
            .take(self.refs)
            .chain(std::iter::repeat(RtType::INT).take(self.narrow))
            .chain(std::iter::repeat(RtType::LONG).take(self.wide))
    }

    /// Structural class name; equal shapes always produce equal names.
    pub fn name(self) -> String {
        format!("Carrier_o{}_i{}_l{}", self.refs, self.narrow, self.wide)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests;
