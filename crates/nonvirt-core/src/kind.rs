//! Kind enumerations shared by the registry, the frame builder and dispatch
//!
//! Three closed sets:
//!
//! ```text
//! PrimitiveKind  Boolean Byte Char Short Int Long Float Double
//! TypeTag        PrimitiveKind | Reference
//! ReturnKind     PrimitiveKind | Object | Void
//! ```

use std::fmt;

/// One of the eight primitive kinds a carrier array can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char` (UTF-16 code unit)
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveKind {
    /// Every primitive kind, in registry slot order.
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Slot of this kind in [`PrimitiveKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PrimitiveKind::Boolean => 0,
            PrimitiveKind::Byte => 1,
            PrimitiveKind::Char => 2,
            PrimitiveKind::Short => 3,
            PrimitiveKind::Int => 4,
            PrimitiveKind::Long => 5,
            PrimitiveKind::Float => 6,
            PrimitiveKind::Double => 7,
        }
    }

    /// Source-level keyword (`int`, `boolean`, ...)
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Look a kind up by its keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a single argument slot is extracted from its carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Carrier component type matched a registered primitive type
    Primitive(PrimitiveKind),
    /// Null marker, reference carrier, or unrecognized component type
    Reference,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Primitive(kind) => kind.fmt(f),
            TypeTag::Reference => f.write_str("reference"),
        }
    }
}

/// Return kind of a non-virtual invocation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// Method returns a primitive value
    Primitive(PrimitiveKind),
    /// Method returns a reference (possibly null)
    Object,
    /// Method returns nothing
    Void,
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnKind::Primitive(kind) => kind.fmt(f),
            ReturnKind::Object => f.write_str("object"),
            ReturnKind::Void => f.write_str("void"),
        }
    }
}
