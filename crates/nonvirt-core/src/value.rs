//! NativeValue and ReturnValue: tagged unions crossing the invocation boundary
//!
//! `NativeValue<R>` is one marshaled argument; `R` is the host's reference
//! type. A host lowers the whole frame to its own untagged layout (for JNI,
//! `jvalue`) immediately before calling its invocation primitive.
//!
//! `ReturnValue<R>` is what an invocation primitive hands back. The typed
//! dispatch entry points unwrap it through [`FromReturn`].

use crate::kind::{PrimitiveKind, ReturnKind, TypeTag};

/// One marshaled argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeValue<R> {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char` (UTF-16 code unit)
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `None` is the null reference
    Reference(Option<R>),
}

impl<R> NativeValue<R> {
    /// The null reference
    #[inline]
    pub const fn null() -> Self {
        NativeValue::Reference(None)
    }

    /// Zero value of a primitive kind
    pub const fn zero(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => NativeValue::Boolean(false),
            PrimitiveKind::Byte => NativeValue::Byte(0),
            PrimitiveKind::Char => NativeValue::Char(0),
            PrimitiveKind::Short => NativeValue::Short(0),
            PrimitiveKind::Int => NativeValue::Int(0),
            PrimitiveKind::Long => NativeValue::Long(0),
            PrimitiveKind::Float => NativeValue::Float(0.0),
            PrimitiveKind::Double => NativeValue::Double(0.0),
        }
    }

    /// Tag this value was marshaled under
    pub const fn tag(&self) -> TypeTag {
        match self {
            NativeValue::Boolean(_) => TypeTag::Primitive(PrimitiveKind::Boolean),
            NativeValue::Byte(_) => TypeTag::Primitive(PrimitiveKind::Byte),
            NativeValue::Char(_) => TypeTag::Primitive(PrimitiveKind::Char),
            NativeValue::Short(_) => TypeTag::Primitive(PrimitiveKind::Short),
            NativeValue::Int(_) => TypeTag::Primitive(PrimitiveKind::Int),
            NativeValue::Long(_) => TypeTag::Primitive(PrimitiveKind::Long),
            NativeValue::Float(_) => TypeTag::Primitive(PrimitiveKind::Float),
            NativeValue::Double(_) => TypeTag::Primitive(PrimitiveKind::Double),
            NativeValue::Reference(_) => TypeTag::Reference,
        }
    }

    /// Check if this is the null reference
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, NativeValue::Reference(None))
    }

    /// Borrow the reference payload, if this is a non-null reference
    pub fn as_reference(&self) -> Option<&R> {
        match self {
            NativeValue::Reference(r) => r.as_ref(),
            _ => None,
        }
    }
}

impl<R> Default for NativeValue<R> {
    fn default() -> Self {
        Self::null()
    }
}

/// Result of a non-virtual invocation primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnValue<R> {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char` (UTF-16 code unit)
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// Reference result; `None` is null
    Object(Option<R>),
    /// No result
    Void,
}

impl<R> ReturnValue<R> {
    /// Kind of this result
    pub const fn kind(&self) -> ReturnKind {
        match self {
            ReturnValue::Boolean(_) => ReturnKind::Primitive(PrimitiveKind::Boolean),
            ReturnValue::Byte(_) => ReturnKind::Primitive(PrimitiveKind::Byte),
            ReturnValue::Char(_) => ReturnKind::Primitive(PrimitiveKind::Char),
            ReturnValue::Short(_) => ReturnKind::Primitive(PrimitiveKind::Short),
            ReturnValue::Int(_) => ReturnKind::Primitive(PrimitiveKind::Int),
            ReturnValue::Long(_) => ReturnKind::Primitive(PrimitiveKind::Long),
            ReturnValue::Float(_) => ReturnKind::Primitive(PrimitiveKind::Float),
            ReturnValue::Double(_) => ReturnKind::Primitive(PrimitiveKind::Double),
            ReturnValue::Object(_) => ReturnKind::Object,
            ReturnValue::Void => ReturnKind::Void,
        }
    }

    /// Zero value of a return kind: what a failed invocation hands back
    pub const fn zero(kind: ReturnKind) -> Self {
        match kind {
            ReturnKind::Primitive(PrimitiveKind::Boolean) => ReturnValue::Boolean(false),
            ReturnKind::Primitive(PrimitiveKind::Byte) => ReturnValue::Byte(0),
            ReturnKind::Primitive(PrimitiveKind::Char) => ReturnValue::Char(0),
            ReturnKind::Primitive(PrimitiveKind::Short) => ReturnValue::Short(0),
            ReturnKind::Primitive(PrimitiveKind::Int) => ReturnValue::Int(0),
            ReturnKind::Primitive(PrimitiveKind::Long) => ReturnValue::Long(0),
            ReturnKind::Primitive(PrimitiveKind::Float) => ReturnValue::Float(0.0),
            ReturnKind::Primitive(PrimitiveKind::Double) => ReturnValue::Double(0.0),
            ReturnKind::Object => ReturnValue::Object(None),
            ReturnKind::Void => ReturnValue::Void,
        }
    }
}

/// Typed view of a [`ReturnValue`].
///
/// Implemented for the ten result types of the dispatch entry points:
/// `bool`, `i8`, `u16`, `i16`, `i32`, `i64`, `f32`, `f64`, `Option<R>`, `()`.
pub trait FromReturn<R>: Sized {
    /// Return kind requested from the host primitive
    const KIND: ReturnKind;

    /// Unwrap a result of kind [`Self::KIND`]. Hands the value back on mismatch.
    fn from_return(value: ReturnValue<R>) -> Result<Self, ReturnValue<R>>;
}

macro_rules! primitive_from_return {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<R> FromReturn<R> for $ty {
                const KIND: ReturnKind = ReturnKind::Primitive(PrimitiveKind::$variant);

                #[inline]
                fn from_return(value: ReturnValue<R>) -> Result<Self, ReturnValue<R>> {
                    match value {
                        ReturnValue::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

primitive_from_return! {
    bool => Boolean,
    i8 => Byte,
    u16 => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl<R> FromReturn<R> for Option<R> {
    const KIND: ReturnKind = ReturnKind::Object;

    #[inline]
    fn from_return(value: ReturnValue<R>) -> Result<Self, ReturnValue<R>> {
        match value {
            ReturnValue::Object(r) => Ok(r),
            other => Err(other),
        }
    }
}

impl<R> FromReturn<R> for () {
    const KIND: ReturnKind = ReturnKind::Void;

    #[inline]
    fn from_return(value: ReturnValue<R>) -> Result<Self, ReturnValue<R>> {
        match value {
            ReturnValue::Void => Ok(()),
            other => Err(other),
        }
    }
}
