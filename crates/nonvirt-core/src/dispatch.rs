//! Dispatch entry points
//!
//! Every entry point is the same three steps around one call frame:
//!
//! 1. build the frame (resolve method, marshal carriers),
//! 2. hand it to the host's non-virtual primitive for the requested kind,
//! 3. drop the frame, then return the primitive's result unchanged.
//!
//! The frame is owned by [`dispatch_with_kind`]; a host failure in step 2
//! returns through `?` and the frame is dropped on the way out, so storage is
//! released exactly once on every path.

use crate::error::BridgeError;
use crate::frame::CallFrameBuilder;
use crate::host::HostRuntime;
use crate::kind::ReturnKind;
use crate::registry::PrimitiveRegistry;
use crate::value::{FromReturn, ReturnValue};

/// Run one non-virtual invocation whose return kind is only known at runtime.
pub fn dispatch_with_kind<H: HostRuntime>(
    host: &mut H,
    registry: &PrimitiveRegistry<H::PinnedClass>,
    method: &H::Object,
    receiver: &H::Object,
    args: Option<&H::Object>,
    kind: ReturnKind,
) -> Result<ReturnValue<H::Object>, H::Error> {
    let frame = CallFrameBuilder::new(registry).build(host, method, args)?;
    log::trace!("dispatching non-virtual {} call {:?}", kind, frame);
    let result = frame.invoke(host, receiver, kind)?;
    drop(frame);
    Ok(result)
}

/// Run one non-virtual invocation returning `T`.
///
/// `T` selects the host primitive: `bool`, `i8`, `u16`, `i16`, `i32`, `i64`,
/// `f32`, `f64`, `Option<H::Object>` or `()`.
pub fn dispatch<H, T>(
    host: &mut H,
    registry: &PrimitiveRegistry<H::PinnedClass>,
    method: &H::Object,
    receiver: &H::Object,
    args: Option<&H::Object>,
) -> Result<T, H::Error>
where
    H: HostRuntime,
    T: FromReturn<H::Object>,
{
    let result = dispatch_with_kind(host, registry, method, receiver, args, T::KIND)?;
    T::from_return(result).map_err(|other| {
        BridgeError::ReturnMismatch {
            expected: T::KIND,
            actual: other.kind(),
        }
        .into()
    })
}

macro_rules! entry_points {
    ($($(#[$doc:meta])* $name:ident -> $ret:ty;)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $name<H: HostRuntime>(
                host: &mut H,
                registry: &PrimitiveRegistry<H::PinnedClass>,
                method: &H::Object,
                receiver: &H::Object,
                args: Option<&H::Object>,
            ) -> Result<$ret, H::Error> {
                dispatch::<H, $ret>(host, registry, method, receiver, args)
            }
        )*
    };
}

entry_points! {
    /// Non-virtual call of a `boolean` method
    dispatch_boolean -> bool;
    /// Non-virtual call of a `byte` method
    dispatch_byte -> i8;
    /// Non-virtual call of a `char` method
    dispatch_char -> u16;
    /// Non-virtual call of a `short` method
    dispatch_short -> i16;
    /// Non-virtual call of an `int` method
    dispatch_int -> i32;
    /// Non-virtual call of a `long` method
    dispatch_long -> i64;
    /// Non-virtual call of a `float` method
    dispatch_float -> f32;
    /// Non-virtual call of a `double` method
    dispatch_double -> f64;
    /// Non-virtual call of a reference-returning method; `None` is null
    dispatch_object -> Option<H::Object>;
    /// Non-virtual call of a `void` method
    dispatch_void -> ();
}
