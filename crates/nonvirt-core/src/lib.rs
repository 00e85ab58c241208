//! nonvirt-core - non-virtual reflective invocation, independent of any host
//!
//! Given a reflective method handle, a receiver and a vector of *carrier
//! slots* (one-element arrays whose component type tags the argument kind),
//! this crate marshals the arguments into a [`CallFrame`] and calls the
//! method bound to its declaring type, skipping override resolution.
//!
//! The managed runtime is reached only through [`HostRuntime`]. The JNI
//! binding lives in `nonvirt-jni`.
//!
//! # Example
//!
//! ```ignore
//! use nonvirt_core::{dispatch_int, PrimitiveRegistry};
//!
//! let registry = PrimitiveRegistry::initialize(&mut host)?;
//! // A.getValue() on a B receiver, even though B overrides it
//! let value: i32 = dispatch_int(&mut host, &registry, &get_value, &receiver, Some(&args))?;
//! ```

#![warn(missing_docs)]

pub mod dispatch;
pub mod error;
pub mod frame;
pub mod host;
pub mod kind;
pub mod reflect;
pub mod registry;
pub mod value;

pub use dispatch::{
    dispatch, dispatch_boolean, dispatch_byte, dispatch_char, dispatch_double, dispatch_float,
    dispatch_int, dispatch_long, dispatch_object, dispatch_short, dispatch_void,
    dispatch_with_kind,
};
pub use error::{BridgeError, BridgeResult};
pub use frame::{live_frames, CallFrame, CallFrameBuilder};
pub use host::{HostRuntime, ReflectiveHost};
pub use kind::{PrimitiveKind, ReturnKind, TypeTag};
pub use reflect::{invoke, invoke_boxed, pack_carriers};
pub use registry::{PrimitiveRegistry, RegistryCell};
pub use value::{FromReturn, NativeValue, ReturnValue};
