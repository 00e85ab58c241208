//! HostRuntime trait: the managed runtime as seen from the bridge
//!
//! Defines every service the bridge consumes from the host: reflective
//! metadata, the array model, and the non-virtual invocation primitive. The
//! frame builder and dispatch routines program against this trait only; the
//! JNI binding and the in-memory test runtime are the two implementations.
//!
//! All methods take `&mut self` because real hosts thread a mutable
//! environment through every call (JNI's `JNIEnv`).

use crate::error::BridgeError;
use crate::kind::{PrimitiveKind, ReturnKind};
use crate::value::{NativeValue, ReturnValue};

/// Services the bridge needs from the host runtime.
pub trait HostRuntime {
    /// Reference to a managed object (receiver, method handle, array, argument)
    type Object;

    /// Type descriptor obtained during a single call
    type Class;

    /// Type descriptor that stays valid for the process lifetime
    type PinnedClass;

    /// Invocable entry point resolved from a method handle
    type MethodId: Copy;

    /// Host failure. Bridge-level failures convert into it.
    type Error: From<BridgeError>;

    // ========================================================================
    // Reflective Metadata
    // ========================================================================

    /// Resolve a reflective method handle to its entry point
    fn resolve_entry_point(&mut self, method: &Self::Object) -> Result<Self::MethodId, Self::Error>;

    /// Resolve the statically declared owning type of a method handle
    fn resolve_declaring_type(&mut self, method: &Self::Object) -> Result<Self::Class, Self::Error>;

    /// Resolve the descriptor of a primitive kind itself (not its wrapper)
    fn primitive_type(&mut self, kind: PrimitiveKind) -> Result<Self::PinnedClass, Self::Error>;

    // ========================================================================
    // Array Model
    // ========================================================================

    /// Get array length
    fn array_length(&mut self, array: &Self::Object) -> Result<usize, Self::Error>;

    /// Get element of a reference array; `None` is the null reference
    fn array_element(
        &mut self,
        array: &Self::Object,
        index: usize,
    ) -> Result<Option<Self::Object>, Self::Error>;

    /// Component type of an array, if the host can tell
    fn component_type(&mut self, array: &Self::Object) -> Result<Option<Self::Class>, Self::Error>;

    /// Identity comparison of a per-call descriptor against a pinned one
    fn is_same_type(
        &mut self,
        class: &Self::Class,
        pinned: &Self::PinnedClass,
    ) -> Result<bool, Self::Error>;

    /// Read element 0 of a primitive array of the given kind
    fn read_primitive(
        &mut self,
        array: &Self::Object,
        kind: PrimitiveKind,
    ) -> Result<NativeValue<Self::Object>, Self::Error>;

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Invoke `method` on `receiver` bound to `class`, bypassing overrides.
    ///
    /// Must return a value of `kind`. A failure raised by the callee is
    /// reported through `Self::Error` and left pending in the host.
    fn call_nonvirtual(
        &mut self,
        receiver: &Self::Object,
        class: &Self::Class,
        method: Self::MethodId,
        kind: ReturnKind,
        args: &[NativeValue<Self::Object>],
    ) -> Result<ReturnValue<Self::Object>, Self::Error>;
}

/// Extra reflective services used by the boxed-argument façade.
pub trait ReflectiveHost: HostRuntime {
    /// Return kind declared by a method handle
    fn return_kind(&mut self, method: &Self::Object) -> Result<ReturnKind, Self::Error>;

    /// Declared parameter types, in order
    fn parameter_types(&mut self, method: &Self::Object) -> Result<Vec<Self::Class>, Self::Error>;

    /// Create a one-element carrier for `parameter` holding `value`.
    ///
    /// Primitive parameters get a carrier of that primitive type with the
    /// value unboxed into it; any other parameter gets a reference carrier.
    fn new_carrier(
        &mut self,
        parameter: &Self::Class,
        value: &Self::Object,
    ) -> Result<Self::Object, Self::Error>;

    /// Collect carrier slots into a host argument vector
    fn new_argument_vector(
        &mut self,
        slots: Vec<Option<Self::Object>>,
    ) -> Result<Self::Object, Self::Error>;
}
