//! Call frames: one marshaled invocation each
//!
//! A [`CallFrame`] owns everything a non-virtual invocation primitive needs:
//! the entry point, the statically bound declaring type, and one
//! [`NativeValue`] per argument. The builder fills it from a host argument
//! vector of carrier slots:
//!
//! ```text
//! args[i] == null                      -> Reference(None)
//! component_type(args[i]) == int.class -> Int(args[i][0])     (any of the 8 kinds)
//! anything else                        -> Reference(args[i][0])
//! ```
//!
//! Only element 0 of a carrier is read; longer carriers are not an error.
//!
//! Frames are released by `Drop`, so every exit path of a dispatch (including
//! `?` on a host failure) frees the value storage exactly once.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::host::HostRuntime;
use crate::kind::{ReturnKind, TypeTag};
use crate::registry::PrimitiveRegistry;
use crate::value::{NativeValue, ReturnValue};

static LIVE_FRAMES: AtomicUsize = AtomicUsize::new(0);

/// Number of call frames currently alive in this process.
///
/// Zero whenever no dispatch is in progress.
pub fn live_frames() -> usize {
    LIVE_FRAMES.load(Ordering::Acquire)
}

/// Marshaled state for one non-virtual invocation.
pub struct CallFrame<H: HostRuntime> {
    method: H::MethodId,
    declaring_class: H::Class,
    args: Vec<NativeValue<H::Object>>,
}

impl<H: HostRuntime> CallFrame<H> {
    fn new(method: H::MethodId, declaring_class: H::Class, args: Vec<NativeValue<H::Object>>) -> Self {
        LIVE_FRAMES.fetch_add(1, Ordering::AcqRel);
        Self {
            method,
            declaring_class,
            args,
        }
    }

    /// Resolved entry point
    #[inline]
    pub fn method(&self) -> H::MethodId {
        self.method
    }

    /// Type the call is bound to
    #[inline]
    pub fn declaring_class(&self) -> &H::Class {
        &self.declaring_class
    }

    /// Marshaled arguments, in declared parameter order
    #[inline]
    pub fn args(&self) -> &[NativeValue<H::Object>] {
        &self.args
    }

    /// Tag of every argument slot
    pub fn tags(&self) -> Vec<TypeTag> {
        self.args.iter().map(NativeValue::tag).collect()
    }

    /// Invoke the host primitive with this frame
    pub fn invoke(
        &self,
        host: &mut H,
        receiver: &H::Object,
        kind: ReturnKind,
    ) -> Result<ReturnValue<H::Object>, H::Error> {
        host.call_nonvirtual(receiver, &self.declaring_class, self.method, kind, &self.args)
    }
}

impl<H: HostRuntime> Drop for CallFrame<H> {
    fn drop(&mut self) {
        LIVE_FRAMES.fetch_sub(1, Ordering::AcqRel);
        log::trace!("released call frame ({} args)", self.args.len());
    }
}

impl<H: HostRuntime> fmt::Debug for CallFrame<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallFrame")
            .field("tags", &self.tags())
            .finish_non_exhaustive()
    }
}

/// Builds [`CallFrame`]s against a primitive-type registry.
pub struct CallFrameBuilder<'r, T> {
    registry: &'r PrimitiveRegistry<T>,
}

impl<'r, T> CallFrameBuilder<'r, T> {
    /// Create a builder reading the given registry
    pub fn new(registry: &'r PrimitiveRegistry<T>) -> Self {
        Self { registry }
    }

    /// Marshal `args` for a non-virtual call of `method`.
    ///
    /// A missing argument vector is treated as an empty one.
    pub fn build<H>(
        &self,
        host: &mut H,
        method: &H::Object,
        args: Option<&H::Object>,
    ) -> Result<CallFrame<H>, H::Error>
    where
        H: HostRuntime<PinnedClass = T>,
    {
        let entry = host.resolve_entry_point(method)?;
        let declaring_class = host.resolve_declaring_type(method)?;

        let len = match args {
            Some(args) => host.array_length(args)?,
            None => 0,
        };
        let mut values = Vec::with_capacity(len);
        if let Some(args) = args {
            for index in 0..len {
                let value = match host.array_element(args, index)? {
                    Some(carrier) => self.unwrap_carrier(host, &carrier)?,
                    None => NativeValue::null(),
                };
                values.push(value);
            }
        }

        log::trace!("built call frame ({} args)", values.len());
        Ok(CallFrame::new(entry, declaring_class, values))
    }

    /// Extract element 0 of one carrier under the tag its component type selects
    fn unwrap_carrier<H>(&self, host: &mut H, carrier: &H::Object) -> Result<NativeValue<H::Object>, H::Error>
    where
        H: HostRuntime<PinnedClass = T>,
    {
        let kind = match host.component_type(carrier)? {
            Some(component) => self.registry.classify(host, &component)?,
            None => None,
        };
        match kind {
            Some(kind) => host.read_primitive(carrier, kind),
            None => Ok(NativeValue::Reference(host.array_element(carrier, 0)?)),
        }
    }
}
