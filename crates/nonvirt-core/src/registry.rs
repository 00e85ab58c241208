//! Primitive-type registry
//!
//! Holds the descriptor of each primitive kind itself (`int.class`, not
//! `Integer.class`) so the frame builder can tell carrier arrays apart by
//! component-type identity alone. Resolved once at load time and read-only
//! afterwards; [`RegistryCell`] is the init-once slot a binding keeps it in.

use std::sync::OnceLock;

use crate::error::{BridgeError, BridgeResult};
use crate::host::HostRuntime;
use crate::kind::PrimitiveKind;

/// Descriptor for each of the eight primitive kinds, indexed by kind.
#[derive(Debug, Clone)]
pub struct PrimitiveRegistry<T> {
    entries: [T; 8],
}

impl<T> PrimitiveRegistry<T> {
    /// Build from descriptors in [`PrimitiveKind::ALL`] order
    pub fn from_entries(entries: [T; 8]) -> Self {
        Self { entries }
    }

    /// Resolve every primitive descriptor through the host.
    ///
    /// Any failed resolution aborts initialization.
    pub fn initialize<H>(host: &mut H) -> Result<Self, H::Error>
    where
        H: HostRuntime<PinnedClass = T>,
    {
        let mut resolve = |kind: PrimitiveKind| {
            host.primitive_type(kind).map_err(|e| {
                log::error!("primitive type `{}` could not be resolved", kind);
                e
            })
        };
        // Slot order is PrimitiveKind::ALL
        let entries = [
            resolve(PrimitiveKind::Boolean)?,
            resolve(PrimitiveKind::Byte)?,
            resolve(PrimitiveKind::Char)?,
            resolve(PrimitiveKind::Short)?,
            resolve(PrimitiveKind::Int)?,
            resolve(PrimitiveKind::Long)?,
            resolve(PrimitiveKind::Float)?,
            resolve(PrimitiveKind::Double)?,
        ];
        log::debug!("primitive-type registry initialized");
        Ok(Self { entries })
    }

    /// Descriptor for `kind`
    #[inline]
    pub fn lookup(&self, kind: PrimitiveKind) -> &T {
        &self.entries[kind.index()]
    }

    /// Iterate `(kind, descriptor)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveKind, &T)> {
        PrimitiveKind::ALL.into_iter().zip(self.entries.iter())
    }

    /// Find the kind whose descriptor is identical to `class`.
    ///
    /// The eight descriptors are distinct, so comparison order does not matter.
    pub fn classify<H>(&self, host: &mut H, class: &H::Class) -> Result<Option<PrimitiveKind>, H::Error>
    where
        H: HostRuntime<PinnedClass = T>,
    {
        for (kind, pinned) in self.iter() {
            if host.is_same_type(class, pinned)? {
                return Ok(Some(kind));
            }
        }
        Ok(None)
    }

    /// Project every descriptor, e.g. a global handle to its raw form
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> PrimitiveRegistry<U> {
        PrimitiveRegistry {
            entries: self.entries.each_ref().map(f),
        }
    }
}

/// Init-once, process-wide slot for a [`PrimitiveRegistry`].
pub struct RegistryCell<T> {
    cell: OnceLock<PrimitiveRegistry<T>>,
}

impl<T> RegistryCell<T> {
    /// An empty slot, usable in a `static`
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Publish the registry. Only the first install succeeds.
    pub fn install(&self, registry: PrimitiveRegistry<T>) -> BridgeResult<&PrimitiveRegistry<T>> {
        self.cell
            .set(registry)
            .map_err(|_| BridgeError::AlreadyInitialized)?;
        self.get()
    }

    /// The installed registry
    pub fn get(&self) -> BridgeResult<&PrimitiveRegistry<T>> {
        self.cell.get().ok_or(BridgeError::NotInitialized)
    }

    /// Check if a registry has been installed
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for RegistryCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
