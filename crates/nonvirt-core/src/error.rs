//! Error types for the bridge
//!
//! The bridge never wraps a failure raised *by the invoked method*; that stays
//! in the host's own error channel. `BridgeError` only covers what the bridge
//! itself can detect: initialization, lifecycle and shape problems.

use crate::kind::{PrimitiveKind, ReturnKind};

/// Result type for bridge-level operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Bridge error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// A primitive type descriptor could not be resolved during initialization
    #[error("Failed to resolve primitive type `{kind}`")]
    UnresolvedPrimitive {
        /// The kind whose descriptor is missing
        kind: PrimitiveKind,
    },

    /// The primitive-type registry was installed twice
    #[error("Primitive-type registry is already initialized")]
    AlreadyInitialized,

    /// A dispatch was attempted before the registry was installed
    #[error("Primitive-type registry is not initialized")]
    NotInitialized,

    /// The host primitive returned a different kind than was requested
    #[error("Return kind mismatch: expected {expected}, got {actual}")]
    ReturnMismatch {
        /// Kind requested by the entry point
        expected: ReturnKind,
        /// Kind the host handed back
        actual: ReturnKind,
    },

    /// Argument count does not match the method's parameter count
    #[error("Argument count mismatch: method takes {expected}, got {actual}")]
    ArityMismatch {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// The method's return type is not a recognized kind
    #[error("Unrecognized return type: {0}")]
    UnknownReturnType(String),
}
