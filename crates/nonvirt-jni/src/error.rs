//! Error types for the JNI binding

use jni::JNIEnv;
use nonvirt_core::BridgeError;
use thiserror::Error;

/// Failure of one bridge call as seen from the JNI side
#[derive(Debug, Error)]
pub enum JniBridgeError {
    /// The JNI layer failed, possibly because Java code threw
    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),

    /// The bridge rejected the call
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// An argument vector too long to index with `jsize`
    #[error("{0} arguments exceed the JNI array limit")]
    TooManyArguments(usize),
}

/// Result type for the JNI binding
pub type JniResult<T> = std::result::Result<T, JniBridgeError>;

impl JniBridgeError {
    /// A Java exception is already pending for this failure
    pub fn is_pending_exception(&self) -> bool {
        matches!(self, JniBridgeError::Jni(jni::errors::Error::JavaException))
    }

    /// Java exception class used to surface this failure
    pub fn exception_class(&self) -> &'static str {
        match self {
            JniBridgeError::Bridge(BridgeError::ArityMismatch { .. }) | JniBridgeError::TooManyArguments(_) => {
                "java/lang/IllegalArgumentException"
            }
            _ => "java/lang/IllegalStateException",
        }
    }

    /// Make the failure visible to the calling Java code.
    ///
    /// A pending exception is left untouched; otherwise one is thrown.
    pub fn report(&self, env: &mut JNIEnv<'_>) {
        if self.is_pending_exception() || env.exception_check().unwrap_or(false) {
            log::debug!("leaving pending Java exception in place: {}", self);
            return;
        }
        log::warn!("bridge call failed: {}", self);
        if let Err(e) = env.throw_new(self.exception_class(), self.to_string()) {
            log::error!("could not throw {}: {}", self.exception_class(), e);
        }
    }
}
