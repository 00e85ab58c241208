//! Load-time configuration
//!
//! Options are read once, in `JNI_OnLoad`, from Java system properties:
//!
//! ```text
//! -Dnonvirt.jniVersion=1.8          JNI version reported to the VM (1.2, 1.4, 1.6, 1.8)
//! -Dnonvirt.reserveLocalRefs=false  skip EnsureLocalCapacity before marshaling
//! ```

use jni::sys::{jint, JNI_VERSION_1_2, JNI_VERSION_1_4, JNI_VERSION_1_6, JNI_VERSION_1_8};

/// System property selecting the JNI version
pub const JNI_VERSION_PROPERTY: &str = "nonvirt.jniVersion";

/// System property toggling local reference reservation
pub const RESERVE_LOCAL_REFS_PROPERTY: &str = "nonvirt.reserveLocalRefs";

/// Options fixed when the library is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
    /// JNI version requested from the VM and reported by `JNI_OnLoad`
    pub jni_version: jint,

    /// Ask the VM for local reference capacity before marshaling arguments
    pub reserve_local_refs: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            jni_version: JNI_VERSION_1_6,
            reserve_local_refs: true,
        }
    }
}

fn parse_jni_version(value: &str) -> Option<jint> {
    match value.trim() {
        "1.2" => Some(JNI_VERSION_1_2),
        "1.4" => Some(JNI_VERSION_1_4),
        "1.6" => Some(JNI_VERSION_1_6),
        "1.8" => Some(JNI_VERSION_1_8),
        _ => None,
    }
}

impl BridgeOptions {
    /// Build options from property lookups; missing or malformed values keep
    /// their defaults.
    pub fn from_properties(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(value) = lookup(JNI_VERSION_PROPERTY) {
            match parse_jni_version(&value) {
                Some(version) => options.jni_version = version,
                None => log::warn!("ignoring {}={:?}", JNI_VERSION_PROPERTY, value),
            }
        }

        if let Some(value) = lookup(RESERVE_LOCAL_REFS_PROPERTY) {
            match value.trim().parse::<bool>() {
                Ok(reserve) => options.reserve_local_refs = reserve,
                Err(_) => log::warn!("ignoring {}={:?}", RESERVE_LOCAL_REFS_PROPERTY, value),
            }
        }

        options
    }

    /// Local references one call may create for `arg_count` carrier slots.
    ///
    /// Each slot costs the carrier, its component type and an unwrapped
    /// reference; the rest covers the method's declaring type and result.
    pub fn local_capacity(&self, arg_count: usize) -> jint {
        capacity(arg_count, 3)
    }

    /// Like [`local_capacity`](Self::local_capacity), for boxed arguments.
    ///
    /// Packing adds the parameter type, the boxed value and a new carrier per
    /// slot, plus the parameter array and the packed vector.
    pub fn boxed_local_capacity(&self, arg_count: usize) -> jint {
        capacity(arg_count, 6).saturating_add(2)
    }
}

fn capacity(arg_count: usize, per_slot: usize) -> jint {
    let needed = arg_count.saturating_mul(per_slot).saturating_add(8);
    jint::try_from(needed).unwrap_or(jint::MAX)
}
