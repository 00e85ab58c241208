//! JNI bindings for non-virtual reflective invocation
//!
//! Exports the native half of `com.example.nativelib.UnsafeReflection`:
//!
//! - `callNonvirtual{Boolean,Byte,Char,Short,Int,Long,Float,Double,Object,Void}MethodA(Method, Object, Object[])`
//!   call the method bound to its declaring class, skipping overrides. Each
//!   argument arrives in a one-element carrier array whose component type
//!   says how to pass it.
//! - `callNonvirtualMethod(Method, Object, Object[])` takes plain boxed
//!   arguments, picks the entry point from the declared return type and
//!   boxes a primitive result.
//!
//! The primitive-type registry is built once in `JNI_OnLoad`. A failed call
//! returns the zero value of its kind with a Java exception pending.

use std::any::Any;
use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JValue};
use jni::sys::{jboolean, jbyte, jchar, jdouble, jfloat, jint, jlong, jobject, jshort, JNI_ERR};
use jni::{JNIEnv, JavaVM};
use nonvirt_core::{
    dispatch_boolean, dispatch_byte, dispatch_char, dispatch_double, dispatch_float, dispatch_int,
    dispatch_long, dispatch_object, dispatch_short, dispatch_void, invoke_boxed, BridgeError,
    HostRuntime, PrimitiveRegistry, RegistryCell,
};

pub mod boxing;
pub mod error;
pub mod host;
pub mod options;

pub use error::{JniBridgeError, JniResult};
pub use host::JniHost;
pub use options::BridgeOptions;

static REGISTRY: RegistryCell<GlobalRef> = RegistryCell::new();
static OPTIONS: OnceLock<BridgeOptions> = OnceLock::new();

// ============================================================================
// Library Lifecycle
// ============================================================================

/// Read one Java system property; absent or unreadable properties are `None`
fn system_property(env: &mut JNIEnv<'_>, key: &str) -> Option<String> {
    let key = env.new_string(key).ok()?;
    let value = env
        .call_static_method(
            "java/lang/System",
            "getProperty",
            "(Ljava/lang/String;)Ljava/lang/String;",
            &[JValue::Object(&key)],
        )
        .and_then(|value| value.l());
    let value = match value {
        Ok(value) if !value.is_null() => value,
        Ok(_) => return None,
        Err(_) => {
            let _ = env.exception_clear();
            return None;
        }
    };
    env.get_string((&value).into()).ok().map(Into::into)
}

fn load(vm: &JavaVM) -> JniResult<BridgeOptions> {
    let mut env = vm.get_env()?;
    let options = *OPTIONS.get_or_init(|| BridgeOptions::from_properties(|key| system_property(&mut env, key)));
    log::debug!("bridge options: {:?}", options);

    let mut host = JniHost::new(&mut env, options);
    let registry = match PrimitiveRegistry::initialize(&mut host) {
        Ok(registry) => registry,
        Err(e) => {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }
            return Err(e);
        }
    };
    REGISTRY.install(registry)?;
    Ok(options)
}

/// Resolve the eight primitive types and pin them for the process lifetime.
///
/// Options come from the `nonvirt.*` system properties, see [`options`].
///
/// # Safety
/// Called by the VM with a valid `JavaVM` pointer when the library is loaded.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn JNI_OnLoad(vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    let vm = match JavaVM::from_raw(vm) {
        Ok(vm) => vm,
        Err(e) => {
            log::error!("JNI_OnLoad received an invalid VM: {}", e);
            return JNI_ERR;
        }
    };

    match catch_unwind(AssertUnwindSafe(|| load(&vm))) {
        Ok(Ok(options)) => {
            log::debug!("unsafe_reflection loaded (JNI version {:#x})", options.jni_version);
            options.jni_version
        }
        Ok(Err(JniBridgeError::Bridge(BridgeError::AlreadyInitialized))) => {
            log::warn!("unsafe_reflection loaded again; keeping the existing registry");
            OPTIONS.get().copied().unwrap_or_default().jni_version
        }
        Ok(Err(e)) => {
            log::error!("unsafe_reflection failed to load: {}", e);
            JNI_ERR
        }
        Err(_) => {
            log::error!("unsafe_reflection panicked while loading");
            JNI_ERR
        }
    }
}

// ============================================================================
// Call Boundary
// ============================================================================

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Run one bridge call, turning every failure into a pending Java exception
/// and the `zero` return value.
fn bridge_call<'local, T>(
    env: &mut JNIEnv<'local>,
    entry: &'static str,
    zero: T,
    call: impl FnOnce(&mut JniHost<'_, 'local>, &PrimitiveRegistry<GlobalRef>) -> JniResult<T>,
) -> T {
    let options = OPTIONS.get().copied().unwrap_or_default();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let registry = REGISTRY.get()?;
        let mut host = JniHost::new(&mut *env, options);
        call(&mut host, registry)
    }));

    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            log::trace!("{} failed: {}", entry, e);
            e.report(env);
            zero
        }
        Err(payload) => {
            let message = format!("panic in {}: {}", entry, panic_message(payload.as_ref()));
            log::error!("{}", message);
            if !env.exception_check().unwrap_or(false) {
                let _ = env.throw_new("java/lang/Error", message);
            }
            zero
        }
    }
}

fn args_of<'a, 'local>(args: &'a JObject<'local>) -> Option<&'a JObject<'local>> {
    if args.is_null() {
        None
    } else {
        Some(args)
    }
}

// ============================================================================
// Typed Entry Points
// ============================================================================

macro_rules! nonvirtual_exports {
    ($($(#[$doc:meta])* $export:ident => $dispatch:ident -> $ret:ty = $zero:expr, |$v:ident| $lower:expr;)*) => {
        $(
            $(#[$doc])*
            #[no_mangle]
            #[allow(non_snake_case)]
            pub extern "system" fn $export<'local>(
                mut env: JNIEnv<'local>,
                _class: JClass<'local>,
                method: JObject<'local>,
                receiver: JObject<'local>,
                args: JObjectArray<'local>,
            ) -> $ret {
                let args = JObject::from(args);
                bridge_call(&mut env, stringify!($export), $zero, |host, registry| {
                    let args = args_of(&args);
                    host.reserve_for(args)?;
                    let $v = $dispatch(host, registry, &method, &receiver, args)?;
                    Ok($lower)
                })
            }
        )*
    };
}

nonvirtual_exports! {
    /// `boolean callNonvirtualBooleanMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualBooleanMethodA
        => dispatch_boolean -> jboolean = 0, |v| jboolean::from(v);
    /// `byte callNonvirtualByteMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualByteMethodA
        => dispatch_byte -> jbyte = 0, |v| v;
    /// `char callNonvirtualCharMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualCharMethodA
        => dispatch_char -> jchar = 0, |v| v;
    /// `short callNonvirtualShortMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualShortMethodA
        => dispatch_short -> jshort = 0, |v| v;
    /// `int callNonvirtualIntMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualIntMethodA
        => dispatch_int -> jint = 0, |v| v;
    /// `long callNonvirtualLongMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualLongMethodA
        => dispatch_long -> jlong = 0, |v| v;
    /// `float callNonvirtualFloatMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualFloatMethodA
        => dispatch_float -> jfloat = 0.0, |v| v;
    /// `double callNonvirtualDoubleMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualDoubleMethodA
        => dispatch_double -> jdouble = 0.0, |v| v;
    /// `Object callNonvirtualObjectMethodA(Method, Object, Object[])`; null on failure
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualObjectMethodA
        => dispatch_object -> jobject = std::ptr::null_mut(), |v| v.map_or(std::ptr::null_mut(), JObject::into_raw);
    /// `void callNonvirtualVoidMethodA(Method, Object, Object[])`
    Java_com_example_nativelib_UnsafeReflection_callNonvirtualVoidMethodA
        => dispatch_void -> () = (), |v| v;
}

// ============================================================================
// Boxed Entry Point
// ============================================================================

/// `Object callNonvirtualMethod(Method, Object, Object[])`
///
/// `args` holds plain boxed arguments (null array means none). The result of
/// a primitive method comes back boxed; void methods return null.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_example_nativelib_UnsafeReflection_callNonvirtualMethod<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    method: JObject<'local>,
    receiver: JObject<'local>,
    args: JObjectArray<'local>,
) -> jobject {
    let args = JObject::from(args);
    bridge_call(
        &mut env,
        "callNonvirtualMethod",
        std::ptr::null_mut(),
        |host, registry| {
            host.reserve_for_boxed(args_of(&args))?;
            let count = match args_of(&args) {
                Some(args) => host.array_length(args)?,
                None => 0,
            };
            let mut values = Vec::with_capacity(count);
            for index in 0..count {
                values.push(host.array_element(&args, index)?);
            }
            let result = invoke_boxed(host, registry, &method, &receiver, &values)?;
            Ok(boxing::box_return(host.env(), result)?.into_raw())
        },
    )
}
