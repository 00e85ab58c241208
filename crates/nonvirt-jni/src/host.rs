//! `HostRuntime` over a live `JNIEnv`
//!
//! Every handle is a local reference of the current native frame. Pinned
//! primitive types are global references so the registry can outlive the
//! frame that resolved them.

use jni::objects::{
    GlobalRef, JBooleanArray, JByteArray, JCharArray, JClass, JDoubleArray, JFloatArray,
    JIntArray, JLongArray, JMethodID, JObject, JObjectArray, JShortArray, JValue,
};
use jni::sys::{jint, jsize, jvalue};
use jni::JNIEnv;
use nonvirt_core::{
    BridgeError, HostRuntime, NativeValue, PrimitiveKind, ReflectiveHost, ReturnKind, ReturnValue,
};

use crate::boxing::wrapper_class;
use crate::error::{JniBridgeError, JniResult};
use crate::options::BridgeOptions;

const CLASS_SIG: &str = "()Ljava/lang/Class;";

/// The managed runtime reached through one `JNIEnv`
pub struct JniHost<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    options: BridgeOptions,
}

impl<'a, 'local> JniHost<'a, 'local> {
    /// Wrap the environment of the current native call
    pub fn new(env: &'a mut JNIEnv<'local>, options: BridgeOptions) -> Self {
        Self { env, options }
    }

    /// Underlying environment
    pub fn env(&mut self) -> &mut JNIEnv<'local> {
        &mut *self.env
    }

    /// Reserve local reference capacity for an argument vector of carriers
    pub fn reserve_for(&mut self, args: Option<&JObject<'local>>) -> JniResult<()> {
        self.reserve(args, BridgeOptions::local_capacity)
    }

    /// Reserve local reference capacity for an array of boxed arguments
    pub fn reserve_for_boxed(&mut self, args: Option<&JObject<'local>>) -> JniResult<()> {
        self.reserve(args, BridgeOptions::boxed_local_capacity)
    }

    fn reserve(&mut self, args: Option<&JObject<'local>>, capacity: fn(&BridgeOptions, usize) -> jint) -> JniResult<()> {
        if !self.options.reserve_local_refs {
            return Ok(());
        }
        let count = match args {
            Some(args) => self.array_length(args)?,
            None => 0,
        };
        self.env.ensure_local_capacity(capacity(&self.options, count))?;
        Ok(())
    }

    fn class_of_method(&mut self, method: &JObject<'local>, name: &str) -> JniResult<JClass<'local>> {
        let class = self.env.call_method(method, name, CLASS_SIG, &[])?.l()?;
        Ok(JClass::from(class))
    }

    fn class_name(&mut self, class: &JClass<'local>) -> JniResult<String> {
        let name = self.env.call_method(class, "getName", "()Ljava/lang/String;", &[])?.l()?;
        let name: String = self.env.get_string((&name).into())?.into();
        Ok(name)
    }

    fn is_primitive(&mut self, class: &JClass<'local>) -> JniResult<bool> {
        Ok(self.env.call_method(class, "isPrimitive", "()Z", &[])?.z()?)
    }
}

fn non_null(obj: JObject<'_>) -> Option<JObject<'_>> {
    if obj.is_null() {
        None
    } else {
        Some(obj)
    }
}

fn lower(value: &NativeValue<JObject<'_>>) -> jvalue {
    match value {
        NativeValue::Boolean(v) => JValue::Bool(u8::from(*v)).as_jni(),
        NativeValue::Byte(v) => JValue::Byte(*v).as_jni(),
        NativeValue::Char(v) => JValue::Char(*v).as_jni(),
        NativeValue::Short(v) => JValue::Short(*v).as_jni(),
        NativeValue::Int(v) => JValue::Int(*v).as_jni(),
        NativeValue::Long(v) => JValue::Long(*v).as_jni(),
        NativeValue::Float(v) => JValue::Float(*v).as_jni(),
        NativeValue::Double(v) => JValue::Double(*v).as_jni(),
        NativeValue::Reference(Some(obj)) => JValue::Object(obj).as_jni(),
        NativeValue::Reference(None) => jvalue {
            l: std::ptr::null_mut(),
        },
    }
}

/// Invoke one `CallNonvirtual<Type>MethodA` entry of the JNI function table
macro_rules! call_nonvirtual_raw {
    ($env:expr, $entry:ident, $receiver:expr, $class:expr, $method:expr, $args:expr) => {{
        let raw = $env.get_raw();
        // SAFETY: `raw` is the live environment of this thread, receiver and
        // class are valid local references, and `$args` holds one `jvalue`
        // per declared parameter for the duration of the call.
        unsafe {
            let call = (**raw)
                .$entry
                .ok_or(jni::errors::Error::JNIEnvMethodNotFound(stringify!($entry)))?;
            call(raw, $receiver.as_raw(), $class.as_raw(), $method.into_raw(), $args.as_ptr())
        }
    }};
}

/// Read element 0 of a primitive array through the matching region call
macro_rules! read_first {
    ($env:expr, $array:expr, $ty:ty, $get:ident, $default:expr) => {{
        let array: &$ty = $array.into();
        let mut buf = [$default; 1];
        $env.$get(array, 0, &mut buf)?;
        buf[0]
    }};
}

impl<'a, 'local> HostRuntime for JniHost<'a, 'local> {
    type Object = JObject<'local>;
    type Class = JClass<'local>;
    type PinnedClass = GlobalRef;
    type MethodId = JMethodID;
    type Error = JniBridgeError;

    fn resolve_entry_point(&mut self, method: &JObject<'local>) -> JniResult<JMethodID> {
        let raw = self.env.get_raw();
        // SAFETY: `raw` is the live environment of this thread and `method` is
        // a valid local reference.
        let id = unsafe {
            let from_reflected = (**raw)
                .FromReflectedMethod
                .ok_or(jni::errors::Error::JNIEnvMethodNotFound("FromReflectedMethod"))?;
            from_reflected(raw, method.as_raw())
        };
        if id.is_null() {
            if self.env.exception_check()? {
                return Err(jni::errors::Error::JavaException.into());
            }
            return Err(jni::errors::Error::NullPtr("FromReflectedMethod").into());
        }
        // SAFETY: non-null id returned by the VM.
        Ok(unsafe { JMethodID::from_raw(id) })
    }

    fn resolve_declaring_type(&mut self, method: &JObject<'local>) -> JniResult<JClass<'local>> {
        self.class_of_method(method, "getDeclaringClass")
    }

    fn primitive_type(&mut self, kind: PrimitiveKind) -> JniResult<GlobalRef> {
        let class = self
            .env
            .get_static_field(wrapper_class(kind), "TYPE", "Ljava/lang/Class;")
            .and_then(|value| value.l())
            .map_err(|e| {
                log::error!("{}.TYPE lookup failed: {}", wrapper_class(kind), e);
                JniBridgeError::from(BridgeError::UnresolvedPrimitive { kind })
            })?;
        if class.is_null() {
            return Err(BridgeError::UnresolvedPrimitive { kind }.into());
        }
        Ok(self.env.new_global_ref(&class)?)
    }

    fn array_length(&mut self, array: &JObject<'local>) -> JniResult<usize> {
        let array: &JObjectArray<'local> = array.into();
        let len = self.env.get_array_length(array)?;
        Ok(usize::try_from(len).unwrap_or(0))
    }

    fn array_element(&mut self, array: &JObject<'local>, index: usize) -> JniResult<Option<JObject<'local>>> {
        let array: &JObjectArray<'local> = array.into();
        let index = jsize::try_from(index).map_err(|_| JniBridgeError::TooManyArguments(index))?;
        Ok(non_null(self.env.get_object_array_element(array, index)?))
    }

    fn component_type(&mut self, array: &JObject<'local>) -> JniResult<Option<JClass<'local>>> {
        let class = self.env.get_object_class(array)?;
        let component = self.env.call_method(&class, "getComponentType", CLASS_SIG, &[])?.l()?;
        Ok(non_null(component).map(JClass::from))
    }

    fn is_same_type(&mut self, class: &JClass<'local>, pinned: &GlobalRef) -> JniResult<bool> {
        Ok(self.env.is_same_object(class, pinned)?)
    }

    fn read_primitive(&mut self, array: &JObject<'local>, kind: PrimitiveKind) -> JniResult<NativeValue<JObject<'local>>> {
        let env = &mut *self.env;
        Ok(match kind {
            PrimitiveKind::Boolean => {
                NativeValue::Boolean(read_first!(env, array, JBooleanArray<'local>, get_boolean_array_region, 0) != 0)
            }
            PrimitiveKind::Byte => NativeValue::Byte(read_first!(env, array, JByteArray<'local>, get_byte_array_region, 0)),
            PrimitiveKind::Char => NativeValue::Char(read_first!(env, array, JCharArray<'local>, get_char_array_region, 0)),
            PrimitiveKind::Short => NativeValue::Short(read_first!(env, array, JShortArray<'local>, get_short_array_region, 0)),
            PrimitiveKind::Int => NativeValue::Int(read_first!(env, array, JIntArray<'local>, get_int_array_region, 0)),
            PrimitiveKind::Long => NativeValue::Long(read_first!(env, array, JLongArray<'local>, get_long_array_region, 0)),
            PrimitiveKind::Float => NativeValue::Float(read_first!(env, array, JFloatArray<'local>, get_float_array_region, 0.0)),
            PrimitiveKind::Double => NativeValue::Double(read_first!(env, array, JDoubleArray<'local>, get_double_array_region, 0.0)),
        })
    }

    fn call_nonvirtual(
        &mut self,
        receiver: &JObject<'local>,
        class: &JClass<'local>,
        method: JMethodID,
        kind: ReturnKind,
        args: &[NativeValue<JObject<'local>>],
    ) -> JniResult<ReturnValue<JObject<'local>>> {
        let jargs: Vec<jvalue> = args.iter().map(lower).collect();
        let env = &mut *self.env;
        macro_rules! call {
            ($entry:ident) => {
                call_nonvirtual_raw!(env, $entry, receiver, class, method, jargs)
            };
        }

        let value = match kind {
            ReturnKind::Primitive(PrimitiveKind::Boolean) => {
                ReturnValue::Boolean(call!(CallNonvirtualBooleanMethodA) != 0)
            }
            ReturnKind::Primitive(PrimitiveKind::Byte) => ReturnValue::Byte(call!(CallNonvirtualByteMethodA)),
            ReturnKind::Primitive(PrimitiveKind::Char) => ReturnValue::Char(call!(CallNonvirtualCharMethodA)),
            ReturnKind::Primitive(PrimitiveKind::Short) => ReturnValue::Short(call!(CallNonvirtualShortMethodA)),
            ReturnKind::Primitive(PrimitiveKind::Int) => ReturnValue::Int(call!(CallNonvirtualIntMethodA)),
            ReturnKind::Primitive(PrimitiveKind::Long) => ReturnValue::Long(call!(CallNonvirtualLongMethodA)),
            ReturnKind::Primitive(PrimitiveKind::Float) => ReturnValue::Float(call!(CallNonvirtualFloatMethodA)),
            ReturnKind::Primitive(PrimitiveKind::Double) => ReturnValue::Double(call!(CallNonvirtualDoubleMethodA)),
            ReturnKind::Object => {
                let obj = call!(CallNonvirtualObjectMethodA);
                // SAFETY: a local reference (or null) returned by the VM.
                ReturnValue::Object(non_null(unsafe { JObject::from_raw(obj) }))
            }
            ReturnKind::Void => {
                call!(CallNonvirtualVoidMethodA);
                ReturnValue::Void
            }
        };

        if env.exception_check()? {
            return Err(jni::errors::Error::JavaException.into());
        }
        Ok(value)
    }
}

impl<'a, 'local> ReflectiveHost for JniHost<'a, 'local> {
    fn return_kind(&mut self, method: &JObject<'local>) -> JniResult<ReturnKind> {
        let class = self.class_of_method(method, "getReturnType")?;
        if !self.is_primitive(&class)? {
            return Ok(ReturnKind::Object);
        }
        let name = self.class_name(&class)?;
        if name == "void" {
            return Ok(ReturnKind::Void);
        }
        match PrimitiveKind::from_name(&name) {
            Some(kind) => Ok(ReturnKind::Primitive(kind)),
            None => Err(BridgeError::UnknownReturnType(name).into()),
        }
    }

    fn parameter_types(&mut self, method: &JObject<'local>) -> JniResult<Vec<JClass<'local>>> {
        let types = self
            .env
            .call_method(method, "getParameterTypes", "()[Ljava/lang/Class;", &[])?
            .l()?;
        let len = self.array_length(&types)?;
        let mut classes = Vec::with_capacity(len);
        for index in 0..len {
            match self.array_element(&types, index)? {
                Some(class) => classes.push(JClass::from(class)),
                None => return Err(jni::errors::Error::NullPtr("parameter type").into()),
            }
        }
        Ok(classes)
    }

    fn new_carrier(&mut self, parameter: &JClass<'local>, value: &JObject<'local>) -> JniResult<JObject<'local>> {
        if !self.is_primitive(parameter)? {
            let carrier = self.env.new_object_array(1, "java/lang/Object", value)?;
            return Ok(JObject::from(carrier));
        }
        // Array.set unboxes into the primitive array
        let carrier = self
            .env
            .call_static_method(
                "java/lang/reflect/Array",
                "newInstance",
                "(Ljava/lang/Class;I)Ljava/lang/Object;",
                &[JValue::Object(parameter), JValue::Int(1)],
            )?
            .l()?;
        self.env.call_static_method(
            "java/lang/reflect/Array",
            "set",
            "(Ljava/lang/Object;ILjava/lang/Object;)V",
            &[JValue::Object(&carrier), JValue::Int(0), JValue::Object(value)],
        )?;
        Ok(carrier)
    }

    fn new_argument_vector(&mut self, slots: Vec<Option<JObject<'local>>>) -> JniResult<JObject<'local>> {
        let len = jsize::try_from(slots.len()).map_err(|_| JniBridgeError::TooManyArguments(slots.len()))?;
        let vector = self.env.new_object_array(len, "java/lang/Object", JObject::null())?;
        for (index, slot) in (0..len).zip(slots) {
            if let Some(carrier) = slot {
                self.env.set_object_array_element(&vector, index, carrier)?;
            }
        }
        Ok(JObject::from(vector))
    }
}
