//! Wrapper classes and primitive result boxing

use jni::objects::{JObject, JValue};
use jni::JNIEnv;
use nonvirt_core::{PrimitiveKind, ReturnValue};

use crate::error::JniResult;

/// Internal name of the wrapper class of `kind`
pub fn wrapper_class(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "java/lang/Boolean",
        PrimitiveKind::Byte => "java/lang/Byte",
        PrimitiveKind::Char => "java/lang/Character",
        PrimitiveKind::Short => "java/lang/Short",
        PrimitiveKind::Int => "java/lang/Integer",
        PrimitiveKind::Long => "java/lang/Long",
        PrimitiveKind::Float => "java/lang/Float",
        PrimitiveKind::Double => "java/lang/Double",
    }
}

/// JVM type descriptor of `kind`
pub fn descriptor(kind: PrimitiveKind) -> char {
    match kind {
        PrimitiveKind::Boolean => 'Z',
        PrimitiveKind::Byte => 'B',
        PrimitiveKind::Char => 'C',
        PrimitiveKind::Short => 'S',
        PrimitiveKind::Int => 'I',
        PrimitiveKind::Long => 'J',
        PrimitiveKind::Float => 'F',
        PrimitiveKind::Double => 'D',
    }
}

/// Signature of the wrapper's static `valueOf` for `kind`
pub fn value_of_signature(kind: PrimitiveKind) -> String {
    format!("({})L{};", descriptor(kind), wrapper_class(kind))
}

/// Box a dispatch result for the `Object`-returning entry point.
///
/// Primitives go through `valueOf`; void becomes null.
pub fn box_return<'local>(env: &mut JNIEnv<'local>, value: ReturnValue<JObject<'local>>) -> JniResult<JObject<'local>> {
    let (kind, arg) = match value {
        ReturnValue::Object(obj) => return Ok(obj.unwrap_or_else(|| JObject::null())),
        ReturnValue::Void => return Ok(JObject::null()),
        ReturnValue::Boolean(v) => (PrimitiveKind::Boolean, JValue::Bool(u8::from(v))),
        ReturnValue::Byte(v) => (PrimitiveKind::Byte, JValue::Byte(v)),
        ReturnValue::Char(v) => (PrimitiveKind::Char, JValue::Char(v)),
        ReturnValue::Short(v) => (PrimitiveKind::Short, JValue::Short(v)),
        ReturnValue::Int(v) => (PrimitiveKind::Int, JValue::Int(v)),
        ReturnValue::Long(v) => (PrimitiveKind::Long, JValue::Long(v)),
        ReturnValue::Float(v) => (PrimitiveKind::Float, JValue::Float(v)),
        ReturnValue::Double(v) => (PrimitiveKind::Double, JValue::Double(v)),
    };
    let boxed = env
        .call_static_method(wrapper_class(kind), "valueOf", value_of_signature(kind), &[arg])?
        .l()?;
    Ok(boxed)
}
