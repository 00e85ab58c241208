//! Boxed-argument façade
//!
//! Callers that hold plain boxed arguments (`Integer`, `String`, ...) rather
//! than carrier arrays go through here: [`pack_carriers`] wraps each argument
//! in a one-element carrier typed after the declared parameter, and [`invoke`]
//! picks the dispatch primitive from the method's declared return type.

use crate::dispatch::dispatch_with_kind;
use crate::error::BridgeError;
use crate::host::ReflectiveHost;
use crate::registry::PrimitiveRegistry;
use crate::value::ReturnValue;

/// Wrap boxed arguments into a host argument vector of carrier slots.
///
/// `None` arguments stay null markers. The argument count must equal the
/// method's parameter count.
pub fn pack_carriers<H: ReflectiveHost>(
    host: &mut H,
    method: &H::Object,
    values: &[Option<H::Object>],
) -> Result<H::Object, H::Error> {
    let parameters = host.parameter_types(method)?;
    if parameters.len() != values.len() {
        return Err(BridgeError::ArityMismatch {
            expected: parameters.len(),
            actual: values.len(),
        }
        .into());
    }

    let mut slots = Vec::with_capacity(values.len());
    for (parameter, value) in parameters.iter().zip(values) {
        let slot = match value {
            Some(value) => Some(host.new_carrier(parameter, value)?),
            None => None,
        };
        slots.push(slot);
    }
    host.new_argument_vector(slots)
}

/// Invoke `method` non-virtually with the primitive its return type selects.
///
/// `args` is an argument vector of carrier slots, e.g. from [`pack_carriers`].
pub fn invoke<H: ReflectiveHost>(
    host: &mut H,
    registry: &PrimitiveRegistry<H::PinnedClass>,
    method: &H::Object,
    receiver: &H::Object,
    args: Option<&H::Object>,
) -> Result<ReturnValue<H::Object>, H::Error> {
    let kind = host.return_kind(method)?;
    let result = dispatch_with_kind(host, registry, method, receiver, args, kind)?;
    if result.kind() != kind {
        return Err(BridgeError::ReturnMismatch {
            expected: kind,
            actual: result.kind(),
        }
        .into());
    }
    Ok(result)
}

/// [`pack_carriers`] followed by [`invoke`].
pub fn invoke_boxed<H: ReflectiveHost>(
    host: &mut H,
    registry: &PrimitiveRegistry<H::PinnedClass>,
    method: &H::Object,
    receiver: &H::Object,
    values: &[Option<H::Object>],
) -> Result<ReturnValue<H::Object>, H::Error> {
    let args = pack_carriers(host, method, values)?;
    invoke(host, registry, method, receiver, Some(&args))
}
