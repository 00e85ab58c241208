//! Boxed-argument invocation by declared return type

mod harness;

use harness::*;
use nonvirt_core::{
    invoke, invoke_boxed, pack_carriers, BridgeError, HostRuntime, NativeValue, PrimitiveKind,
    ReturnKind, ReturnValue,
};
use pretty_assertions::assert_eq;

#[test]
fn test_pack_carriers_types_slots_after_parameters() {
    let mut vm = MiniVm::new();
    let class = vm.define_class("C", None);
    let int = vm.class_of_kind(PrimitiveKind::Int);
    let object = vm.object_class;
    let m = vm.define_method(class, "m", vec![int, object, object], ReturnKind::Void, returns(ReturnValue::Void));

    let boxed = vm.boxed(NativeValue::Int(9));
    let payload = vm.new_instance(object);
    let args = pack_carriers(&mut vm, &m, &[Some(boxed), Some(payload), None]).expect("pack");

    assert_eq!(vm.array_length(&args).expect("len"), 3);
    let first = vm.array_element(&args, 0).expect("slot").expect("carrier");
    assert_eq!(vm.component_type(&first).expect("component"), Some(int));
    assert_eq!(vm.read_primitive(&first, PrimitiveKind::Int).expect("read"), NativeValue::Int(9));

    let second = vm.array_element(&args, 1).expect("slot").expect("carrier");
    assert_eq!(vm.array_element(&second, 0).expect("element"), Some(payload));

    assert_eq!(vm.array_element(&args, 2).expect("slot"), None);
}

#[test]
fn test_pack_carriers_rejects_wrong_arity() {
    let mut vm = MiniVm::new();
    let class = vm.define_class("C", None);
    let object = vm.object_class;
    let m = vm.define_method(class, "m", vec![object], ReturnKind::Void, returns(ReturnValue::Void));

    let err = pack_carriers(&mut vm, &m, &[]).unwrap_err();
    assert_eq!(
        err,
        MockError::Bridge(BridgeError::ArityMismatch {
            expected: 1,
            actual: 0
        })
    );
}

#[test]
fn test_invoke_selects_primitive_from_return_type() {
    let mut vm = MiniVm::new();
    let registry = vm.registry();
    let class = vm.define_class("C", None);
    let receiver = vm.new_instance(class);
    let int = vm.class_of_kind(PrimitiveKind::Int);

    let twice = vm.define_method(class, "twice", vec![int], ReturnKind::Primitive(PrimitiveKind::Int), |_, _, args| {
        match args[0] {
            NativeValue::Int(v) => Ok(ReturnValue::Int(v * 2)),
            _ => Err(MockError::Thrown("bad argument".into())),
        }
    });
    let carrier = vm.carrier(NativeValue::Int(21));
    let args = vm.args(vec![Some(carrier)]);
    let result = invoke(&mut vm, &registry, &twice, &receiver, Some(&args)).expect("invoke");
    assert_eq!(result, ReturnValue::Int(42));

    let nothing = vm.define_method(class, "nothing", vec![], ReturnKind::Void, returns(ReturnValue::Void));
    let result = invoke(&mut vm, &registry, &nothing, &receiver, None).expect("invoke");
    assert_eq!(result, ReturnValue::Void);
}

#[test]
fn test_invoke_char_return_is_a_char() {
    let mut vm = MiniVm::new();
    let registry = vm.registry();
    let class = vm.define_class("C", None);
    let receiver = vm.new_instance(class);
    let letter = vm.define_method(class, "letter", vec![], ReturnKind::Primitive(PrimitiveKind::Char), returns(ReturnValue::Char(u16::from(b'q'))));

    let result = invoke(&mut vm, &registry, &letter, &receiver, None).expect("invoke");
    assert_eq!(result, ReturnValue::Char(u16::from(b'q')));
}

#[test]
fn test_invoke_boxed_is_non_virtual() {
    let mut vm = MiniVm::new();
    let registry = vm.registry();
    let a = vm.define_class("A", None);
    let b = vm.define_class("B", Some(a));
    let object = vm.object_class;
    let a_describe = vm.define_method(a, "describe", vec![object], ReturnKind::Object, echo_first());
    vm.define_method(b, "describe", vec![object], ReturnKind::Object, returns(ReturnValue::Object(None)));
    let receiver = vm.new_instance(b);
    let payload = vm.new_instance(object);

    let result = invoke_boxed(&mut vm, &registry, &a_describe, &receiver, &[Some(payload)]).expect("invoke");
    assert_eq!(result, ReturnValue::Object(Some(payload)));
}
