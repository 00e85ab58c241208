//! Test harness: a tiny in-memory managed runtime
//!
//! `MiniVm` models just enough of a class-based runtime to drive the bridge:
//! classes with single inheritance and overridable methods, instances with
//! named fields, typed arrays, boxed primitives and reflective method
//! handles. Its `call_nonvirtual` runs exactly the body named by the method
//! id; `call_virtual` walks the receiver's class chain so tests can contrast
//! the two.

#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;

use nonvirt_core::{
    BridgeError, HostRuntime, NativeValue, PrimitiveKind, PrimitiveRegistry, ReflectiveHost,
    ReturnKind, ReturnValue, TypeTag,
};

pub type ObjRef = usize;
pub type ClassId = usize;

pub type Value = NativeValue<ObjRef>;

/// Method body: `(vm, receiver, args) -> result`
pub type Body = Rc<dyn Fn(&mut MiniVm, ObjRef, &[Value]) -> Result<ReturnValue<ObjRef>, MockError>>;

#[derive(Debug, Clone, PartialEq)]
pub enum MockError {
    /// Bridge-level failure surfaced through the host
    Bridge(BridgeError),
    /// Exception raised inside the runtime
    Thrown(String),
}

impl From<BridgeError> for MockError {
    fn from(e: BridgeError) -> Self {
        MockError::Bridge(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub class: ClassId,
    pub slot: usize,
}

pub struct MethodDef {
    pub name: &'static str,
    pub params: Vec<ClassId>,
    pub ret: ReturnKind,
    pub body: Body,
}

pub struct ClassDef {
    pub name: String,
    pub parent: Option<ClassId>,
    pub primitive: Option<PrimitiveKind>,
    pub methods: Vec<MethodDef>,
}

pub enum HeapObject {
    Instance {
        class: ClassId,
        fields: HashMap<&'static str, Value>,
    },
    Array {
        component: Option<ClassId>,
        elements: Vec<Value>,
    },
    Boxed(Value),
    Method(MethodKey),
}

pub struct MiniVm {
    pub classes: Vec<ClassDef>,
    pub heap: Vec<HeapObject>,
    pub object_class: ClassId,
    pub void_class: ClassId,
    primitive_classes: [ClassId; 8],
    /// Make `primitive_type` fail for this kind
    pub fail_primitive: Option<PrimitiveKind>,
    /// Number of `call_nonvirtual` invocations that reached a body
    pub calls: usize,
}

fn thrown(msg: impl Into<String>) -> MockError {
    MockError::Thrown(msg.into())
}

impl MiniVm {
    pub fn new() -> Self {
        let mut vm = MiniVm {
            classes: Vec::new(),
            heap: Vec::new(),
            object_class: 0,
            void_class: 0,
            primitive_classes: [0; 8],
            fail_primitive: None,
            calls: 0,
        };
        vm.object_class = vm.push_class("java.lang.Object", None, None);
        vm.void_class = vm.push_class("void", None, None);
        for kind in PrimitiveKind::ALL {
            vm.primitive_classes[kind.index()] = vm.push_class(kind.name(), None, Some(kind));
        }
        vm
    }

    fn push_class(&mut self, name: &str, parent: Option<ClassId>, primitive: Option<PrimitiveKind>) -> ClassId {
        self.classes.push(ClassDef {
            name: name.to_string(),
            parent,
            primitive,
            methods: Vec::new(),
        });
        self.classes.len() - 1
    }

    fn alloc(&mut self, object: HeapObject) -> ObjRef {
        self.heap.push(object);
        self.heap.len() - 1
    }

    // ========================================================================
    // Setup helpers
    // ========================================================================

    pub fn registry(&mut self) -> PrimitiveRegistry<ClassId> {
        PrimitiveRegistry::initialize(self).expect("registry")
    }

    pub fn class_of_kind(&self, kind: PrimitiveKind) -> ClassId {
        self.primitive_classes[kind.index()]
    }

    pub fn define_class(&mut self, name: &str, parent: Option<ClassId>) -> ClassId {
        let parent = parent.or(Some(self.object_class));
        self.push_class(name, parent, None)
    }

    /// Define a method and return a reflective handle to it
    pub fn define_method(
        &mut self,
        class: ClassId,
        name: &'static str,
        params: Vec<ClassId>,
        ret: ReturnKind,
        body: impl Fn(&mut MiniVm, ObjRef, &[Value]) -> Result<ReturnValue<ObjRef>, MockError> + 'static,
    ) -> ObjRef {
        let methods = &mut self.classes[class].methods;
        methods.push(MethodDef {
            name,
            params,
            ret,
            body: Rc::new(body),
        });
        let slot = methods.len() - 1;
        self.alloc(HeapObject::Method(MethodKey { class, slot }))
    }

    pub fn new_instance(&mut self, class: ClassId) -> ObjRef {
        self.alloc(HeapObject::Instance {
            class,
            fields: HashMap::new(),
        })
    }

    pub fn boxed(&mut self, value: Value) -> ObjRef {
        self.alloc(HeapObject::Boxed(value))
    }

    pub fn new_array(&mut self, component: Option<ClassId>, elements: Vec<Value>) -> ObjRef {
        self.alloc(HeapObject::Array { component, elements })
    }

    /// One-element primitive carrier; the kind comes from the value's tag
    pub fn carrier(&mut self, value: Value) -> ObjRef {
        let component = match value.tag() {
            TypeTag::Primitive(kind) => self.class_of_kind(kind),
            TypeTag::Reference => self.object_class,
        };
        self.new_array(Some(component), vec![value])
    }

    /// One-element `Object[]` carrier
    pub fn ref_carrier(&mut self, target: Option<ObjRef>) -> ObjRef {
        let component = self.object_class;
        self.new_array(Some(component), vec![NativeValue::Reference(target)])
    }

    /// Argument vector of carrier slots
    pub fn args(&mut self, slots: Vec<Option<ObjRef>>) -> ObjRef {
        let component = self.object_class;
        let elements = slots.into_iter().map(NativeValue::Reference).collect();
        self.new_array(Some(component), elements)
    }

    pub fn field(&self, obj: ObjRef, name: &str) -> Option<Value> {
        match &self.heap[obj] {
            HeapObject::Instance { fields, .. } => fields.get(name).copied(),
            _ => None,
        }
    }

    pub fn set_field(&mut self, obj: ObjRef, name: &'static str, value: Value) -> Result<(), MockError> {
        match &mut self.heap[obj] {
            HeapObject::Instance { fields, .. } => {
                fields.insert(name, value);
                Ok(())
            }
            _ => Err(thrown("NullPointerException: not an instance")),
        }
    }

    pub fn class_of(&self, obj: ObjRef) -> Option<ClassId> {
        match &self.heap[obj] {
            HeapObject::Instance { class, .. } => Some(*class),
            _ => None,
        }
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    fn method_key(&self, handle: &ObjRef) -> Result<MethodKey, MockError> {
        match self.heap.get(*handle) {
            Some(HeapObject::Method(key)) => Ok(*key),
            _ => Err(thrown("IllegalArgumentException: not a method handle")),
        }
    }

    fn method_def(&self, key: MethodKey) -> &MethodDef {
        &self.classes[key.class].methods[key.slot]
    }

    fn is_subclass(&self, mut class: ClassId, ancestor: ClassId) -> bool {
        loop {
            if class == ancestor {
                return true;
            }
            match self.classes[class].parent {
                Some(parent) => class = parent,
                None => return false,
            }
        }
    }

    fn run(&mut self, key: MethodKey, receiver: ObjRef, args: &[Value]) -> Result<ReturnValue<ObjRef>, MockError> {
        let def = self.method_def(key);
        if def.params.len() != args.len() {
            return Err(thrown("IllegalArgumentException: wrong number of arguments"));
        }
        for (param, arg) in def.params.iter().zip(args) {
            let expected = match self.classes[*param].primitive {
                Some(kind) => TypeTag::Primitive(kind),
                None => TypeTag::Reference,
            };
            if arg.tag() != expected {
                return Err(thrown(format!(
                    "IllegalArgumentException: expected {}, got {}",
                    expected,
                    arg.tag()
                )));
            }
        }
        let body = Rc::clone(&def.body);
        self.calls += 1;
        body(self, receiver, args)
    }

    /// Ordinary dynamic dispatch by name, for contrast with the bridge
    pub fn call_virtual(&mut self, receiver: ObjRef, name: &str, args: &[Value]) -> Result<ReturnValue<ObjRef>, MockError> {
        let mut class = self.class_of(receiver).ok_or_else(|| thrown("NullPointerException"))?;
        loop {
            if let Some(slot) = self.classes[class].methods.iter().position(|m| m.name == name) {
                return self.run(MethodKey { class, slot }, receiver, args);
            }
            class = self.classes[class]
                .parent
                .ok_or_else(|| thrown(format!("NoSuchMethodError: {}", name)))?;
        }
    }
}

impl HostRuntime for MiniVm {
    type Object = ObjRef;
    type Class = ClassId;
    type PinnedClass = ClassId;
    type MethodId = MethodKey;
    type Error = MockError;

    fn resolve_entry_point(&mut self, method: &ObjRef) -> Result<MethodKey, MockError> {
        self.method_key(method)
    }

    fn resolve_declaring_type(&mut self, method: &ObjRef) -> Result<ClassId, MockError> {
        Ok(self.method_key(method)?.class)
    }

    fn primitive_type(&mut self, kind: PrimitiveKind) -> Result<ClassId, MockError> {
        if self.fail_primitive == Some(kind) {
            return Err(BridgeError::UnresolvedPrimitive { kind }.into());
        }
        Ok(self.class_of_kind(kind))
    }

    fn array_length(&mut self, array: &ObjRef) -> Result<usize, MockError> {
        match &self.heap[*array] {
            HeapObject::Array { elements, .. } => Ok(elements.len()),
            _ => Err(thrown("IllegalArgumentException: not an array")),
        }
    }

    fn array_element(&mut self, array: &ObjRef, index: usize) -> Result<Option<ObjRef>, MockError> {
        match &self.heap[*array] {
            HeapObject::Array { elements, .. } => match elements.get(index) {
                Some(NativeValue::Reference(r)) => Ok(*r),
                Some(_) => Err(thrown("ArrayStoreException: primitive element")),
                None => Err(thrown("ArrayIndexOutOfBoundsException")),
            },
            _ => Err(thrown("IllegalArgumentException: not an array")),
        }
    }

    fn component_type(&mut self, array: &ObjRef) -> Result<Option<ClassId>, MockError> {
        match &self.heap[*array] {
            HeapObject::Array { component, .. } => Ok(*component),
            _ => Err(thrown("IllegalArgumentException: not an array")),
        }
    }

    fn is_same_type(&mut self, class: &ClassId, pinned: &ClassId) -> Result<bool, MockError> {
        Ok(class == pinned)
    }

    fn read_primitive(&mut self, array: &ObjRef, kind: PrimitiveKind) -> Result<Value, MockError> {
        match &self.heap[*array] {
            HeapObject::Array { elements, .. } => match elements.first() {
                Some(value) if value.tag() == TypeTag::Primitive(kind) => Ok(*value),
                Some(_) => Err(thrown("ArrayStoreException: element kind mismatch")),
                None => Err(thrown("ArrayIndexOutOfBoundsException")),
            },
            _ => Err(thrown("IllegalArgumentException: not an array")),
        }
    }

    fn call_nonvirtual(
        &mut self,
        receiver: &ObjRef,
        class: &ClassId,
        method: MethodKey,
        kind: ReturnKind,
        args: &[Value],
    ) -> Result<ReturnValue<ObjRef>, MockError> {
        let receiver_class = self.class_of(*receiver).ok_or_else(|| thrown("NullPointerException"))?;
        if !self.is_subclass(receiver_class, *class) {
            return Err(thrown("IncompatibleClassChangeError"));
        }
        if self.method_def(method).ret != kind {
            return Err(thrown("wrong invocation primitive for return type"));
        }
        self.run(method, *receiver, args)
    }
}

impl ReflectiveHost for MiniVm {
    fn return_kind(&mut self, method: &ObjRef) -> Result<ReturnKind, MockError> {
        let key = self.method_key(method)?;
        Ok(self.method_def(key).ret)
    }

    fn parameter_types(&mut self, method: &ObjRef) -> Result<Vec<ClassId>, MockError> {
        let key = self.method_key(method)?;
        Ok(self.method_def(key).params.clone())
    }

    fn new_carrier(&mut self, parameter: &ClassId, value: &ObjRef) -> Result<ObjRef, MockError> {
        match self.classes[*parameter].primitive {
            Some(kind) => match &self.heap[*value] {
                HeapObject::Boxed(v) if v.tag() == TypeTag::Primitive(kind) => {
                    let v = *v;
                    Ok(self.new_array(Some(*parameter), vec![v]))
                }
                _ => Err(thrown("IllegalArgumentException: argument type mismatch")),
            },
            None => Ok(self.ref_carrier(Some(*value))),
        }
    }

    fn new_argument_vector(&mut self, slots: Vec<Option<ObjRef>>) -> Result<ObjRef, MockError> {
        Ok(self.args(slots))
    }
}

// ============================================================================
// Body helpers
// ============================================================================

pub fn returns(value: ReturnValue<ObjRef>) -> impl Fn(&mut MiniVm, ObjRef, &[Value]) -> Result<ReturnValue<ObjRef>, MockError> {
    move |_, _, _| Ok(value)
}

pub fn echo_first() -> impl Fn(&mut MiniVm, ObjRef, &[Value]) -> Result<ReturnValue<ObjRef>, MockError> {
    |_, _, args| {
        Ok(match args[0] {
            NativeValue::Boolean(v) => ReturnValue::Boolean(v),
            NativeValue::Byte(v) => ReturnValue::Byte(v),
            NativeValue::Char(v) => ReturnValue::Char(v),
            NativeValue::Short(v) => ReturnValue::Short(v),
            NativeValue::Int(v) => ReturnValue::Int(v),
            NativeValue::Long(v) => ReturnValue::Long(v),
            NativeValue::Float(v) => ReturnValue::Float(v),
            NativeValue::Double(v) => ReturnValue::Double(v),
            NativeValue::Reference(r) => ReturnValue::Object(r),
        })
    }
}
