//! Objects, property descriptors and delegation chains.
//!
//! Every object owns its properties and may name one parent. Property
//! lookup walks the parent links explicitly; there is no implicit chain.
//! Callables are objects that also carry a native function, so they can
//! hold properties of their own.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{Thrown, Value};

/// Native function body: `(receiver, arguments) → result`.
pub type NativeFn = dyn Fn(&Value, &[Value]) -> Result<Value, Thrown>;

/// Property descriptor (data vs accessor).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDescriptor {
    /// Data descriptor: has `value` and `writable`.
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    /// Accessor descriptor: has `get` and/or `set`.
    Accessor {
        get: Option<Object>,
        set: Option<Object>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    /// Writable, enumerable, configurable data descriptor.
    pub fn data(value: impl Into<Value>) -> Self {
        Self::Data {
            value: value.into(),
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Enumerable, configurable accessor descriptor.
    pub fn accessor(get: Option<Object>, set: Option<Object>) -> Self {
        Self::Accessor {
            get,
            set,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// A data descriptor holding a callable.
    pub fn is_callable_data(&self) -> bool {
        matches!(self, Self::Data { value, .. } if value.is_callable())
    }
}

struct ObjectData {
    properties: RefCell<BTreeMap<String, PropertyDescriptor>>,
    parent: Option<Object>,
    call: Option<Box<NativeFn>>,
}

/// Reference-counted handle to an object.
///
/// Cloning the handle does not copy the object; equality is identity.
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

impl Object {
    /// A plain object with no parent.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// A plain object that delegates missing lookups to `parent`.
    pub fn with_parent(parent: &Object) -> Self {
        Self::build(Some(parent.clone()), None)
    }

    /// A callable object.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, Thrown> + 'static,
    {
        Self::build(None, Some(Box::new(f)))
    }

    fn build(parent: Option<Object>, call: Option<Box<NativeFn>>) -> Self {
        Self(Rc::new(ObjectData {
            properties: RefCell::new(BTreeMap::new()),
            parent,
            call,
        }))
    }

    pub fn is_callable(&self) -> bool {
        self.0.call.is_some()
    }

    /// Identity comparison.
    pub fn same(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<&Object> {
        self.0.parent.as_ref()
    }

    /// Handle that observes identity without keeping the object alive.
    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    pub fn get_own_property(&self, key: &str) -> Option<PropertyDescriptor> {
        self.0.properties.borrow().get(key).cloned()
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.0.properties.borrow().contains_key(key)
    }

    /// Define or replace an own property.
    pub fn define_property(&self, key: impl Into<String>, desc: PropertyDescriptor) {
        self.0.properties.borrow_mut().insert(key.into(), desc);
    }

    /// Own property keys in sorted order.
    pub fn own_keys(&self) -> Vec<String> {
        self.0.properties.borrow().keys().cloned().collect()
    }

    /// Find `key` on this object or the nearest ancestor that has it.
    pub fn find_property(&self, key: &str) -> Option<PropertyDescriptor> {
        let mut current = Some(self);
        while let Some(object) = current {
            if let Some(desc) = object.get_own_property(key) {
                return Some(desc);
            }
            current = object.parent();
        }
        None
    }

    /// `[[Get]]` with `receiver` as the getter's receiver.
    ///
    /// Missing properties read as `undefined`.
    pub fn get_with_receiver(&self, key: &str, receiver: &Value) -> Result<Value, Thrown> {
        match self.find_property(key) {
            None => Ok(Value::Undefined),
            Some(PropertyDescriptor::Data { value, .. }) => Ok(value),
            Some(PropertyDescriptor::Accessor { get: Some(get), .. }) => get.call(receiver, &[]),
            Some(PropertyDescriptor::Accessor { get: None, .. }) => Ok(Value::Undefined),
        }
    }

    /// `[[Get]]` with this object as receiver.
    pub fn get(&self, key: &str) -> Result<Value, Thrown> {
        self.get_with_receiver(key, &Value::Object(self.clone()))
    }

    /// `[[Set]]` with this object as receiver.
    ///
    /// Accessors found on the chain run their setter. Writing through a
    /// non-writable data property or a getter-only accessor throws.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), Thrown> {
        let value = value.into();
        match self.find_property(key) {
            Some(PropertyDescriptor::Accessor { set: Some(set), .. }) => {
                set.call(&Value::Object(self.clone()), &[value])?;
                Ok(())
            }
            Some(PropertyDescriptor::Accessor { set: None, .. }) => Err(Thrown::message(format!(
                "cannot set property \"{key}\" which has only a getter"
            ))),
            Some(PropertyDescriptor::Data { writable: false, .. }) => Err(Thrown::message(
                format!("cannot assign to read only property \"{key}\""),
            )),
            Some(PropertyDescriptor::Data { .. }) | None => {
                let mut properties = self.0.properties.borrow_mut();
                match properties.get_mut(key) {
                    Some(PropertyDescriptor::Data { value: slot, .. }) => *slot = value,
                    _ => {
                        properties.insert(key.to_string(), PropertyDescriptor::data(value));
                    }
                }
                Ok(())
            }
        }
    }

    /// Invoke this object with `receiver` and `args`.
    pub fn call(&self, receiver: &Value, args: &[Value]) -> Result<Value, Thrown> {
        match &self.0.call {
            Some(f) => f(receiver, args),
            None => Err(Thrown::message("object is not a function")),
        }
    }

    /// Read `key` and invoke it with this object as receiver.
    pub fn call_method(&self, key: &str, args: &[Value]) -> Result<Value, Thrown> {
        match self.get(key)? {
            Value::Object(f) if f.is_callable() => f.call(&Value::Object(self.clone()), args),
            other => Err(Thrown::message(format!(
                "\"{key}\" is not a function ({})",
                other.type_name()
            ))),
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = match self.0.properties.try_borrow() {
            Ok(properties) => properties.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        f.debug_struct("Object")
            .field("ptr", &Rc::as_ptr(&self.0))
            .field("callable", &self.is_callable())
            .field("keys", &keys)
            .finish()
    }
}

/// Non-owning handle used for identity checks.
#[derive(Clone)]
pub struct WeakObject(Weak<ObjectData>);

impl WeakObject {
    /// Whether `object` is the object this handle was taken from.
    pub fn is(&self, object: &Object) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&object.0))
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakObject").field(&self.0.as_ptr()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parent_links() {
        let base = Object::new();
        base.define_property("inherited", PropertyDescriptor::data(1));
        let child = Object::with_parent(&base);
        child.define_property("own", PropertyDescriptor::data(2));

        assert_eq!(child.get("inherited").unwrap(), Value::from(1));
        assert_eq!(child.get("own").unwrap(), Value::from(2));
        assert!(!child.has_own_property("inherited"));
        assert_eq!(child.get("missing").unwrap(), Value::Undefined);
    }

    #[test]
    fn nearest_ancestor_wins() {
        let grandparent = Object::new();
        grandparent.define_property("x", PropertyDescriptor::data("far"));
        let parent = Object::with_parent(&grandparent);
        parent.define_property("x", PropertyDescriptor::data("near"));
        let child = Object::with_parent(&parent);
        assert_eq!(child.get("x").unwrap(), Value::from("near"));
    }

    #[test]
    fn identity_equality() {
        let a = Object::new();
        let b = Object::new();
        assert_eq!(Value::from(&a), Value::from(a.clone()));
        assert_ne!(Value::from(&a), Value::from(&b));
        assert!(a.downgrade().is(&a));
        assert!(!a.downgrade().is(&b));
    }

    #[test]
    fn accessor_get_and_set() {
        let stored = Rc::new(RefCell::new(Value::from(0)));
        let get = {
            let stored = stored.clone();
            Object::function(move |_, _| Ok(stored.borrow().clone()))
        };
        let set = {
            let stored = stored.clone();
            Object::function(move |_, args| {
                *stored.borrow_mut() = args[0].clone();
                Ok(Value::Undefined)
            })
        };
        let obj = Object::new();
        obj.define_property("v", PropertyDescriptor::accessor(Some(get.clone()), Some(set)));
        obj.set("v", 5).unwrap();
        assert_eq!(obj.get("v").unwrap(), Value::from(5));

        let read_only = Object::new();
        read_only.define_property("v", PropertyDescriptor::accessor(Some(get), None));
        assert!(read_only.set("v", 1).is_err());
    }

    #[test]
    fn calling_a_plain_object_throws() {
        let obj = Object::new();
        assert!(obj.call(&Value::Undefined, &[]).is_err());
        assert!(!Value::from(obj).is_callable());
    }
}
