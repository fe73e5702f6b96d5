//! Receiver rebinding for callables and accessors.
//!
//! A rebound callable is a new function identity that forwards to the
//! original. When it is invoked with a foreign receiver (the projection
//! standing in for the real environment), the original instead sees the
//! substitute (the real environment). Any other receiver passes through.

use std::rc::Rc;

use crate::{Object, PropertyDescriptor, Value, WeakObject};

/// Predicate deciding whether a receiver must be replaced.
pub type ForeignTest = Rc<dyn Fn(&Value) -> bool>;

/// Predicate matching exactly `identity`.
///
/// Object identities are held weakly so a projection that is its own
/// foreign identity does not keep itself alive.
pub fn same_identity(identity: &Value) -> ForeignTest {
    match identity {
        Value::Object(object) => {
            let weak: WeakObject = object.downgrade();
            Rc::new(move |receiver| matches!(receiver, Value::Object(o) if weak.is(o)))
        }
        primitive => {
            let primitive = primitive.clone();
            Rc::new(move |receiver| *receiver == primitive)
        }
    }
}

/// Predicate matching a receiver accepted by any of `tests`.
pub fn any_of(tests: Vec<ForeignTest>) -> ForeignTest {
    Rc::new(move |receiver: &Value| tests.iter().any(|test| test(receiver)))
}

/// Rebind a property taken from a sandbox's global for use on the host's.
///
/// Functions treat both the sandbox global and any receiver
/// `is_scope_proxy` accepts as foreign. Accessors only rebind the sandbox
/// global itself.
pub fn rebind_global_descriptor(
    desc: &PropertyDescriptor,
    sandbox_global: &Value,
    is_scope_proxy: ForeignTest,
    host_global: &Value,
) -> PropertyDescriptor {
    let rebinder = if desc.is_callable_data() {
        let is_foreign = any_of(vec![same_identity(sandbox_global), is_scope_proxy]);
        Rebinder::new(is_foreign, host_global.clone())
    } else {
        Rebinder::for_identity(sandbox_global, host_global.clone())
    };
    rebinder.wrap_descriptor(desc)
}

/// Wraps callables so they apply one receiver substitution rule.
#[derive(Clone)]
pub struct Rebinder {
    is_foreign: ForeignTest,
    substitute: Value,
}

impl Rebinder {
    pub fn new(is_foreign: ForeignTest, substitute: Value) -> Self {
        Self {
            is_foreign,
            substitute,
        }
    }

    /// Replace receivers identical to `foreign` with `substitute`.
    pub fn for_identity(foreign: &Value, substitute: Value) -> Self {
        Self::new(same_identity(foreign), substitute)
    }

    pub fn substitute(&self) -> &Value {
        &self.substitute
    }

    fn receiver<'a>(&'a self, receiver: &'a Value) -> &'a Value {
        if (self.is_foreign)(receiver) {
            &self.substitute
        } else {
            receiver
        }
    }

    /// A new callable forwarding to `original` with receiver substitution.
    ///
    /// Arguments, return values and thrown exceptions pass through as is.
    pub fn wrap_function(&self, original: &Object) -> Object {
        let rebinder = self.clone();
        let original = original.clone();
        Object::function(move |receiver, args| original.call(rebinder.receiver(receiver), args))
    }

    /// Rebound getter/setter pair.
    ///
    /// The getter substitutes its receiver, and a callable result is itself
    /// wrapped once before it is returned. The setter substitutes its
    /// receiver and forwards the assigned value. Missing halves stay
    /// missing.
    pub fn wrap_accessor(
        &self,
        get: Option<&Object>,
        set: Option<&Object>,
    ) -> (Option<Object>, Option<Object>) {
        let get = get.map(|getter| {
            let rebinder = self.clone();
            let getter = getter.clone();
            Object::function(move |receiver, _| {
                match getter.call(rebinder.receiver(receiver), &[])? {
                    Value::Object(result) if result.is_callable() => {
                        Ok(Value::Object(rebinder.wrap_function(&result)))
                    }
                    other => Ok(other),
                }
            })
        });
        let set = set.map(|setter| {
            let rebinder = self.clone();
            let setter = setter.clone();
            Object::function(move |receiver, args| {
                let value = args.first().cloned().unwrap_or_default();
                setter.call(rebinder.receiver(receiver), &[value])
            })
        });
        (get, set)
    }

    /// Rebind a whole descriptor, keeping its flags.
    ///
    /// Callable data values become [`Self::wrap_function`] wrappers and
    /// accessor pairs go through [`Self::wrap_accessor`]. Other data
    /// descriptors are returned unchanged.
    pub fn wrap_descriptor(&self, desc: &PropertyDescriptor) -> PropertyDescriptor {
        match desc {
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => {
                let (get, set) = self.wrap_accessor(get.as_ref(), set.as_ref());
                PropertyDescriptor::Accessor {
                    get,
                    set,
                    enumerable: *enumerable,
                    configurable: *configurable,
                }
            }
            PropertyDescriptor::Data {
                value: Value::Object(function),
                writable,
                enumerable,
                configurable,
            } if function.is_callable() => PropertyDescriptor::Data {
                value: Value::Object(self.wrap_function(function)),
                writable: *writable,
                enumerable: *enumerable,
                configurable: *configurable,
            },
            data @ PropertyDescriptor::Data { .. } => data.clone(),
        }
    }
}

impl std::fmt::Debug for Rebinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rebinder")
            .field("substitute", &self.substitute)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thrown;
    use std::cell::RefCell;

    /// A function that returns its receiver.
    fn receiver_echo() -> Object {
        Object::function(|receiver, _| Ok(receiver.clone()))
    }

    #[test]
    fn foreign_receiver_is_substituted() {
        let foreign = Value::from(Object::new());
        let real = Value::from(Object::new());
        let other = Value::from(Object::new());
        let wrapped =
            Rebinder::for_identity(&foreign, real.clone()).wrap_function(&receiver_echo());

        assert_eq!(wrapped.call(&foreign, &[]).unwrap(), real);
        assert_eq!(wrapped.call(&other, &[]).unwrap(), other);
        assert_eq!(wrapped.call(&Value::Undefined, &[]).unwrap(), Value::Undefined);
    }

    #[test]
    fn wrapper_is_a_distinct_identity() {
        let original = receiver_echo();
        let rebinder = Rebinder::for_identity(&Value::Null, Value::Undefined);
        let a = rebinder.wrap_function(&original);
        let b = rebinder.wrap_function(&original);
        assert!(!a.same(&original));
        assert!(!a.same(&b));
    }

    #[test]
    fn arguments_results_and_exceptions_pass_through() {
        let args_seen = Rc::new(RefCell::new(Vec::new()));
        let original = {
            let args_seen = args_seen.clone();
            Object::function(move |_, args| {
                args_seen.borrow_mut().extend_from_slice(args);
                match args.first() {
                    Some(Value::Str(s)) if s == "boom" => Err(Thrown::message("boom")),
                    _ => Ok(Value::from(42)),
                }
            })
        };
        let wrapped =
            Rebinder::for_identity(&Value::Null, Value::Undefined).wrap_function(&original);

        assert_eq!(
            wrapped.call(&Value::Null, &[1.into(), "two".into()]).unwrap(),
            Value::from(42)
        );
        assert_eq!(*args_seen.borrow(), vec![Value::from(1), Value::from("two")]);
        assert_eq!(
            wrapped.call(&Value::Null, &["boom".into()]),
            Err(Thrown::message("boom"))
        );
    }

    #[test]
    fn wrapping_composes() {
        let inner_foreign = Value::from(Object::new());
        let outer_foreign = Value::from(Object::new());
        let real = Value::from(Object::new());

        let once =
            Rebinder::for_identity(&inner_foreign, real.clone()).wrap_function(&receiver_echo());
        let twice =
            Rebinder::for_identity(&outer_foreign, inner_foreign.clone()).wrap_function(&once);

        assert_eq!(twice.call(&outer_foreign, &[]).unwrap(), real);
    }

    #[test]
    fn accessor_getter_substitutes_and_wraps_callable_results() {
        let foreign = Value::from(Object::new());
        let real = Value::from(Object::new());
        let method = receiver_echo();
        let getter = {
            let method = method.clone();
            Object::function(move |receiver, _| {
                assert!(receiver.is_object());
                Ok(Value::from(&method))
            })
        };
        let rebinder = Rebinder::for_identity(&foreign, real.clone());
        let (get, set) = rebinder.wrap_accessor(Some(&getter), None);
        assert!(set.is_none());

        let result = get.unwrap().call(&foreign, &[]).unwrap();
        let result = result.as_object().unwrap();
        assert!(!result.same(&method));
        assert_eq!(result.call(&foreign, &[]).unwrap(), real);
    }

    #[test]
    fn accessor_getter_result_not_wrapped_twice() {
        let nested = Object::new();
        let method = receiver_echo();
        method.define_property("inner", crate::PropertyDescriptor::data(&nested));
        let getter = Object::function(move |_, _| Ok(Value::from(&method)));
        let (get, _) = Rebinder::for_identity(&Value::Null, Value::Undefined)
            .wrap_accessor(Some(&getter), None);

        let result = get.unwrap().call(&Value::Null, &[]).unwrap();
        // The wrapper is a fresh function; members of the original are not copied.
        assert!(!result.as_object().unwrap().has_own_property("inner"));
    }

    #[test]
    fn accessor_setter_substitutes_and_forwards_value() {
        let foreign = Value::from(Object::new());
        let real = Value::from(Object::new());
        let seen = Rc::new(RefCell::new(None));
        let setter = {
            let seen = seen.clone();
            Object::function(move |receiver, args| {
                *seen.borrow_mut() = Some((receiver.clone(), args.to_vec()));
                Ok(Value::Undefined)
            })
        };
        let (_, set) =
            Rebinder::for_identity(&foreign, real.clone()).wrap_accessor(None, Some(&setter));

        set.unwrap().call(&foreign, &["v".into()]).unwrap();
        assert_eq!(*seen.borrow(), Some((real, vec![Value::from("v")])));
    }

    #[test]
    fn any_of_accepts_each_identity() {
        let global = Value::from(Object::new());
        let proxy = Value::from(Object::new());
        let is_foreign = any_of(vec![same_identity(&global), same_identity(&proxy)]);

        assert!(is_foreign(&global));
        assert!(is_foreign(&proxy));
        assert!(!is_foreign(&Value::from(Object::new())));
        assert!(!any_of(Vec::new())(&global));
    }

    #[test]
    fn wrap_descriptor_dispatches_on_variant() {
        let foreign = Value::from(Object::new());
        let real = Value::from(Object::new());
        let rebinder = Rebinder::for_identity(&foreign, real.clone());

        let plain = PropertyDescriptor::data("text");
        assert_eq!(rebinder.wrap_descriptor(&plain), plain);

        let original = receiver_echo();
        let function = PropertyDescriptor::Data {
            value: Value::from(&original),
            writable: false,
            enumerable: false,
            configurable: true,
        };
        match rebinder.wrap_descriptor(&function) {
            PropertyDescriptor::Data {
                value: Value::Object(wrapped),
                writable: false,
                enumerable: false,
                configurable: true,
            } => {
                assert!(!wrapped.same(&original));
                assert_eq!(wrapped.call(&foreign, &[]).unwrap(), real);
            }
            other => panic!("expected wrapped function, got {other:?}"),
        }

        let accessor = PropertyDescriptor::accessor(Some(receiver_echo()), None);
        let wrapped = rebinder.wrap_descriptor(&accessor);
        let PropertyDescriptor::Accessor { get: Some(get), set: None, .. } = &wrapped else {
            panic!("expected accessor, got {wrapped:?}");
        };
        assert_eq!(get.call(&foreign, &[]).unwrap(), real);
    }

    #[test]
    fn global_function_unwraps_global_and_scope_proxy() {
        let sandbox_global = Value::from(Object::new());
        let scope_proxy = Value::from(Object::new());
        let host_global = Value::from(Object::new());
        let desc = PropertyDescriptor::data(receiver_echo());

        let rebound = rebind_global_descriptor(
            &desc,
            &sandbox_global,
            same_identity(&scope_proxy),
            &host_global,
        );
        let PropertyDescriptor::Data { value: Value::Object(function), .. } = &rebound else {
            panic!("expected function, got {rebound:?}");
        };

        assert_eq!(function.call(&sandbox_global, &[]).unwrap(), host_global);
        assert_eq!(function.call(&scope_proxy, &[]).unwrap(), host_global);
        let other = Value::from(Object::new());
        assert_eq!(function.call(&other, &[]).unwrap(), other);
    }

    #[test]
    fn global_accessor_unwraps_only_the_global() {
        let sandbox_global = Value::from(Object::new());
        let scope_proxy = Value::from(Object::new());
        let host_global = Value::from(Object::new());
        let desc = PropertyDescriptor::accessor(Some(receiver_echo()), None);

        let rebound = rebind_global_descriptor(
            &desc,
            &sandbox_global,
            same_identity(&scope_proxy),
            &host_global,
        );
        let PropertyDescriptor::Accessor { get: Some(get), .. } = &rebound else {
            panic!("expected accessor, got {rebound:?}");
        };

        assert_eq!(get.call(&sandbox_global, &[]).unwrap(), host_global);
        assert_eq!(get.call(&scope_proxy, &[]).unwrap(), scope_proxy);
    }

    #[test]
    fn primitive_identity() {
        let is_foreign = same_identity(&Value::from("global"));
        assert!(is_foreign(&Value::from("global")));
        assert!(!is_foreign(&Value::from("other")));
    }
}
