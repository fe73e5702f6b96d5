//! Minimal views of a shared environment.
//!
//! A projection is a fresh object tree holding only the leaves named by a
//! list of dotted paths. Containers along a path are new plain objects;
//! functions and accessors at the leaves are rebound so that calling them
//! through the projection reaches the real environment, never the
//! projection itself.

use policy::AccessPolicy;
use tracing::debug;

use crate::{Error, Object, PropertyDescriptor, Rebinder, Result, Value};

/// Build a projection of `source` holding only `paths`.
///
/// `foreign` is the receiver identity that callers inside the sandbox will
/// use for the root (usually the projection or the sandbox's global), and
/// `substitute` is what the real functions should see instead. They
/// default to the new projection and `source`. Below the root, each
/// projected container is replaced by the source object it mirrors.
///
/// Paths absent from `source` are skipped.
///
/// Building a projection is observable: whenever a path walks *through* an
/// accessor (`a` in `a.b` when `a` is a getter), the getter runs once, at
/// build time, with the substitute as receiver. Accessors at the end of a
/// path are not invoked here; they stay live.
pub fn project<S: AsRef<str>>(
    source: &Object,
    paths: &[S],
    foreign: Option<Value>,
    substitute: Option<Value>,
) -> Result<Object> {
    let target = Object::new();
    let foreign = foreign.unwrap_or_else(|| Value::from(&target));
    let substitute = substitute.unwrap_or_else(|| Value::from(source));
    let rebinder = Rebinder::for_identity(&foreign, substitute);
    let source = Value::from(source);

    for path in paths {
        let segments: Vec<&str> = path.as_ref().split('.').collect();
        copy_value_at_path(&segments, &source, &target, &rebinder)?;
    }
    Ok(target)
}

/// Project the read grants of `policy`. Write grants are ignored here.
pub fn endowments_for_policy(
    source: &Object,
    policy: &AccessPolicy,
    foreign: Option<Value>,
    substitute: Option<Value>,
) -> Result<Object> {
    let paths = policy.read_paths();
    project(source, paths.as_slice(), foreign, substitute)
}

/// Copy one path from `source` onto `target`.
pub fn copy_value_at_path(
    segments: &[&str],
    source: &Value,
    target: &Object,
    rebinder: &Rebinder,
) -> Result<()> {
    let Some((&segment, rest)) = segments.split_first() else {
        return Err(Error::EmptyPath);
    };

    let Some(source_desc) = lookup(source, segment) else {
        debug!(segment, "source has no such property, skipping");
        return Ok(());
    };

    let existing = existing_container(target, segment)?;

    if !rest.is_empty() {
        let (source_value, source_writable) = materialize(&source_desc, segment, rebinder)?;
        let next_target = match existing {
            Some(container) => container,
            None => {
                let container = Object::new();
                target.define_property(
                    segment,
                    PropertyDescriptor::Data {
                        value: Value::from(&container),
                        writable: source_writable,
                        enumerable: source_desc.is_enumerable(),
                        configurable: source_desc.is_configurable(),
                    },
                );
                container
            }
        };
        let next_rebinder =
            Rebinder::for_identity(&Value::from(&next_target), source_value.clone());
        return copy_value_at_path(rest, &source_value, &next_target, &next_rebinder);
    }

    target.define_property(segment, rebinder.wrap_descriptor(&source_desc));
    Ok(())
}

/// Property lookup across the delegation chain. Primitives have none.
fn lookup(source: &Value, key: &str) -> Option<PropertyDescriptor> {
    match source {
        Value::Object(object) => object.find_property(key),
        _ => None,
    }
}

/// The object already projected at `segment`, if any.
///
/// Accessors and primitive values cannot be extended.
fn existing_container(target: &Object, segment: &str) -> Result<Option<Object>> {
    match target.get_own_property(segment) {
        None => Ok(None),
        Some(PropertyDescriptor::Data {
            value: Value::Object(container),
            ..
        }) => Ok(Some(container)),
        Some(PropertyDescriptor::Data { value, .. }) => Err(Error::NotExtensible {
            segment: segment.to_string(),
            found: value.type_name(),
        }),
        Some(PropertyDescriptor::Accessor { .. }) => Err(Error::NotExtensible {
            segment: segment.to_string(),
            found: "accessor",
        }),
    }
}

/// Resolve a source descriptor to a concrete value and writability.
///
/// Accessors are read through their getter with the level's substitute
/// as receiver; they count as writable when they have a setter.
fn materialize(
    desc: &PropertyDescriptor,
    segment: &str,
    rebinder: &Rebinder,
) -> Result<(Value, bool)> {
    match desc {
        PropertyDescriptor::Data {
            value, writable, ..
        } => Ok((value.clone(), *writable)),
        PropertyDescriptor::Accessor { get: Some(get), set, .. } => {
            let value = get
                .call(rebinder.substitute(), &[])
                .map_err(|e| Error::getter(segment, e))?;
            Ok((value, set.is_some()))
        }
        PropertyDescriptor::Accessor { get: None, .. } => Err(Error::MissingGetter {
            segment: segment.to_string(),
        }),
    }
}
