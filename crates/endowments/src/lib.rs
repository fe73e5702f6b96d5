//! Policy-shaped views of a shared environment.
//!
//! This crate builds the *endowments* a sandboxed package receives: a
//! fresh object tree that exposes only the paths its policy grants, with
//! every function and accessor rebound so the package can neither observe
//! nor be observed by the real environment's identity.
//!
//! # Overview
//!
//! - [`Object`] / [`Value`] / [`PropertyDescriptor`]: an explicit object
//!   model. Lookups walk parent links; descriptors are either data or
//!   accessor and every consumer matches on both.
//! - [`Rebinder`]: wraps callables and accessor pairs with receiver
//!   substitution.
//! - [`project`]: copies granted paths from a source environment into a
//!   new projection.
//!
//! # Example
//!
//! ```
//! use endowments::{Object, PropertyDescriptor, Value, project};
//!
//! let console = Object::new();
//! let log = Object::function(|_, _| Ok(Value::Undefined));
//! console.define_property("log", PropertyDescriptor::data(log));
//! let global = Object::new();
//! global.define_property("console", PropertyDescriptor::data(console));
//! global.define_property("secret", PropertyDescriptor::data("hunter2"));
//!
//! let view = project(&global, &["console.log"], None, None)?;
//! assert_eq!(view.own_keys(), ["console"]);
//! # Ok::<(), endowments::Error>(())
//! ```

mod error;
mod object;
mod project;
mod rebind;
mod value;

pub use error::{Error, Result};
pub use object::{NativeFn, Object, PropertyDescriptor, WeakObject};
pub use project::{copy_value_at_path, endowments_for_policy, project};
pub use rebind::{ForeignTest, Rebinder, any_of, rebind_global_descriptor, same_identity};
pub use value::{Thrown, Value};
