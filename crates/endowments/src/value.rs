//! Runtime values shared across the sandbox boundary.

use std::fmt;

use thiserror::Error;

use crate::Object;

/// A runtime value.
///
/// Primitives compare by value. Objects (callables included) compare by
/// identity: two `Value::Object`s are equal only when they refer to the
/// same allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Object(Object),
}

impl Value {
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Object(o) if o.is_callable())
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Identity comparison. Same as `==`, spelled out at call sites that
    /// care about identity rather than content.
    pub fn same(&self, other: &Self) -> bool {
        self == other
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Object(o) if o.is_callable() => "function",
            Self::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Object(o) if o.is_callable() => write!(f, "[function]"),
            Self::Object(_) => write!(f, "[object]"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

impl From<&Object> for Value {
    fn from(o: &Object) -> Self {
        Self::Object(o.clone())
    }
}

/// An exception raised by a callable.
///
/// Wrappers never inspect or replace it; it reaches the caller exactly as
/// the original callable produced it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("uncaught exception: {0}")]
pub struct Thrown(pub Value);

impl Thrown {
    pub fn message(msg: impl Into<String>) -> Self {
        Self(Value::Str(msg.into()))
    }
}
