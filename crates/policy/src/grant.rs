use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The string marker for write grants.
pub const WRITE_MARKER: &str = "write";

/// Grant modes understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantMode {
    /// The path may be read through the projection.
    Read,
    /// The path may be written. Enforced outside this workspace.
    Write,
}

/// A grant as it appears in a policy document, before validation.
///
/// `true` is the read marker and `"write"` is the write marker; every
/// other value is kept so the validator can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GrantValue {
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

impl GrantValue {
    pub fn read() -> Self {
        Self::Flag(true)
    }

    pub fn write() -> Self {
        Self::Text(WRITE_MARKER.to_string())
    }

    /// Interpret the marker. `None` means the value is not a known grant.
    pub fn mode(&self) -> Option<GrantMode> {
        match self {
            Self::Flag(true) => Some(GrantMode::Read),
            Self::Text(s) if s == WRITE_MARKER => Some(GrantMode::Write),
            _ => None,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Flag(b) => format!("boolean {b}"),
            Self::Text(s) => format!("string {s:?}"),
            Self::Other(serde_json::Value::Null) => "null".to_string(),
            Self::Other(serde_json::Value::Number(n)) => format!("number {n}"),
            Self::Other(serde_json::Value::Array(_)) => "array".to_string(),
            Self::Other(_) => "object".to_string(),
        }
    }
}

/// Path → grant entries in document order.
///
/// Serialized as a map; deserialization keeps the order in which the
/// entries appear so validated read paths come out in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grants(Vec<(String, GrantValue)>);

impl Grants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, grant: GrantValue) {
        self.0.push((path.into(), grant));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GrantValue)> {
        self.0.iter().map(|(path, grant)| (path.as_str(), grant))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, GrantValue)> for Grants {
    fn from_iter<I: IntoIterator<Item = (K, GrantValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Serialize for Grants {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, grant) in &self.0 {
            map.serialize_entry(path, grant)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Grants {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GrantsVisitor;

        impl<'de> Visitor<'de> for GrantsVisitor {
            type Value = Grants;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of dotted paths to grants")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Grants, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((path, grant)) = access.next_entry::<String, GrantValue>()? {
                    entries.push((path, grant));
                }
                Ok(Grants(entries))
            }
        }

        deserializer.deserialize_map(GrantsVisitor)
    }
}
