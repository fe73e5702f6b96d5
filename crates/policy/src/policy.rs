//! Policy documents and validation.

use crate::{Error, GrantMode, Grants, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path segment that no policy may name.
pub const RESERVED_SEGMENT: &str = "__proto__";

/// A policy document, as delivered alongside a bundle.
///
/// ```toml
/// [resources.fetch-wrapper.globals]
/// "fetch" = true
/// "console.log" = true
/// "location.href" = "write"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Per-package policies, keyed by package name.
    #[serde(default)]
    pub resources: BTreeMap<String, PackagePolicy>,
}

/// The policy for a single package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackagePolicy {
    /// Dotted paths into the shared environment and their grants.
    #[serde(default)]
    pub globals: Grants,
}

impl PolicyDocument {
    /// Parse a policy document from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Parse a policy document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))
    }

    pub fn with_package(mut self, package: impl Into<String>, policy: PackagePolicy) -> Self {
        self.resources.insert(package.into(), policy);
        self
    }
}

impl PackagePolicy {
    pub fn new(globals: Grants) -> Self {
        Self { globals }
    }
}

/// A validated access policy.
///
/// Holds every recognized grant in document order. Only read grants are
/// acted on by the projector; write grants are kept for the external
/// mechanism that enforces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    entries: Vec<(String, GrantMode)>,
}

impl AccessPolicy {
    /// Validate raw grants.
    ///
    /// Fails if any path has a `__proto__` segment or if a grant is neither
    /// the read nor the write marker.
    pub fn validate(grants: &Grants) -> Result<Self> {
        let mut entries = Vec::with_capacity(grants.len());
        for (path, grant) in grants.iter() {
            if path.split('.').any(|segment| segment == RESERVED_SEGMENT) {
                return Err(Error::DisallowedSegment {
                    path: path.to_string(),
                });
            }
            let mode = grant.mode().ok_or_else(|| Error::UnknownGrant {
                path: path.to_string(),
                found: grant.describe(),
            })?;
            entries.push((path.to_string(), mode));
        }
        Ok(Self { entries })
    }

    /// Paths granted for reading, in document order. Duplicates are kept.
    pub fn read_paths(&self) -> Vec<&str> {
        self.paths_with(GrantMode::Read)
    }

    /// Paths granted for writing, in document order.
    pub fn write_paths(&self) -> Vec<&str> {
        self.paths_with(GrantMode::Write)
    }

    /// The first grant recorded for `path`, if any.
    pub fn grant(&self, path: &str) -> Option<GrantMode> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, mode)| *mode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn paths_with(&self, mode: GrantMode) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, m)| *m == mode)
            .map(|(p, _)| p.as_str())
            .collect()
    }
}

/// Validate raw grants and return the read-granted paths.
///
/// Write grants are skipped without error.
pub fn read_paths(grants: &Grants) -> Result<Vec<String>> {
    let policy = AccessPolicy::validate(grants)?;
    Ok(policy.read_paths().into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrantValue;

    fn grants(entries: &[(&str, GrantValue)]) -> Grants {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_read_paths_skip_write_grants() {
        let g = grants(&[
            ("console.log", GrantValue::read()),
            ("location.href", GrantValue::write()),
            ("fetch", GrantValue::read()),
        ]);
        assert_eq!(read_paths(&g).unwrap(), ["console.log", "fetch"]);
    }

    #[test]
    fn test_duplicates_tolerated() {
        let g = grants(&[("a", GrantValue::read()), ("a", GrantValue::read())]);
        assert_eq!(read_paths(&g).unwrap(), ["a", "a"]);
    }

    #[test]
    fn test_proto_segment_rejected_anywhere() {
        for path in ["__proto__", "a.__proto__", "__proto__.b", "a.__proto__.c"] {
            let g = grants(&[(path, GrantValue::read())]);
            assert_eq!(
                read_paths(&g),
                Err(Error::DisallowedSegment {
                    path: path.to_string()
                })
            );
        }
    }

    #[test]
    fn test_proto_rejected_even_for_write_grants() {
        let g = grants(&[("x.__proto__", GrantValue::write())]);
        assert!(matches!(
            AccessPolicy::validate(&g),
            Err(Error::DisallowedSegment { .. })
        ));
    }

    #[test]
    fn test_proto_lookalikes_allowed() {
        let g = grants(&[("a.__proto", GrantValue::read()), ("proto__", GrantValue::read())]);
        assert_eq!(read_paths(&g).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_grant_rejected() {
        let g = grants(&[("a", GrantValue::Flag(false))]);
        assert_eq!(
            read_paths(&g),
            Err(Error::UnknownGrant {
                path: "a".into(),
                found: "boolean false".into()
            })
        );

        let g = grants(&[("b", GrantValue::Text("read".into()))]);
        assert!(matches!(read_paths(&g), Err(Error::UnknownGrant { .. })));
    }

    #[test]
    fn test_policy_keeps_write_grants() {
        let g = grants(&[("a", GrantValue::write()), ("b", GrantValue::read())]);
        let policy = AccessPolicy::validate(&g).unwrap();
        assert_eq!(policy.write_paths(), ["a"]);
        assert_eq!(policy.grant("b"), Some(GrantMode::Read));
        assert_eq!(policy.grant("c"), None);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[resources.app.globals]
"console.log" = true
"location.href" = "write"

[resources.lib]
"#;
        let doc = PolicyDocument::parse(toml).unwrap();
        let app = AccessPolicy::validate(&doc.resources["app"].globals).unwrap();
        assert_eq!(app.read_paths(), ["console.log"]);
        assert_eq!(app.write_paths(), ["location.href"]);
        assert!(doc.resources["lib"].globals.is_empty());
    }

    #[test]
    fn test_parse_json() {
        let json = serde_json::json!({
            "resources": {
                "app": { "globals": { "fetch": true, "document.title": "write" }, "packages": {} }
            }
        });
        let doc = PolicyDocument::from_json(&json.to_string()).unwrap();
        let app = AccessPolicy::validate(&doc.resources["app"].globals).unwrap();
        assert_eq!(app.read_paths(), ["fetch"]);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            PolicyDocument::from_json("{\"resources\": 3}"),
            Err(Error::Parse(_))
        ));
    }
}
