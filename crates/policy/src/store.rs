//! Append-only store of package policies.

use crate::{AccessPolicy, Error, PolicyDocument, Result};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// Package name → validated policy.
///
/// The first policy stored for a package wins; later definitions are
/// rejected instead of overriding it. There is no removal.
#[derive(Debug, Default)]
pub struct PolicyStore {
    packages: BTreeMap<String, Rc<AccessPolicy>>,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a validated policy for `package`.
    pub fn insert(&mut self, package: impl Into<String>, policy: AccessPolicy) -> Result<()> {
        let package = package.into();
        if self.packages.contains_key(&package) {
            return Err(Error::DuplicatePackagePolicy { package });
        }
        debug!(package = %package, grants = policy.len(), "stored package policy");
        self.packages.insert(package, Rc::new(policy));
        Ok(())
    }

    /// Validate and store every package in `document`.
    ///
    /// Packages are taken in name order, not document order. Stops at the
    /// first failure; packages whose names sort before the failing one stay
    /// stored and the rest are not looked at.
    pub fn extend_from(&mut self, document: &PolicyDocument) -> Result<()> {
        for (package, package_policy) in &document.resources {
            if self.packages.contains_key(package) {
                return Err(Error::DuplicatePackagePolicy {
                    package: package.clone(),
                });
            }
            let policy = AccessPolicy::validate(&package_policy.globals)?;
            self.insert(package.clone(), policy)?;
        }
        Ok(())
    }

    pub fn get(&self, package: &str) -> Option<Rc<AccessPolicy>> {
        self.packages.get(package).cloned()
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
