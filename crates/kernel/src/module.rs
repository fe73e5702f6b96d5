//! Module records and the scope handed to initializers.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use endowments::{Object, PropertyDescriptor};

use crate::{Kernel, Result};

/// Identifier of a registered module.
///
/// Bundles may number their modules; numeric ids are carried as their
/// decimal string so `1` and `"1"` name the same module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ModuleId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Specifier → module id, as written by the bundler.
pub type DependencyMap = BTreeMap<String, ModuleId>;

/// Module body. Receives the module's scope; populates `exports`.
pub type Initializer = Rc<dyn Fn(&ModuleScope<'_>) -> Result<()>>;

/// Lifecycle state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Registered,
    Executing,
    Loaded,
}

/// Internal lifecycle; exports exist from the moment execution starts.
#[derive(Debug)]
pub(crate) enum Lifecycle {
    Registered,
    Executing { exports: Object },
    Loaded { exports: Object },
}

impl Lifecycle {
    pub(crate) fn state(&self) -> ModuleState {
        match self {
            Self::Registered => ModuleState::Registered,
            Self::Executing { .. } => ModuleState::Executing,
            Self::Loaded { .. } => ModuleState::Loaded,
        }
    }
}

/// A registered module.
pub struct ModuleRecord {
    pub(crate) id: ModuleId,
    pub(crate) dependencies: DependencyMap,
    pub(crate) initializer: Initializer,
    pub(crate) lifecycle: RefCell<Lifecycle>,
}

impl ModuleRecord {
    pub(crate) fn new(id: ModuleId, dependencies: DependencyMap, initializer: Initializer) -> Self {
        Self {
            id,
            dependencies,
            initializer,
            lifecycle: RefCell::new(Lifecycle::Registered),
        }
    }

    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    pub fn state(&self) -> ModuleState {
        self.lifecycle.borrow().state()
    }
}

impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// What a module initializer sees while it runs.
pub struct ModuleScope<'k> {
    kernel: &'k Kernel,
    id: ModuleId,
    exports: Object,
    module: Object,
}

impl<'k> ModuleScope<'k> {
    pub(crate) fn new(kernel: &'k Kernel, id: ModuleId, exports: Object) -> Self {
        let module = Object::new();
        module.define_property("exports", PropertyDescriptor::data(&exports));
        module.define_property("id", PropertyDescriptor::data(id.as_str()));
        Self {
            kernel,
            id,
            exports,
            module,
        }
    }

    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// This module's exports container.
    pub fn exports(&self) -> &Object {
        &self.exports
    }

    /// Module descriptor; its `exports` property is [`Self::exports`].
    pub fn module(&self) -> &Object {
        &self.module
    }

    /// Resolve `specifier` against this module's dependencies and execute
    /// the target, returning its exports.
    ///
    /// Requiring a module that is still executing (a cycle) returns its
    /// exports as populated so far.
    pub fn require(&self, specifier: &str) -> Result<Object> {
        self.kernel.require_from(&self.id, specifier)
    }
}

/// A module as delivered in a bundle.
#[derive(Clone)]
pub struct ModuleDefinition {
    pub id: ModuleId,
    pub dependencies: DependencyMap,
    pub initializer: Initializer,
}

impl ModuleDefinition {
    pub fn new<F>(id: impl Into<ModuleId>, initializer: F) -> Self
    where
        F: Fn(&ModuleScope<'_>) -> Result<()> + 'static,
    {
        Self {
            id: id.into(),
            dependencies: DependencyMap::new(),
            initializer: Rc::new(initializer),
        }
    }

    /// Map `specifier` to `target` in this module's dependency map.
    pub fn with_dependency(
        mut self,
        specifier: impl Into<String>,
        target: impl Into<ModuleId>,
    ) -> Self {
        self.dependencies.insert(specifier.into(), target.into());
        self
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
