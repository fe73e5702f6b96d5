//! The loader kernel.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use endowments::{Object, Value, endowments_for_policy};
use policy::{AccessPolicy, PolicyStore};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::module::Lifecycle;
use crate::{
    BundleDescriptor, DependencyMap, Initializer, ModuleId, ModuleRegistry, ModuleScope,
    ModuleState, Result,
};

/// Identifies one kernel in logs when several share a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelId(pub Uuid);

impl KernelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KernelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owns a module registry and a policy store, and executes modules.
///
/// Both stores only grow. A kernel is single-threaded; initializers run
/// synchronously and may re-enter the kernel through
/// [`ModuleScope::require`].
pub struct Kernel {
    pub id: KernelId,
    modules: RefCell<ModuleRegistry>,
    policies: RefCell<PolicyStore>,
}

impl Kernel {
    pub fn new() -> Self {
        let id = KernelId::new();
        debug!(kernel = %id, "created kernel");
        Self {
            id,
            modules: RefCell::new(ModuleRegistry::new()),
            policies: RefCell::new(PolicyStore::new()),
        }
    }

    /// Register a module. Fails if `id` is taken.
    pub fn register(
        &self,
        id: impl Into<ModuleId>,
        dependencies: DependencyMap,
        initializer: Initializer,
    ) -> Result<()> {
        self.modules
            .borrow_mut()
            .register(id.into(), dependencies, initializer)?;
        Ok(())
    }

    /// Resolve `specifier` as written inside `parent`.
    pub fn resolve(&self, parent: &ModuleId, specifier: &str) -> Result<ModuleId> {
        Ok(self.modules.borrow().resolve(parent, specifier)?)
    }

    /// Execute a module, or return its exports if it already ran.
    ///
    /// A module that is mid-execution (a dependency cycle reached it again)
    /// yields its exports as populated so far. If the initializer fails the
    /// error is returned and the module stays `Executing`; it is not run
    /// again.
    pub fn execute(&self, id: &ModuleId) -> Result<Object> {
        let record = self.modules.borrow().get(id)?;

        let exports = {
            let mut lifecycle = record.lifecycle.borrow_mut();
            match &*lifecycle {
                Lifecycle::Loaded { exports } => {
                    trace!(kernel = %self.id, module = %id, "module cached");
                    return Ok(exports.clone());
                }
                Lifecycle::Executing { exports } => {
                    debug!(kernel = %self.id, module = %id, "cycle, returning partial exports");
                    return Ok(exports.clone());
                }
                Lifecycle::Registered => {}
            }
            // Allocated before the initializer runs so a cycle can hand it out.
            let exports = Object::new();
            *lifecycle = Lifecycle::Executing {
                exports: exports.clone(),
            };
            exports
        };

        debug!(kernel = %self.id, module = %id, "executing module");
        let scope = ModuleScope::new(self, id.clone(), exports.clone());
        (record.initializer)(&scope)?;

        *record.lifecycle.borrow_mut() = Lifecycle::Loaded {
            exports: exports.clone(),
        };
        debug!(kernel = %self.id, module = %id, "module loaded");
        Ok(exports)
    }

    /// Public entry for executing a module by id after loading.
    pub fn run_module(&self, id: impl Into<ModuleId>) -> Result<Object> {
        self.execute(&id.into())
    }

    pub(crate) fn require_from(&self, parent: &ModuleId, specifier: &str) -> Result<Object> {
        let target = self.resolve(parent, specifier)?;
        self.execute(&target)
    }

    /// Load one bundle.
    ///
    /// Stores the bundle's package policies, registers its modules in order
    /// and runs its entry points in order. Returns the first entry point's
    /// exports.
    ///
    /// A package that already has a policy, or a module id that is already
    /// registered, fails the call. Work done before the failure is kept:
    /// policies and modules accepted earlier in the same call stay in place.
    pub fn load_bundle(&self, bundle: BundleDescriptor) -> Result<Option<Object>> {
        let BundleDescriptor {
            modules,
            entry_points,
            policy,
        } = bundle;

        self.policies.borrow_mut().extend_from(&policy)?;

        {
            let mut registry = self.modules.borrow_mut();
            for module in modules {
                registry.register(module.id, module.dependencies, module.initializer)?;
            }
        }

        let mut entry_exports = Vec::with_capacity(entry_points.len());
        for entry in &entry_points {
            entry_exports.push(self.execute(entry)?);
        }
        Ok(entry_exports.into_iter().next())
    }

    /// The stored policy for `package`.
    pub fn policy_for(&self, package: &str) -> Option<Rc<AccessPolicy>> {
        self.policies.borrow().get(package)
    }

    /// Build `package`'s projection of `source`.
    ///
    /// A package without a stored policy gets an empty projection. See
    /// [`endowments::project`] for `foreign`/`substitute` and for the
    /// getter side effects of building a projection.
    pub fn endowments_for(
        &self,
        package: &str,
        source: &Object,
        foreign: Option<Value>,
        substitute: Option<Value>,
    ) -> Result<Object> {
        match self.policy_for(package) {
            Some(policy) => Ok(endowments_for_policy(source, &policy, foreign, substitute)?),
            None => {
                debug!(kernel = %self.id, package, "no policy stored, empty endowments");
                Ok(Object::new())
            }
        }
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.borrow().contains(id)
    }

    pub fn state(&self, id: &ModuleId) -> Option<ModuleState> {
        self.modules.borrow().get(id).ok().map(|record| record.state())
    }

    pub fn len(&self) -> usize {
        self.modules.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.borrow().is_empty()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("id", &self.id)
            .field("modules", &self.len())
            .field("packages", &self.policies.borrow().len())
            .finish()
    }
}
