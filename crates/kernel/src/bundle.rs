//! The unit of incremental loading.

use policy::PolicyDocument;

use crate::{ModuleDefinition, ModuleId};

/// Modules, entry points and package policies delivered together.
#[derive(Debug, Clone, Default)]
pub struct BundleDescriptor {
    /// Modules to register, in order.
    pub modules: Vec<ModuleDefinition>,
    /// Modules to execute after registration, in order.
    pub entry_points: Vec<ModuleId>,
    /// Policies for the packages this bundle introduces.
    pub policy: PolicyDocument,
}

impl BundleDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: ModuleDefinition) -> Self {
        self.modules.push(module);
        self
    }

    pub fn entry_point(mut self, id: impl Into<ModuleId>) -> Self {
        self.entry_points.push(id.into());
        self
    }

    pub fn policy(mut self, policy: PolicyDocument) -> Self {
        self.policy = policy;
        self
    }
}
