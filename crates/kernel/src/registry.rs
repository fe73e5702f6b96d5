//! Append-only module registry and specifier resolution.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::{DependencyMap, Initializer, ModuleId, ModuleRecord, RegistryError};

/// Module id → record. Records are added, never removed or replaced.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<ModuleId, Rc<ModuleRecord>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module in the `Registered` state.
    pub fn register(
        &mut self,
        id: ModuleId,
        dependencies: DependencyMap,
        initializer: Initializer,
    ) -> Result<(), RegistryError> {
        if self.modules.contains_key(&id) {
            return Err(RegistryError::DuplicateModule { id });
        }
        debug!(module = %id, dependencies = dependencies.len(), "registered module");
        let record = ModuleRecord::new(id.clone(), dependencies, initializer);
        self.modules.insert(id, Rc::new(record));
        Ok(())
    }

    pub fn get(&self, id: &ModuleId) -> Result<Rc<ModuleRecord>, RegistryError> {
        self.modules
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnregisteredModule { id: id.clone() })
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Translate `specifier`, as written inside `parent`, to a module id.
    ///
    /// A specifier missing from the parent's dependency map is not an
    /// error: it is logged and the specifier itself is used as the id.
    pub fn resolve(&self, parent: &ModuleId, specifier: &str) -> Result<ModuleId, RegistryError> {
        let record = self.get(parent)?;
        match record.dependencies().get(specifier) {
            Some(id) => Ok(id.clone()),
            None => {
                warn!(
                    parent = %parent,
                    specifier,
                    "missing dependency, using specifier as module id"
                );
                Ok(ModuleId::from(specifier))
            }
        }
    }
}
