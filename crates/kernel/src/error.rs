use endowments::Thrown;
use thiserror::Error;

use crate::ModuleId;

/// Module registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// A module with this id is already registered.
    #[error("redundant module definition for id \"{id}\"")]
    DuplicateModule { id: ModuleId },

    /// No module is registered under this id.
    #[error("no module registered for \"{id}\"")]
    UnregisteredModule { id: ModuleId },
}

/// Kernel errors.
///
/// Every variant is fatal to the call that produced it; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Policy(#[from] policy::Error),

    #[error(transparent)]
    Projection(#[from] endowments::Error),

    /// An exception raised by a module initializer.
    #[error(transparent)]
    Thrown(#[from] Thrown),
}

pub type Result<T> = std::result::Result<T, Error>;
