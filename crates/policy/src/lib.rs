//! Access policies for sandboxed packages.
//!
//! Core principle: **a package sees only the paths it was granted.**
//!
//! A policy document maps each package to a set of dotted paths into the
//! shared environment (`"console.log"`, `"location.href"`) and a grant for
//! each. Policies are validated when they are stored; a stored
//! [`AccessPolicy`] never names the reserved `__proto__` segment and only
//! carries known grant markers.

mod error;
mod grant;
mod policy;
mod store;

pub use error::{Error, Result};
pub use grant::{GrantMode, GrantValue, Grants, WRITE_MARKER};
pub use policy::{AccessPolicy, PackagePolicy, PolicyDocument, RESERVED_SEGMENT, read_paths};
pub use store::PolicyStore;
