//! Module loading kernel.
//!
//! This crate registers code units with their dependency maps, executes
//! each of them at most once, and composes incrementally delivered bundles
//! into one program. It also stores each package's access policy and builds
//! the package's endowments from a host environment on request.
//!
//! # Overview
//!
//! - **Kernel**: owns an append-only [`ModuleRegistry`] and an append-only
//!   [`policy::PolicyStore`]. Several kernels can live in one process.
//! - **Module lifecycle**: `Registered → Executing → Loaded`. Exports are
//!   allocated before a module's initializer runs, so a dependency cycle
//!   hands out the partially populated exports instead of recursing.
//! - **Bundles**: [`Kernel::load_bundle`] stores policies, registers
//!   modules and runs entry points in one call.
//!
//! # Example
//!
//! ```
//! use endowments::{PropertyDescriptor, Value};
//! use kernel::{BundleDescriptor, Kernel, ModuleDefinition};
//!
//! let kernel = Kernel::new();
//! let bundle = BundleDescriptor::new()
//!     .module(
//!         ModuleDefinition::new(1u64, |scope| {
//!             let util = scope.require("./util")?;
//!             scope.exports().define_property("answer", PropertyDescriptor::data(util.get("n")?));
//!             Ok(())
//!         })
//!         .with_dependency("./util", 2u64),
//!     )
//!     .module(ModuleDefinition::new(2u64, |scope| {
//!         scope.exports().define_property("n", PropertyDescriptor::data(42));
//!         Ok(())
//!     }))
//!     .entry_point(1u64);
//!
//! let exports = kernel.load_bundle(bundle)?.expect("one entry point");
//! assert_eq!(exports.get("answer")?, Value::from(42));
//! # Ok::<(), kernel::Error>(())
//! ```

mod bundle;
mod error;
mod kernel;
pub mod logging;
mod module;
mod registry;

pub use bundle::BundleDescriptor;
pub use error::{Error, RegistryError, Result};
pub use kernel::{Kernel, KernelId};
pub use module::{
    DependencyMap, Initializer, ModuleDefinition, ModuleId, ModuleRecord, ModuleScope, ModuleState,
};
pub use registry::ModuleRegistry;
