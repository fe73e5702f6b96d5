//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A path names the reserved `__proto__` segment.
    #[error("\"__proto__\" disallowed in policy path, saw \"{path}\"")]
    DisallowedSegment { path: String },

    /// A grant is neither the read marker nor the write marker.
    #[error("unknown grant for \"{path}\": {found}")]
    UnknownGrant { path: String, found: String },

    /// A package already has a stored policy.
    #[error("redundant policy definition for package \"{package}\"")]
    DuplicatePackagePolicy { package: String },

    /// Failed to parse a policy document.
    #[error("failed to parse policy: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
