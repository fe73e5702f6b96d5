//! Projection error types.

use thiserror::Error;

use crate::Thrown;

/// Projection errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The projection already holds a leaf at this segment that cannot
    /// carry nested properties.
    #[error(
        "cannot extend projection at \"{segment}\": existing {found} is not an object or function"
    )]
    NotExtensible { segment: String, found: &'static str },

    /// An accessor had to be read but has no getter.
    #[error("property descriptor at \"{segment}\" has neither a value nor a getter")]
    MissingGetter { segment: String },

    /// A path with no segments was requested.
    #[error("unable to copy, path has no segments")]
    EmptyPath,

    /// A getter threw while its value was being read for projection.
    #[error("getter at \"{segment}\" threw")]
    Getter {
        segment: String,
        #[source]
        source: Thrown,
    },
}

impl Error {
    pub(crate) fn getter(segment: &str, source: Thrown) -> Self {
        Self::Getter {
            segment: segment.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
