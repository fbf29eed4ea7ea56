//! Resolver error types for the Entrust library.

use thiserror::Error as ThisError;

use crate::Error;
use crate::identity::Identity;
use crate::lookup::LookupError;

/// Errors that can occur during delegation resolution.
///
/// Lookup failures mostly pass through as [`crate::Error::Lookup`]; the
/// resolver adds its own variant only where the traversal position changes
/// what a failure means.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum ResolverError {
    /// An initial delegate of the traversal could not be resolved at all.
    ///
    /// Not-found answers for identities discovered *during* traversal degrade
    /// to "no further delegators"; for the identities the caller started from
    /// there is no traversal to degrade, so the failure is surfaced.
    #[error("Initial delegate not found: {identity}")]
    SeedNotFound {
        /// The starting identity that could not be resolved
        identity: Identity,
        /// The underlying lookup error
        #[source]
        source: LookupError,
    },
}

impl ResolverError {
    /// Check if this error indicates the traversal seed was unknown.
    pub fn is_seed_not_found(&self) -> bool {
        matches!(self, ResolverError::SeedNotFound { .. })
    }

    /// Get the identity this error is about.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            ResolverError::SeedNotFound { identity, .. } => Some(identity),
        }
    }
}

// Conversion from ResolverError to the main Error type
impl From<ResolverError> for Error {
    fn from(err: ResolverError) -> Self {
        Error::Resolver(err)
    }
}
