//! Lookup error types for the Entrust library.
//!
//! This module defines structured error types for the delegation lookup layer,
//! providing better error context and type safety compared to string-based errors.

use thiserror::Error as ThisError;

use crate::Error;
use crate::identity::Identity;

/// Errors that can occur while querying a delegation lookup service.
///
/// `NotFound` is the only recoverable variant: during closure computation it
/// degrades to "this delegator has no further delegators" for every identity
/// except the traversal seed. All other variants are fatal to the caller; the
/// lookup layer performs no retries of its own.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum LookupError {
    /// The queried identity does not exist in the namespace.
    #[error("Identity not found: {identity}")]
    NotFound {
        /// The identity that was not found
        identity: Identity,
    },

    /// Alias indirection exceeded the hop bound during authority discovery.
    #[error("Alias loop resolving delegation authority for {identity} (gave up after {hops} hops)")]
    AliasLoop {
        /// The identity whose authority was being resolved
        identity: Identity,
        /// Number of alias hops followed before giving up
        hops: usize,
    },

    /// The lookup transport failed (network error, service failure).
    #[error("Lookup transport failed: {reason}")]
    Transport {
        /// Description of the transport failure
        reason: String,
        /// The underlying error, when one exists
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The service answered with something that could not be decoded.
    #[error("Malformed lookup response: {reason}")]
    MalformedResponse {
        /// Description of the decoding failure
        reason: String,
    },
}

impl LookupError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(identity: impl Into<Identity>) -> Self {
        LookupError::NotFound {
            identity: identity.into(),
        }
    }

    /// Shorthand for a `Transport` error with no underlying source.
    pub fn transport(reason: impl Into<String>) -> Self {
        LookupError::Transport {
            reason: reason.into(),
            source: None,
        }
    }

    /// Check if this error indicates the queried identity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }

    /// Check if this error indicates an alias loop.
    pub fn is_alias_loop(&self) -> bool {
        matches!(self, LookupError::AliasLoop { .. })
    }

    /// Check if this error indicates a transport or service failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LookupError::Transport { .. } | LookupError::MalformedResponse { .. }
        )
    }

    /// Get the identity this error is about, when there is one.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            LookupError::NotFound { identity } | LookupError::AliasLoop { identity, .. } => {
                Some(identity)
            }
            _ => None,
        }
    }
}

// Conversion from LookupError to the main Error type
impl From<LookupError> for Error {
    fn from(err: LookupError) -> Self {
        Error::Lookup(err)
    }
}
