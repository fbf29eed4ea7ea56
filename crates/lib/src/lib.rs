//!
//! Entrust: transitive delegation resolution for persistent identifier namespaces.
//! This library answers "who may act on behalf of whom" questions by expanding and
//! verifying delegation relationships held by a remote lookup service.
//!
//! ## Core Concepts
//!
//! * **Identities (`identity::Identity`)**: Names in the persistent identifier namespace:
//!   entities, groups, and the authority objects that manage delegation decisions for them.
//! * **Delegation chains (`chain::DelegationChain`)**: Immutable paths of delegators connecting
//!   a senior-most delegator down to a delegate, each link delegating directly to the next.
//! * **Lookup services (`lookup::DelegationLookup`)**: A pluggable interface to the remote
//!   service that answers direct-delegation questions. Ships with an HTTP client
//!   (`lookup::HttpLookup`), an in-memory graph (`lookup::InMemory`), and a TTL-honoring
//!   cache wrapper (`lookup::CachedLookup`).
//! * **Resolver (`resolver::DelegationResolver`)**: The closure computation and chain
//!   verification algorithms built on top of a lookup service.
//! * **TTLs (`ttl::Ttl`, `ttl::WithTtl`)**: Every remote answer carries a time-to-live;
//!   composite answers carry the most conservative (minimum) TTL of their parts.

pub mod chain;
pub mod identity;
pub mod lookup;
pub mod resolver;
pub mod ttl;

pub use chain::DelegationChain;
pub use identity::Identity;
pub use lookup::DelegationLookup;
pub use resolver::{DelegationResolver, ResolverOptions};
pub use ttl::{Ttl, WithTtl};

/// Result type used throughout the Entrust library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Entrust library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured errors from the lookup service layer
    #[error(transparent)]
    Lookup(lookup::LookupError),

    /// Structured errors from the resolver module
    #[error(transparent)]
    Resolver(resolver::ResolverError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Lookup(_) => "lookup",
            Error::Resolver(_) => "resolver",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates an identity was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Lookup(lookup_err) => lookup_err.is_not_found(),
            Error::Resolver(resolver_err) => resolver_err.is_seed_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a transport or service failure.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Lookup(lookup_err) => lookup_err.is_transport(),
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Check if this error indicates an alias loop during authority discovery.
    pub fn is_alias_loop(&self) -> bool {
        match self {
            Error::Lookup(lookup_err) => lookup_err.is_alias_loop(),
            _ => false,
        }
    }
}
