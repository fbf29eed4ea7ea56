//! Delegation lookup service abstraction.
//!
//! The resolver never talks to the network itself; it consumes a
//! `DelegationLookup`, the interface to whatever service holds the delegation
//! relationship graph. This allows the closure and verification logic to be
//! independent of the transport.
//!
//! Three implementations ship with the crate:
//!
//! * [`HttpLookup`]: JSON-over-HTTP client for a remote delegation service.
//! * [`InMemory`]: in-memory relationship graph for tests and development.
//! * [`CachedLookup`]: TTL-honoring cache wrapped around any other lookup.

pub mod cache;
pub mod errors;
pub mod http;
pub mod memory;

pub use cache::{CachedLookup, SweeperHandle};
pub use errors::LookupError;
pub use http::HttpLookup;
pub use memory::InMemory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{identity::Identity, ttl::WithTtl};

/// Maximum alias indirections followed while resolving a delegation authority.
///
/// Alias records in the namespace may point at further aliases; implementations
/// stop after this many hops and report [`LookupError::AliasLoop`] instead of
/// chasing indefinitely.
pub const MAX_ALIAS_HOPS: usize = 10;

/// Interface to the service answering direct-delegation questions.
///
/// Implementations must be `Send + Sync`; the resolver issues calls one at a
/// time, but nothing prevents callers from sharing one lookup across threads.
///
/// `repository` on every operation is an optional hint naming the repository
/// expected to hold the authority objects; services without multiple
/// repositories may ignore it.
#[async_trait]
pub trait DelegationLookup: Send + Sync {
    /// Finds the authority object that manages delegation decisions for
    /// `identity`, following alias indirection up to [`MAX_ALIAS_HOPS`].
    ///
    /// # Returns
    /// The authority identity, or [`LookupError::NotFound`] when `identity`
    /// does not exist in the namespace.
    async fn resolve_delegation_authority(
        &self,
        identity: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<Identity, LookupError>;

    /// Asks `delegator`'s authority object whether `delegate` is a direct
    /// delegate of `delegator`.
    async fn check_delegation(
        &self,
        delegate: &Identity,
        delegator: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<bool>, LookupError>;

    /// Lists all identities that directly delegate to `delegate`, in the
    /// order the service reports them.
    async fn list_direct_delegators(
        &self,
        delegate: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<Vec<Identity>>, LookupError>;
}

#[async_trait]
impl<L: DelegationLookup + ?Sized> DelegationLookup for Arc<L> {
    async fn resolve_delegation_authority(
        &self,
        identity: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<Identity, LookupError> {
        (**self)
            .resolve_delegation_authority(identity, repository)
            .await
    }

    async fn check_delegation(
        &self,
        delegate: &Identity,
        delegator: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<bool>, LookupError> {
        (**self)
            .check_delegation(delegate, delegator, authority, repository)
            .await
    }

    async fn list_direct_delegators(
        &self,
        delegate: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<Vec<Identity>>, LookupError> {
        (**self)
            .list_direct_delegators(delegate, authority, repository)
            .await
    }
}
