//! Delegation closure computation and chain verification.
//!
//! Two complementary views of the same relationship graph:
//!
//! * [`DelegationResolver::all_delegators`] *discovers*: a breadth-first
//!   expansion collecting every delegation chain reachable from a set of
//!   starting identities.
//! * [`DelegationResolver::verify_chain`] *checks*: walks one claimed chain
//!   link by link, confirming each delegation with the delegator's authority.
//!
//! Every call is a self-contained sequential traversal: the resolver keeps no
//! state between calls, so one resolver may serve concurrent callers as long
//! as the underlying lookup does. Answer caching across calls belongs to the
//! lookup layer (see `lookup::CachedLookup`), not here.

pub mod errors;


pub use errors::ResolverError;

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::Result;
use crate::chain::DelegationChain;
use crate::identity::Identity;
use crate::lookup::{DelegationLookup, LookupError};
use crate::ttl::{Ttl, WithTtl};

/// Options shared by all resolver operations.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Every identity manages its own delegation authority directly, so
    /// authority discovery is skipped and each delegator is consulted as its
    /// own authority.
    pub always_own_authority: bool,
    /// Repository hint forwarded to the lookup service.
    pub repository: Option<Identity>,
}

/// Resolver for transitive delegation questions over a lookup service.
pub struct DelegationResolver {
    lookup: Arc<dyn DelegationLookup>,
    options: ResolverOptions,
}

impl DelegationResolver {
    /// Creates a resolver with default options.
    pub fn new(lookup: Arc<dyn DelegationLookup>) -> Self {
        Self::with_options(lookup, ResolverOptions::default())
    }

    /// Creates a resolver with explicit options.
    pub fn with_options(lookup: Arc<dyn DelegationLookup>, options: ResolverOptions) -> Self {
        Self { lookup, options }
    }

    /// The options this resolver applies to every operation.
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Computes the full delegation closure of `initial`.
    ///
    /// Breadth-first expansion: every starting identity seeds a single-link
    /// chain; dequeued chains are recorded as discovered, their head's direct
    /// delegators fetched, and one extended chain enqueued per delegator. The
    /// same identity reached over different paths yields one chain per path.
    ///
    /// The answer's TTL is the minimum over all delegator listings consulted,
    /// or [`Ttl::FOREVER`] when no listing was consulted at all (empty
    /// `initial` yields an empty closure).
    ///
    /// # Errors
    /// A not-found answer for one of the `initial` identities fails with
    /// [`ResolverError::SeedNotFound`]. Not-found answers for identities
    /// discovered during traversal mark them as leaves and the traversal
    /// continues. Transport and alias-loop failures always propagate.
    pub async fn all_delegators(
        &self,
        initial: &[Identity],
    ) -> Result<WithTtl<Vec<DelegationChain>>> {
        let mut queue: VecDeque<DelegationChain> = initial
            .iter()
            .map(|identity| DelegationChain::solo(identity.clone()))
            .collect();
        let mut discovered: Vec<DelegationChain> = Vec::new();
        let mut ttl = Ttl::FOREVER;

        while let Some(chain) = queue.pop_front() {
            let head = chain.delegator().clone();
            let is_seed = chain.subchain().is_none();
            discovered.push(chain.clone());

            let listing = match self.direct_delegators(&head).await {
                Ok(listing) => listing,
                Err(LookupError::NotFound { identity }) if !is_seed => {
                    debug!(%head, %identity, "delegator unknown to lookup service, treating as leaf");
                    continue;
                }
                Err(source @ LookupError::NotFound { .. }) => {
                    return Err(ResolverError::SeedNotFound {
                        identity: head,
                        source,
                    }
                    .into());
                }
                Err(err) => return Err(err.into()),
            };

            let (delegators, listing_ttl) = listing.into_parts();
            ttl = ttl.min(listing_ttl);
            for delegator in delegators {
                if chain.contains(&delegator) {
                    warn!(%delegator, chain = %chain, "delegation cycle detected, skipping");
                    continue;
                }
                queue.push_back(chain.prepend(delegator));
            }
        }

        Ok(WithTtl::new(discovered, ttl))
    }

    /// Verifies a claimed delegation chain link by link.
    ///
    /// Walks from the chain's senior-most delegator: each link must confirm
    /// that the next identity down is its direct delegate, and the final link
    /// must confirm `delegate` against the chain's tail. The first link that
    /// fails short-circuits the walk, returning `false` with *that* link's
    /// TTL; a fully confirmed chain returns `true` with the minimum TTL across
    /// links. A link whose two identities coincide is confirmed without a
    /// lookup at [`Ttl::FOREVER`]; an identity always delegates to itself.
    pub async fn verify_chain(
        &self,
        delegate: &Identity,
        chain: &DelegationChain,
    ) -> Result<WithTtl<bool>> {
        let mut ttl = Ttl::FOREVER;
        let mut current = chain;
        loop {
            let delegator = current.delegator();
            let junior = match current.subchain() {
                Some(sub) => sub.delegator(),
                None => delegate,
            };

            if junior != delegator {
                let step = self.check_link(junior, delegator).await?;
                if !step.value {
                    debug!(%junior, %delegator, "delegation link rejected");
                    return Ok(WithTtl::new(false, step.ttl));
                }
                ttl = ttl.min(step.ttl);
            }

            match current.subchain() {
                Some(sub) => current = sub,
                None => break,
            }
        }
        Ok(WithTtl::new(true, ttl))
    }

    /// All identities that transitively delegate to `delegate`, deduplicated
    /// in discovery order.
    pub async fn implicit_delegators(&self, delegate: &Identity) -> Result<WithTtl<Vec<Identity>>> {
        let closure = self
            .all_delegators(std::slice::from_ref(delegate))
            .await?;
        Ok(closure.map(|chains| {
            let mut delegators: Vec<Identity> = Vec::new();
            for chain in &chains {
                if !delegators.contains(chain.delegator()) {
                    delegators.push(chain.delegator().clone());
                }
            }
            delegators
        }))
    }

    /// Does `delegator` transitively authorize `delegate`?
    ///
    /// Computes the closure from `delegate`, then re-verifies each discovered
    /// chain headed by `delegator` until one confirms. A positive verdict
    /// carries the minimum of closure and verification TTLs; a negative one
    /// carries the closure TTL, since the closure is what established the
    /// absence.
    pub async fn check_delegator(
        &self,
        delegate: &Identity,
        delegator: &Identity,
    ) -> Result<WithTtl<bool>> {
        let (chains, closure_ttl) = self
            .all_delegators(std::slice::from_ref(delegate))
            .await?
            .into_parts();

        for chain in chains.iter().filter(|c| c.delegator() == delegator) {
            let verdict = self.verify_chain(delegate, chain).await?;
            if verdict.value {
                return Ok(WithTtl::new(true, closure_ttl.min(verdict.ttl)));
            }
        }
        Ok(WithTtl::new(false, closure_ttl))
    }

    /// The authority to consult about `delegator`.
    async fn authority_for(
        &self,
        delegator: &Identity,
    ) -> std::result::Result<Identity, LookupError> {
        if self.options.always_own_authority {
            Ok(delegator.clone())
        } else {
            self.lookup
                .resolve_delegation_authority(delegator, self.options.repository.as_ref())
                .await
        }
    }

    async fn direct_delegators(
        &self,
        delegate: &Identity,
    ) -> std::result::Result<WithTtl<Vec<Identity>>, LookupError> {
        let authority = self.authority_for(delegate).await?;
        self.lookup
            .list_direct_delegators(delegate, &authority, self.options.repository.as_ref())
            .await
    }

    /// Checks one link, treating unknown identities as unauthorized.
    ///
    /// No TTL accompanies a not-found answer, so the rejection is reported at
    /// [`Ttl::FOREVER`].
    async fn check_link(&self, delegate: &Identity, delegator: &Identity) -> Result<WithTtl<bool>> {
        let authority = match self.authority_for(delegator).await {
            Ok(authority) => authority,
            Err(LookupError::NotFound { identity }) => {
                debug!(%delegator, %identity, "delegation authority unknown, link unauthorized");
                return Ok(WithTtl::new(false, Ttl::FOREVER));
            }
            Err(err) => return Err(err.into()),
        };

        match self
            .lookup
            .check_delegation(delegate, delegator, &authority, self.options.repository.as_ref())
            .await
        {
            Ok(step) => Ok(step),
            Err(LookupError::NotFound { .. }) => Ok(WithTtl::new(false, Ttl::FOREVER)),
            Err(err) => Err(err.into()),
        }
    }
}
