//! In-memory delegation lookup implementation.
//!
//! This module provides an in-memory implementation of the `DelegationLookup`
//! trait, suitable for testing, development, or scenarios where the delegation
//! graph is assembled locally rather than fetched from a remote service.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use super::{DelegationLookup, LookupError, MAX_ALIAS_HOPS};
use crate::identity::Identity;
use crate::ttl::{Ttl, WithTtl};

/// Per-identity record in the in-memory graph.
#[derive(Debug, Clone)]
struct EntityRecord {
    /// Redirect to another identity, followed during authority discovery
    alias: Option<Identity>,
    /// Explicit delegation authority; the identity manages itself when unset
    authority: Option<Identity>,
    /// Identities that directly delegate to this entity, in insertion order
    delegators: Vec<Identity>,
    /// TTL attached to answers about this entity
    ttl: Ttl,
}

impl EntityRecord {
    fn new() -> Self {
        Self {
            alias: None,
            authority: None,
            delegators: Vec::new(),
            ttl: Ttl::FOREVER,
        }
    }
}

/// A simple in-memory delegation graph using a `HashMap` for storage.
///
/// Suitable for testing and development. Every trait call is appended to a
/// call log so tests can assert which lookups a traversal actually issued.
///
/// Entities are created through the builder-style `add_*` methods, which take
/// `&self` so a graph can keep evolving after being shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct InMemory {
    /// Entity records with read-write lock for concurrent access
    entities: RwLock<HashMap<Identity, EntityRecord>>,
    /// Recorded trait calls, oldest first
    calls: Mutex<Vec<LookupCall>>,
}

/// One recorded call against the in-memory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCall {
    /// `resolve_delegation_authority` for the given identity
    ResolveAuthority(Identity),
    /// `check_delegation` of delegate against delegator
    CheckDelegation {
        /// The identity whose authorization was queried
        delegate: Identity,
        /// The granting identity
        delegator: Identity,
    },
    /// `list_direct_delegators` for the given delegate
    ListDirectDelegators(Identity),
}

impl InMemory {
    /// Creates a new, empty in-memory delegation graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity with no delegators and a never-expiring TTL.
    pub fn add_entity(&self, identity: impl Into<Identity>) {
        let mut entities = self.entities.write().unwrap();
        entities.entry(identity.into()).or_insert_with(EntityRecord::new);
    }

    /// Sets the TTL attached to answers about `identity`, registering it if needed.
    pub fn set_ttl(&self, identity: impl Into<Identity>, ttl: Ttl) {
        let mut entities = self.entities.write().unwrap();
        entities
            .entry(identity.into())
            .or_insert_with(EntityRecord::new)
            .ttl = ttl;
    }

    /// Records that `delegator` directly delegates to `delegate`.
    ///
    /// Registers `delegate` if needed; `delegator` is left unregistered so
    /// traversals exercise the not-found degradation path unless it is added
    /// explicitly.
    pub fn add_delegation(
        &self,
        delegator: impl Into<Identity>,
        delegate: impl Into<Identity>,
    ) {
        let delegator = delegator.into();
        let mut entities = self.entities.write().unwrap();
        let record = entities
            .entry(delegate.into())
            .or_insert_with(EntityRecord::new);
        if !record.delegators.contains(&delegator) {
            record.delegators.push(delegator);
        }
    }

    /// Makes `from` an alias for `to` during authority discovery.
    pub fn add_alias(&self, from: impl Into<Identity>, to: impl Into<Identity>) {
        let mut entities = self.entities.write().unwrap();
        entities
            .entry(from.into())
            .or_insert_with(EntityRecord::new)
            .alias = Some(to.into());
    }

    /// Sets an explicit delegation authority for `identity`.
    pub fn set_authority(&self, identity: impl Into<Identity>, authority: impl Into<Identity>) {
        let mut entities = self.entities.write().unwrap();
        entities
            .entry(identity.into())
            .or_insert_with(EntityRecord::new)
            .authority = Some(authority.into());
    }

    /// Removes an entity entirely, making lookups about it fail with `NotFound`.
    pub fn remove_entity(&self, identity: &Identity) {
        let mut entities = self.entities.write().unwrap();
        entities.remove(identity);
    }

    /// Returns all recorded trait calls, oldest first.
    pub fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the recorded call log.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: LookupCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DelegationLookup for InMemory {
    async fn resolve_delegation_authority(
        &self,
        identity: &Identity,
        _repository: Option<&Identity>,
    ) -> std::result::Result<Identity, LookupError> {
        self.record(LookupCall::ResolveAuthority(identity.clone()));

        let entities = self.entities.read().unwrap();
        let mut current = identity.clone();
        let mut hops = 0;
        loop {
            let record = entities
                .get(&current)
                .ok_or_else(|| LookupError::not_found(current.clone()))?;
            match &record.alias {
                Some(target) => {
                    hops += 1;
                    if hops > MAX_ALIAS_HOPS {
                        return Err(LookupError::AliasLoop {
                            identity: identity.clone(),
                            hops,
                        });
                    }
                    current = target.clone();
                }
                None => {
                    return Ok(record.authority.clone().unwrap_or(current));
                }
            }
        }
    }

    async fn check_delegation(
        &self,
        delegate: &Identity,
        delegator: &Identity,
        _authority: &Identity,
        _repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<bool>, LookupError> {
        self.record(LookupCall::CheckDelegation {
            delegate: delegate.clone(),
            delegator: delegator.clone(),
        });

        let entities = self.entities.read().unwrap();
        let record = entities
            .get(delegate)
            .ok_or_else(|| LookupError::not_found(delegate.clone()))?;
        let authorized = record.delegators.contains(delegator);
        Ok(WithTtl::new(authorized, record.ttl))
    }

    async fn list_direct_delegators(
        &self,
        delegate: &Identity,
        _authority: &Identity,
        _repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<Vec<Identity>>, LookupError> {
        self.record(LookupCall::ListDirectDelegators(delegate.clone()));

        let entities = self.entities.read().unwrap();
        let record = entities
            .get(delegate)
            .ok_or_else(|| LookupError::not_found(delegate.clone()))?;
        Ok(WithTtl::new(record.delegators.clone(), record.ttl))
    }
}
