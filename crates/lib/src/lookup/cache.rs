//! TTL-honoring cache for delegation lookups.
//!
//! `CachedLookup` wraps any `DelegationLookup` and remembers its answers for
//! as long as their TTLs allow. Expired entries are evicted lazily on access;
//! a background sweeper task can additionally be spawned to keep the map from
//! accumulating entries nobody asks about again.
//!
//! Cached answers are served with their *remaining* TTL so downstream
//! consumers never trust an answer longer than the service originally allowed.
//! Errors are never cached. Authority resolutions carry no TTL on the wire and
//! are cached under a configurable default instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use super::{DelegationLookup, LookupError};
use crate::identity::Identity;
use crate::ttl::{Ttl, WithTtl};

/// Default TTL applied to cached authority resolutions.
pub const DEFAULT_AUTHORITY_TTL: Ttl = Ttl::seconds(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Authority {
        identity: Identity,
        repository: Option<Identity>,
    },
    Check {
        delegate: Identity,
        delegator: Identity,
        authority: Identity,
        repository: Option<Identity>,
    },
    Delegators {
        delegate: Identity,
        authority: Identity,
        repository: Option<Identity>,
    },
}

#[derive(Debug, Clone)]
enum CacheValue {
    Authority(Identity),
    Check(bool),
    Delegators(Vec<Identity>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CacheValue,
    stored_at: Instant,
    ttl: Ttl,
}

impl CacheEntry {
    /// TTL still left on this entry, or `None` once no full second remains.
    fn remaining(&self, now: Instant) -> Option<Ttl> {
        let elapsed = now.saturating_duration_since(self.stored_at).as_secs();
        self.ttl.remaining_after(elapsed)
    }
}

/// A caching wrapper around a delegation lookup.
///
/// The map is guarded by a single mutex; entries are small (identities and
/// identity lists) and the inner lookup is never awaited while the lock is
/// held, so contention stays bounded by map bookkeeping.
#[derive(Debug)]
pub struct CachedLookup<L> {
    inner: L,
    authority_ttl: Ttl,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<L: DelegationLookup> CachedLookup<L> {
    /// Wraps `inner` with the default authority TTL.
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            authority_ttl: DEFAULT_AUTHORITY_TTL,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the TTL under which authority resolutions are cached.
    pub fn with_authority_ttl(mut self, ttl: Ttl) -> Self {
        self.authority_ttl = ttl;
        self
    }

    /// Access the wrapped lookup.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns true when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Evicts expired entries, returning how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| entry.remaining(now).is_some());
        before - entries.len()
    }

    fn get(&self, key: &CacheKey) -> Option<(CacheValue, Ttl)> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) => match entry.remaining(now) {
                Some(remaining) => Some((entry.value.clone(), remaining)),
                None => {
                    entries.remove(key);
                    None
                }
            },
            None => None,
        }
    }

    fn put(&self, key: CacheKey, value: CacheValue, ttl: Ttl) {
        // A zero TTL means "do not trust beyond this call"; nothing to keep.
        if ttl.as_secs() == 0 {
            return;
        }
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
            ttl,
        };
        self.entries.lock().unwrap().insert(key, entry);
    }
}

impl<L: DelegationLookup + 'static> CachedLookup<L> {
    /// Spawns a background task sweeping expired entries every `period`.
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped; dropping the returned handle aborts it earlier.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> SweeperHandle {
        let cache: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else { break };
                let evicted = cache.sweep();
                if evicted > 0 {
                    debug!(evicted, "evicted expired lookup cache entries");
                }
            }
        });
        SweeperHandle { task }
    }
}

/// Handle to a running cache sweeper; aborts the task when dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    task: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweeper.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl<L: DelegationLookup> DelegationLookup for CachedLookup<L> {
    async fn resolve_delegation_authority(
        &self,
        identity: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<Identity, LookupError> {
        let key = CacheKey::Authority {
            identity: identity.clone(),
            repository: repository.cloned(),
        };
        if let Some((CacheValue::Authority(authority), _)) = self.get(&key) {
            return Ok(authority);
        }

        let authority = self
            .inner
            .resolve_delegation_authority(identity, repository)
            .await?;
        self.put(
            key,
            CacheValue::Authority(authority.clone()),
            self.authority_ttl,
        );
        Ok(authority)
    }

    async fn check_delegation(
        &self,
        delegate: &Identity,
        delegator: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<bool>, LookupError> {
        let key = CacheKey::Check {
            delegate: delegate.clone(),
            delegator: delegator.clone(),
            authority: authority.clone(),
            repository: repository.cloned(),
        };
        if let Some((CacheValue::Check(authorized), remaining)) = self.get(&key) {
            return Ok(WithTtl::new(authorized, remaining));
        }

        let answer = self
            .inner
            .check_delegation(delegate, delegator, authority, repository)
            .await?;
        self.put(key, CacheValue::Check(answer.value), answer.ttl);
        Ok(answer)
    }

    async fn list_direct_delegators(
        &self,
        delegate: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<Vec<Identity>>, LookupError> {
        let key = CacheKey::Delegators {
            delegate: delegate.clone(),
            authority: authority.clone(),
            repository: repository.cloned(),
        };
        if let Some((CacheValue::Delegators(delegators), remaining)) = self.get(&key) {
            return Ok(WithTtl::new(delegators, remaining));
        }

        let answer = self
            .inner
            .list_direct_delegators(delegate, authority, repository)
            .await?;
        self.put(
            key,
            CacheValue::Delegators(answer.value.clone()),
            answer.ttl,
        );
        Ok(answer)
    }
}
