//! Delegation chain type.
//!
//! A `DelegationChain` is an immutable path of delegators: the head is the
//! senior-most delegator (e.g. a supergroup), the tail is the identity the
//! traversal started from (e.g. the group member). Chains are built strictly
//! by prepending a newly discovered delegator onto an existing chain, so this
//! code can never construct a cyclic chain; tails are shared between chains
//! via `Arc`, which keeps breadth-first expansion cheap.

use std::sync::Arc;

use serde::{Deserialize, Serialize, de};

use crate::identity::Identity;

/// One link in a delegation path, owning a shared reference to the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationChain {
    delegator: Identity,
    subchain: Option<Arc<DelegationChain>>,
}

impl DelegationChain {
    /// Creates a single-link chain: an identity standing as its own delegator.
    pub fn solo(delegator: impl Into<Identity>) -> Self {
        Self {
            delegator: delegator.into(),
            subchain: None,
        }
    }

    /// Returns a new chain with `delegator` prepended as the senior-most link.
    ///
    /// The existing chain becomes the new head's subchain; cloning is shallow.
    pub fn prepend(&self, delegator: impl Into<Identity>) -> Self {
        Self {
            delegator: delegator.into(),
            subchain: Some(Arc::new(self.clone())),
        }
    }

    /// Builds a chain from identities listed head (senior-most) to tail.
    ///
    /// Returns `None` for an empty list; chains always hold at least one link.
    pub fn from_identities(identities: impl IntoIterator<Item = Identity>) -> Option<Self> {
        let mut chain: Option<DelegationChain> = None;
        for identity in identities.into_iter().collect::<Vec<_>>().into_iter().rev() {
            chain = Some(match chain {
                Some(existing) => existing.prepend(identity),
                None => DelegationChain::solo(identity),
            });
        }
        chain
    }

    /// The delegator at the head of this chain (senior-most).
    pub fn delegator(&self) -> &Identity {
        &self.delegator
    }

    /// The rest of the chain, toward the identity the traversal started from.
    pub fn subchain(&self) -> Option<&DelegationChain> {
        self.subchain.as_deref()
    }

    /// The identity at the tail of the chain (the traversal seed).
    pub fn tail(&self) -> &Identity {
        let mut current = self;
        while let Some(sub) = current.subchain() {
            current = sub;
        }
        &current.delegator
    }

    /// Number of links in the chain. Always at least one.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Chains always hold at least one link.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if `identity` appears anywhere in the chain.
    ///
    /// Used by the resolver to refuse re-enqueuing a delegator already present
    /// in the current path, which bounds traversal over cyclic graphs.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.iter().any(|link| link == identity)
    }

    /// Iterates over the chain's identities, head (senior-most) to tail.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            current: Some(self),
        }
    }

    /// Collects the chain's identities, head to tail.
    pub fn identities(&self) -> Vec<Identity> {
        self.iter().cloned().collect()
    }
}

impl std::fmt::Display for DelegationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, identity) in self.iter().enumerate() {
            if index > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{identity}")?;
        }
        Ok(())
    }
}

/// Head-to-tail iterator over a chain's identities.
pub struct ChainIter<'a> {
    current: Option<&'a DelegationChain>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Identity;

    fn next(&mut self) -> Option<Self::Item> {
        let chain = self.current?;
        self.current = chain.subchain();
        Some(&chain.delegator)
    }
}

impl<'a> IntoIterator for &'a DelegationChain {
    type Item = &'a Identity;
    type IntoIter = ChainIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Chains serialize as their ordered identity list so service responses and CLI
// output stay readable; the linked representation is an internal detail.
impl Serialize for DelegationChain {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for DelegationChain {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let identities = Vec::<Identity>::deserialize(deserializer)?;
        DelegationChain::from_identities(identities)
            .ok_or_else(|| de::Error::custom("delegation chain cannot be empty"))
    }
}
