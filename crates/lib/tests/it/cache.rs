use std::sync::Arc;
use std::time::Duration;

use entrust::{
    DelegationResolver, ResolverOptions, Ttl,
    lookup::{CachedLookup, DelegationLookup, InMemory},
};

use crate::helpers::{id, org_graph};

#[tokio::test]
async fn test_repeated_closures_reuse_cached_listings() {
    let graph = org_graph();
    graph.set_ttl("org/alice", Ttl::seconds(300));
    let cache = Arc::new(CachedLookup::new(graph));
    let resolver = DelegationResolver::with_options(
        cache.clone(),
        ResolverOptions {
            always_own_authority: true,
            repository: None,
        },
    );

    let first = resolver.all_delegators(&[id("org/alice")]).await.unwrap();
    let calls_after_first = (*cache).inner().calls().len();

    let second = resolver.all_delegators(&[id("org/alice")]).await.unwrap();
    assert_eq!(first.value, second.value);
    // The second traversal was answered from the cache entirely.
    assert_eq!((*cache).inner().calls().len(), calls_after_first);
}

#[tokio::test]
async fn test_expired_entries_are_evicted_on_access() {
    let graph = InMemory::new();
    graph.add_delegation("org/team", "org/alice");
    graph.set_ttl("org/alice", Ttl::seconds(1));
    let cache = CachedLookup::new(graph);

    cache
        .list_direct_delegators(&id("org/alice"), &id("org/alice"), None)
        .await
        .unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.inner().calls().len(), 1);

    std::thread::sleep(Duration::from_millis(1100));

    // Entry expired: the lookup goes back to the service.
    cache
        .list_direct_delegators(&id("org/alice"), &id("org/alice"), None)
        .await
        .unwrap();
    assert_eq!(cache.inner().calls().len(), 2);
}

#[tokio::test]
async fn test_background_sweeper_drains_expired_entries() {
    let graph = InMemory::new();
    graph.add_delegation("org/team", "org/alice");
    graph.set_ttl("org/alice", Ttl::seconds(1));
    let cache = Arc::new(CachedLookup::new(graph));
    let _sweeper = cache.spawn_sweeper(Duration::from_millis(50));

    cache
        .list_direct_delegators(&id("org/alice"), &id("org/alice"), None)
        .await
        .unwrap();
    assert_eq!(cache.len(), 1);

    tokio::time::sleep(Duration::from_millis(1300)).await;
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn test_cached_answer_never_outlives_original_ttl() {
    let graph = InMemory::new();
    graph.add_delegation("org/team", "org/alice");
    graph.set_ttl("org/alice", Ttl::seconds(2));
    let cache = CachedLookup::new(graph);

    let fresh = cache
        .list_direct_delegators(&id("org/alice"), &id("org/alice"), None)
        .await
        .unwrap();
    assert_eq!(fresh.ttl, Ttl::seconds(2));

    std::thread::sleep(Duration::from_millis(1100));

    let cached = cache
        .list_direct_delegators(&id("org/alice"), &id("org/alice"), None)
        .await
        .unwrap();
    assert!(cached.ttl < Ttl::seconds(2), "remaining TTL must decay");
}
