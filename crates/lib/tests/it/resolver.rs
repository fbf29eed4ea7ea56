use entrust::{DelegationChain, Ttl};

use crate::helpers::{id, org_graph, resolver};

#[tokio::test]
async fn test_closure_covers_the_whole_org() {
    let resolver = resolver(org_graph());

    let closure = resolver.all_delegators(&[id("org/alice")]).await.unwrap();
    let chains: Vec<String> = closure.value.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        chains,
        vec![
            "org/alice",
            "org/ops -> org/alice",
            "org/qa -> org/alice",
            "org/engineering -> org/ops -> org/alice",
            "org/root -> org/qa -> org/alice",
            "org/root -> org/engineering -> org/ops -> org/alice",
        ]
    );
}

#[tokio::test]
async fn test_implicit_delegators_collapse_paths() {
    let resolver = resolver(org_graph());

    // org/root reaches alice through engineering and through qa but is
    // reported once.
    let delegators = resolver
        .implicit_delegators(&id("org/alice"))
        .await
        .unwrap();
    assert_eq!(
        delegators.value,
        vec![
            id("org/alice"),
            id("org/ops"),
            id("org/qa"),
            id("org/engineering"),
            id("org/root"),
        ]
    );
}

#[tokio::test]
async fn test_every_discovered_chain_verifies() {
    let resolver = resolver(org_graph());

    let closure = resolver.all_delegators(&[id("org/alice")]).await.unwrap();
    for chain in &closure.value {
        let verdict = resolver
            .verify_chain(&id("org/alice"), chain)
            .await
            .unwrap();
        assert!(verdict.value, "chain failed verification: {chain}");
    }
}

#[tokio::test]
async fn test_fabricated_chain_is_rejected() {
    let resolver = resolver(org_graph());

    // qa never delegated to engineering.
    let chain = DelegationChain::from_identities(vec![
        id("org/engineering"),
        id("org/qa"),
        id("org/alice"),
    ])
    .unwrap();
    let verdict = resolver
        .verify_chain(&id("org/alice"), &chain)
        .await
        .unwrap();
    assert!(!verdict.value);
}

#[tokio::test]
async fn test_group_membership_question_end_to_end() {
    let resolver = resolver(org_graph());

    let verdict = resolver
        .check_delegator(&id("org/alice"), &id("org/root"))
        .await
        .unwrap();
    assert!(verdict.value);

    let verdict = resolver
        .check_delegator(&id("org/ops"), &id("org/qa"))
        .await
        .unwrap();
    assert!(!verdict.value);
}

#[tokio::test]
async fn test_closure_ttl_reflects_most_volatile_listing() {
    let graph = org_graph();
    graph.set_ttl("org/ops", Ttl::seconds(45));
    let resolver = resolver(graph);

    let closure = resolver.all_delegators(&[id("org/alice")]).await.unwrap();
    assert_eq!(closure.ttl, Ttl::seconds(45));
}

#[tokio::test]
async fn test_closure_from_multiple_seeds() {
    let resolver = resolver(org_graph());

    let closure = resolver
        .all_delegators(&[id("org/ops"), id("org/qa")])
        .await
        .unwrap();
    let heads: Vec<_> = closure.value.iter().map(|c| c.delegator().clone()).collect();
    assert_eq!(
        heads,
        vec![
            id("org/ops"),
            id("org/qa"),
            id("org/engineering"),
            id("org/root"),
            id("org/root"),
        ]
    );
}
