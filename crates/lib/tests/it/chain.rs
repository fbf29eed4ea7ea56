use entrust::{DelegationChain, Identity};

use crate::helpers::id;

#[test]
fn test_chains_share_structure_under_prepend() {
    let seed = DelegationChain::solo("org/alice");
    let via_ops = seed.prepend("org/ops").prepend("org/engineering");
    let via_qa = seed.prepend("org/qa");

    assert_eq!(via_ops.tail(), &id("org/alice"));
    assert_eq!(via_qa.tail(), &id("org/alice"));
    assert_eq!(via_ops.len(), 3);
    assert_eq!(via_qa.len(), 2);
}

#[test]
fn test_chain_serializes_as_identity_list() {
    let chain = DelegationChain::solo("org/alice")
        .prepend("org/ops")
        .prepend("org/engineering");

    let json = serde_json::to_string(&chain).unwrap();
    assert_eq!(json, r#"["org/engineering","org/ops","org/alice"]"#);

    let back: DelegationChain = serde_json::from_str(&json).unwrap();
    assert_eq!(back, chain);
}

#[test]
fn test_chain_rejects_empty_serialized_form() {
    assert!(serde_json::from_str::<DelegationChain>("[]").is_err());
}

#[test]
fn test_chain_round_trips_through_identities() {
    let identities: Vec<Identity> = ["org/root", "org/engineering", "org/ops", "org/alice"]
        .into_iter()
        .map(Identity::from)
        .collect();
    let chain = DelegationChain::from_identities(identities.clone()).unwrap();
    assert_eq!(chain.identities(), identities);
    assert_eq!(
        chain.to_string(),
        "org/root -> org/engineering -> org/ops -> org/alice"
    );
}
