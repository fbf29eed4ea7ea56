use std::sync::Arc;

use entrust::{
    DelegationResolver, Identity, ResolverOptions,
    lookup::InMemory,
};

/// Shorthand for building identities in test graphs.
pub fn id(s: &str) -> Identity {
    Identity::from(s)
}

/// A small organization: alice belongs to ops, ops to engineering, and
/// engineering to the company root. A second team, qa, also contains alice.
pub fn org_graph() -> Arc<InMemory> {
    let graph = InMemory::new();
    graph.add_delegation("org/ops", "org/alice");
    graph.add_delegation("org/qa", "org/alice");
    graph.add_delegation("org/engineering", "org/ops");
    graph.add_delegation("org/root", "org/engineering");
    graph.add_delegation("org/root", "org/qa");
    graph.add_entity("org/root");
    Arc::new(graph)
}

/// Resolver treating every identity as its own delegation authority.
pub fn resolver(graph: Arc<InMemory>) -> DelegationResolver {
    DelegationResolver::with_options(
        graph,
        ResolverOptions {
            always_own_authority: true,
            repository: None,
        },
    )
}
