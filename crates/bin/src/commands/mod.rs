//! Command implementations for the Entrust binary.

pub mod check;
pub mod closure;
pub mod serve;

use std::sync::Arc;

use entrust::{
    DelegationResolver, Identity, ResolverOptions,
    lookup::HttpLookup,
};

use crate::cli::LookupArgs;

/// Builds a resolver backed by the HTTP lookup service named in `args`.
pub(crate) fn build_resolver(
    args: &LookupArgs,
) -> Result<DelegationResolver, Box<dyn std::error::Error>> {
    let lookup = HttpLookup::new(args.endpoint.clone())?;
    let options = ResolverOptions {
        always_own_authority: args.own_authority,
        repository: args.repository.as_deref().map(Identity::from),
    };
    Ok(DelegationResolver::with_options(Arc::new(lookup), options))
}
