//! Serve command - runs the delegation query service.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};

use entrust::{
    DelegationChain, DelegationResolver, Identity, ResolverOptions, Ttl,
    lookup::{CachedLookup, HttpLookup},
};

use crate::cli::ServeArgs;

/// Shared application state
#[derive(Clone)]
struct AppState {
    resolver: Arc<DelegationResolver>,
}

/// Delegation query request body
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DelegationRequest {
    /// Expand the delegation closure of a set of identities
    AllDelegators { identities: Vec<Identity> },
    /// Ask whether a delegator transitively authorizes a delegate
    CheckDelegation {
        delegate: Identity,
        delegator: Identity,
    },
}

/// Delegation query response body
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DelegationResponse {
    Chains {
        chains: Vec<DelegationChain>,
        ttl: Ttl,
    },
    Verdict {
        authorized: bool,
        ttl: Ttl,
    },
    Error {
        message: String,
    },
}

/// Run the delegation query service
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let lookup = HttpLookup::new(args.upstream.clone())?;
    let cache = Arc::new(
        CachedLookup::new(lookup).with_authority_ttl(Ttl::seconds(args.authority_ttl)),
    );
    let _sweeper = cache.spawn_sweeper(Duration::from_secs(args.sweep_interval));

    let options = ResolverOptions {
        always_own_authority: args.own_authority,
        repository: args.repository.as_deref().map(Identity::from),
    };
    let resolver = Arc::new(DelegationResolver::with_options(cache, options));

    let app = Router::new()
        .route("/api/v1/delegation", post(handle_delegation_query))
        .with_state(AppState { resolver });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "delegation query service listening on http://{} (upstream {})",
        listener.local_addr()?,
        args.upstream
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("delegation query service stopped");
    Ok(())
}

async fn handle_delegation_query(
    State(state): State<AppState>,
    Json(request): Json<DelegationRequest>,
) -> Response {
    match request {
        DelegationRequest::AllDelegators { identities } => {
            match state.resolver.all_delegators(&identities).await {
                Ok(closure) => Json(DelegationResponse::Chains {
                    chains: closure.value,
                    ttl: closure.ttl,
                })
                .into_response(),
                Err(err) => error_response(err),
            }
        }
        DelegationRequest::CheckDelegation {
            delegate,
            delegator,
        } => match state.resolver.check_delegator(&delegate, &delegator).await {
            Ok(verdict) => Json(DelegationResponse::Verdict {
                authorized: verdict.value,
                ttl: verdict.ttl,
            })
            .into_response(),
            Err(err) => error_response(err),
        },
    }
}

fn error_response(err: entrust::Error) -> Response {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_GATEWAY
    };
    tracing::warn!("delegation query failed: {err}");
    (
        status,
        Json(DelegationResponse::Error {
            message: err.to_string(),
        }),
    )
        .into_response()
}

async fn shutdown_signal() {
    let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = term.recv() => {},
    }
    tracing::info!("shutdown signal received");
}
