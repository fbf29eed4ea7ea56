//! JSON-over-HTTP delegation lookup client.
//!
//! Talks to a remote delegation service exposing three endpoints:
//!
//! * `GET {base}/authority/{identity}`: authority discovery; the response
//!   carries either the authority identity or an alias to chase.
//! * `GET {base}/delegators/{delegate}?authority=..`: direct delegator listing.
//! * `GET {base}/check?delegate=..&delegator=..&authority=..`: direct
//!   delegation check.
//!
//! A `repository` query parameter is appended to every request when the caller
//! supplies a repository hint. HTTP 404 maps to `LookupError::NotFound`; other
//! failures are transport errors and propagate unretried.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{DelegationLookup, LookupError, MAX_ALIAS_HOPS};
use crate::identity::Identity;
use crate::ttl::{Ttl, WithTtl};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpLookupConfig {
    /// User-Agent header for requests
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpLookupConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("entrust/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Delegation lookup over a remote JSON/HTTP service.
#[derive(Debug, Clone)]
pub struct HttpLookup {
    base: Url,
    client: reqwest::Client,
}

/// Authority discovery answer: exactly one of the fields is expected.
#[derive(Debug, Deserialize)]
struct AuthorityResponse {
    authority: Option<Identity>,
    alias: Option<Identity>,
}

#[derive(Debug, Deserialize)]
struct DelegatorsResponse {
    delegators: Vec<Identity>,
    ttl: u64,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    authorized: bool,
    ttl: u64,
}

impl HttpLookup {
    /// Creates a client for the service at `base` with default configuration.
    pub fn new(base: Url) -> std::result::Result<Self, LookupError> {
        Self::with_config(base, HttpLookupConfig::default())
    }

    /// Creates a client with explicit configuration.
    pub fn with_config(
        base: Url,
        config: HttpLookupConfig,
    ) -> std::result::Result<Self, LookupError> {
        if base.cannot_be_a_base() {
            return Err(LookupError::transport(
                "lookup endpoint URL cannot carry path segments",
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| LookupError::Transport {
                reason: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { base, client })
    }

    /// The service base URL this client queries.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("base checked at construction")
            .pop_if_empty()
            .extend(segments);
        url
    }

    fn authority_url(&self, identity: &Identity, repository: Option<&Identity>) -> Url {
        let mut url = self.endpoint(&["authority", identity.as_str()]);
        if let Some(repository) = repository {
            url.query_pairs_mut()
                .append_pair("repository", repository.as_str());
        }
        url
    }

    fn delegators_url(
        &self,
        delegate: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> Url {
        let mut url = self.endpoint(&["delegators", delegate.as_str()]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("authority", authority.as_str());
            if let Some(repository) = repository {
                pairs.append_pair("repository", repository.as_str());
            }
        }
        url
    }

    fn check_url(
        &self,
        delegate: &Identity,
        delegator: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> Url {
        let mut url = self.endpoint(&["check"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("delegate", delegate.as_str());
            pairs.append_pair("delegator", delegator.as_str());
            pairs.append_pair("authority", authority.as_str());
            if let Some(repository) = repository {
                pairs.append_pair("repository", repository.as_str());
            }
        }
        url
    }

    /// Issues a GET and decodes the JSON body.
    ///
    /// `subject` names the identity the request is about, for 404 mapping.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        subject: &Identity,
    ) -> std::result::Result<T, LookupError> {
        debug!(%url, "delegation lookup request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LookupError::Transport {
                reason: format!("request to {url} failed"),
                source: Some(Box::new(e)),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LookupError::not_found(subject.clone()));
        }
        if !response.status().is_success() {
            return Err(LookupError::transport(format!(
                "lookup service returned {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LookupError::MalformedResponse {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl DelegationLookup for HttpLookup {
    async fn resolve_delegation_authority(
        &self,
        identity: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<Identity, LookupError> {
        let mut visited: HashSet<Identity> = HashSet::new();
        let mut current = identity.clone();
        let mut hops = 0;
        loop {
            let url = self.authority_url(&current, repository);
            let answer: AuthorityResponse = self.get_json(url, &current).await?;
            match (answer.authority, answer.alias) {
                (Some(authority), _) => return Ok(authority),
                (None, Some(alias)) => {
                    hops += 1;
                    if hops > MAX_ALIAS_HOPS || !visited.insert(current.clone()) {
                        return Err(LookupError::AliasLoop {
                            identity: identity.clone(),
                            hops,
                        });
                    }
                    debug!(%current, %alias, "following delegation authority alias");
                    current = alias;
                }
                (None, None) => {
                    return Err(LookupError::MalformedResponse {
                        reason: format!(
                            "authority answer for {current} carries neither authority nor alias"
                        ),
                    });
                }
            }
        }
    }

    async fn check_delegation(
        &self,
        delegate: &Identity,
        delegator: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<bool>, LookupError> {
        let url = self.check_url(delegate, delegator, authority, repository);
        let answer: CheckResponse = self.get_json(url, delegate).await?;
        Ok(WithTtl::new(answer.authorized, Ttl::seconds(answer.ttl)))
    }

    async fn list_direct_delegators(
        &self,
        delegate: &Identity,
        authority: &Identity,
        repository: Option<&Identity>,
    ) -> std::result::Result<WithTtl<Vec<Identity>>, LookupError> {
        let url = self.delegators_url(delegate, authority, repository);
        let answer: DelegatorsResponse = self.get_json(url, delegate).await?;
        Ok(WithTtl::new(answer.delegators, Ttl::seconds(answer.ttl)))
    }
}
