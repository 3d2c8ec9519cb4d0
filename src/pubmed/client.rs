use std::num::NonZeroU32;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::limiter::RateLimiter;
use super::parse::parse_esearch;
use super::types::QueryResult;

const API_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
/// Largest `retmax` ESearch will honor in one call.
pub const MAX_RESULTS: u32 = 9999;
/// NCBI allows 10 req/s with an API key and 3 req/s without.
const KEYED_RATE: NonZeroU32 = NonZeroU32::new(10).unwrap();
const ANONYMOUS_RATE: NonZeroU32 = NonZeroU32::new(3).unwrap();

#[derive(Debug, thiserror::Error)]
pub enum PubMedError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("ESearch request failed (HTTP {status}): {url}")]
    RequestFailed { status: u16, url: String },

    #[error("malformed ESearch response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Keyword search against a bibliographic database.
/// Implemented by `PubMedClient` for production; mock implementations used in tests.
pub trait SearchClient {
    async fn query(&mut self, term: &str, max_results: u32) -> Result<QueryResult, PubMedError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for the NCBI E-utilities ESearch endpoint (`db=pubmed`).
///
/// Each instance owns its own [`RateLimiter`], so two clients never throttle
/// each other.
#[derive(Debug)]
pub struct PubMedClient {
    http: Client,
    api_key: Option<ApiKey>,
    limiter: RateLimiter,
    base_url: String,
}

impl PubMedClient {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self::build(http, api_key, API_BASE)
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str, api_key: Option<&str>) -> Self {
        Self::build(http, api_key.map(String::from), base_url)
    }

    fn build(http: Client, api_key: Option<String>, base_url: &str) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey);
        let rate = if api_key.is_some() {
            KEYED_RATE
        } else {
            ANONYMOUS_RATE
        };
        Self {
            http,
            api_key,
            limiter: RateLimiter::per_second(rate),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn request_url(&self, term: &str, max_results: u32) -> Result<Url, PubMedError> {
        let retmax = max_results.to_string();
        let mut params = vec![
            ("db", "pubmed"),
            ("term", term),
            ("retmax", retmax.as_str()),
            ("retmode", "json"),
        ];
        if let Some(ApiKey(key)) = &self.api_key {
            params.push(("api_key", key.as_str()));
        }
        Url::parse_with_params(&format!("{}/esearch.fcgi", self.base_url), &params)
            .map_err(|e| PubMedError::InvalidArgument(format!("bad endpoint URL: {e}")))
    }
}

impl SearchClient for PubMedClient {
    async fn query(&mut self, term: &str, max_results: u32) -> Result<QueryResult, PubMedError> {
        if max_results > MAX_RESULTS {
            return Err(PubMedError::InvalidArgument(format!(
                "max_results cannot be larger than {MAX_RESULTS} (got {max_results})"
            )));
        }

        let url = self.request_url(term, max_results)?;

        debug_assert!(
            url.scheme() == "https" || self.api_key.is_none() || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        self.limiter.wait().await;
        debug!(url = %redact_key(&url), "esearch request");

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await
            .map_err(|e| PubMedError::Network(e.without_url()))?;

        let status = response.status();
        let sent = response.url().clone();
        if !status.is_success() {
            let url = redact_key(&sent);
            warn!(status = %status, %url, "ESearch request failed");
            return Err(PubMedError::RequestFailed {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PubMedError::Network(e.without_url()))?;
        parse_esearch(&body, term, sent.as_str())
    }
}

/// Drop `api_key` from a URL so it can be logged or carried in an error.
fn redact_key(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api_key") {
        return url.to_string();
    }
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "api_key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut clean = url.clone();
    clean.query_pairs_mut().clear().extend_pairs(kept);
    clean.to_string()
}
