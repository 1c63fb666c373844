//! Echo Nest API client
//!
//! Fetches an artist's weighted descriptive terms from the `artist/terms`
//! endpoint. Terms come back sorted by descending weight.
//!
//! The client itself does not rate limit; [`TermFetcher`](super::TermFetcher)
//! owns the shared limiter.

use crate::error::TermSourceError;
use crate::types::{Term, TermSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("tagdog/", env!("CARGO_PKG_VERSION"));

/// Echo Nest status code for an exhausted request budget
const STATUS_RATE_LIMITED: i64 = 3;

#[derive(Debug, Deserialize)]
struct TermsEnvelope {
    response: TermsResponse,
}

#[derive(Debug, Deserialize)]
struct TermsResponse {
    status: ResponseStatus,
    #[serde(default)]
    terms: Vec<Term>,
}

#[derive(Debug, Deserialize)]
struct ResponseStatus {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Echo Nest API client
pub struct EchoNestClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl EchoNestClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TermSourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TermSourceError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Lookup terms for an artist by name
    pub async fn lookup_terms(&self, artist: &str) -> Result<Vec<Term>, TermSourceError> {
        let url = format!("{}/artist/terms", self.base_url);

        tracing::debug!(artist = %artist, url = %url, "Querying Echo Nest API");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("name", artist),
                ("sort", "weight"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| TermSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TermSourceError::RateLimitExceeded);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TermSourceError::NetworkError(e.to_string()))?;

        // Echo Nest reports API errors inside a JSON envelope even on 4xx
        match parse_terms_response(&body) {
            Err(TermSourceError::ParseError(_)) if !status.is_success() => {
                Err(TermSourceError::HttpError(status.as_u16(), body))
            }
            result => {
                let terms = result?;
                tracing::info!(
                    artist = %artist,
                    term_count = terms.len(),
                    "Retrieved terms from Echo Nest"
                );
                Ok(terms)
            }
        }
    }
}

#[async_trait]
impl TermSource for EchoNestClient {
    async fn artist_terms(&self, artist: &str) -> Result<Vec<Term>, TermSourceError> {
        self.lookup_terms(artist).await
    }
}

/// Decode an `artist/terms` response body
pub(crate) fn parse_terms_response(body: &str) -> Result<Vec<Term>, TermSourceError> {
    let envelope: TermsEnvelope =
        serde_json::from_str(body).map_err(|e| TermSourceError::ParseError(e.to_string()))?;
    let response = envelope.response;

    match response.status.code {
        0 => {}
        STATUS_RATE_LIMITED => return Err(TermSourceError::RateLimitExceeded),
        code => {
            return Err(TermSourceError::ApiError {
                code,
                message: response.status.message,
            })
        }
    }

    if let Some(bad) = response.terms.iter().find(|t| !(0.0..=1.0).contains(&t.weight)) {
        return Err(TermSourceError::ParseError(format!(
            "term '{}' has weight {} outside 0..=1",
            bad.name, bad.weight
        )));
    }

    Ok(response.terms)
}
