//! Genre lookup from artist terms
//!
//! Populator that fills an empty genre from the first artist's high-weight terms.
//! Every outbound lookup goes through one shared [`RateLimiter`]. Term lists are
//! cached per artist, so the service is queried once per distinct artist rather
//! than once per file. Concurrent callers asking for the same artist wait on the
//! one lookup in flight. Failed lookups are not cached.

use super::genre_case::normalize;
use super::rate_limiter::RateLimiter;
use crate::error::{TagError, TagResult, TermSourceError};
use crate::types::{Populator, Record, Term, TermSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Terms weighted below this are not used as genres
pub const DEFAULT_MIN_TERM_WEIGHT: f64 = 0.5;

/// Applies artist term information as genre
pub struct TermFetcher {
    source: Arc<dyn TermSource>,
    rate_limiter: Arc<RateLimiter>,
    min_weight: f64,
    cache: Mutex<HashMap<String, Arc<OnceCell<Vec<Term>>>>>,
}

impl TermFetcher {
    pub fn new(source: Arc<dyn TermSource>, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            source,
            rate_limiter,
            min_weight: DEFAULT_MIN_TERM_WEIGHT,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_min_weight(mut self, min_weight: f64) -> Self {
        self.min_weight = min_weight;
        self
    }

    /// Terms for `artist`, from cache or a rate-limited lookup
    async fn terms_for(&self, artist: &str) -> Result<Vec<Term>, TermSourceError> {
        let artist = artist.trim();
        let entry = {
            let mut cache = self.cache.lock().await;
            Arc::clone(cache.entry(artist.to_lowercase()).or_default())
        };

        if let Some(terms) = entry.get() {
            debug!(artist = %artist, "Term cache hit");
            return Ok(terms.clone());
        }

        // Only one caller per artist runs the lookup; the rest wait for its result
        let terms = entry
            .get_or_try_init(|| self.rate_limiter.call(|| self.source.artist_terms(artist)))
            .await?;

        Ok(terms.clone())
    }
}

/// Names of terms at or above `min_weight`, normalized, in service order
pub fn genres_from_terms(terms: &[Term], min_weight: f64) -> Vec<String> {
    terms
        .iter()
        .filter(|term| term.weight >= min_weight)
        .map(|term| normalize(&term.name))
        .filter(|genre| !genre.is_empty())
        .collect()
}

#[async_trait]
impl Populator for TermFetcher {
    fn name(&self) -> &'static str {
        "EchoNestTerms"
    }

    async fn populate(&self, record: &mut Record) -> TagResult<()> {
        if !record.genre.is_empty() {
            debug!(file = %record.path().display(), "Genre already set, skipping term lookup");
            return Ok(());
        }

        let Some(artist) = record
            .artist
            .first()
            .filter(|artist| !artist.trim().is_empty())
            .cloned()
        else {
            debug!(file = %record.path().display(), "No artist, skipping term lookup");
            return Ok(());
        };

        let terms = self
            .terms_for(&artist)
            .await
            .map_err(|source| TagError::Lookup {
                artist: artist.clone(),
                source,
            })?;

        record.genre = genres_from_terms(&terms, self.min_weight);
        Ok(())
    }
}
