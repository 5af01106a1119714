//! Selection engine.
//!
//! Orchestrates the full per-word pipeline:
//! 1. Normalize the token and check the recency cache
//! 2. Curated override short-circuit
//! 3. Run the active generation strategies in source-priority order
//! 4. Deduplicate across strategies, filter, score, pick the winner
//! 5. Write through to the recency cache (the graph was updated during
//!    generation) and return
//!
//! Words are independent units of work; `resolve_all` fans them out over a
//! rayon worker pool and reassembles results in input order.

use rayon::prelude::*;
use std::sync::Arc;

use crate::cache::SelectionCache;
use crate::candidate::{Candidate, Source};
use crate::generate::{GenContext, Strategy};
use crate::graph::GraphStore;
use crate::oracle::{FrequencyOracle, PhoneticOracle, SoundAlikeOracle};
use crate::score::{self, Scored};
use crate::{overrides, utils, Config, ConfigError};

/// Per-word homophone selection with tiered caching.
pub struct Engine {
    phonetic: Box<dyn PhoneticOracle + Send + Sync>,
    sound_alike: Box<dyn SoundAlikeOracle + Send + Sync>,
    frequency: Box<dyn FrequencyOracle + Send + Sync>,
    graph: Arc<GraphStore>,
    cache: SelectionCache,
    config: Config,
    fingerprint: u64,
}

impl Engine {
    /// Build an engine. The configuration is validated here; a bad config is
    /// the only fatal error in the pipeline.
    pub fn new(
        phonetic: impl PhoneticOracle + Send + Sync + 'static,
        sound_alike: impl SoundAlikeOracle + Send + Sync + 'static,
        frequency: impl FrequencyOracle + Send + Sync + 'static,
        graph: Arc<GraphStore>,
        config: Config,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache = SelectionCache::with_capacity(config.cache_capacity);
        let fingerprint = config.fingerprint();
        Ok(Self {
            phonetic: Box::new(phonetic),
            sound_alike: Box::new(sound_alike),
            frequency: Box::new(frequency),
            graph,
            cache,
            config,
            fingerprint,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// (hits, misses) for the recency cache.
    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }

    /// Resolve one token. `None` means no acceptable replacement was found
    /// and the caller should pass the original through unchanged.
    pub fn resolve(&self, token: &str) -> Option<Candidate> {
        let word = utils::normalize(token);
        if word.is_empty() {
            return None;
        }
        let key = (word.clone(), self.fingerprint);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }
        let selection = self.ranked(&word).into_iter().next().map(|s| s.candidate);
        self.cache.put(key, selection.clone());
        selection
    }

    /// Resolve many tokens in parallel; the output order matches the input
    /// order regardless of completion order.
    pub fn resolve_all(&self, tokens: &[String]) -> Vec<Option<Candidate>> {
        tokens.par_iter().map(|t| self.resolve(t)).collect()
    }

    /// Scored candidate set for a word, best first, bypassing the recency
    /// cache. Useful for inspection and tests; `resolve` picks the head.
    pub fn candidates_for(&self, token: &str) -> Vec<Scored> {
        let word = utils::normalize(token);
        if word.is_empty() {
            return Vec::new();
        }
        self.ranked(&word)
    }

    fn ranked(&self, word: &str) -> Vec<Scored> {
        // Curated overrides are authoritative: no generation, maximal score.
        if let Some(entries) = overrides::curated(word) {
            for entry in entries {
                self.graph.upsert_link(word, entry, Source::Override);
            }
            return vec![Scored {
                candidate: Candidate::from_spelling(entries[0], Source::Override, 1.0),
                score: f64::INFINITY,
            }];
        }

        let ctx = GenContext {
            phonetic: self.phonetic.as_ref(),
            sound_alike: self.sound_alike.as_ref(),
            frequency: self.frequency.as_ref(),
            graph: &self.graph,
            config: &self.config,
        };

        let exact = Strategy::Exact.generate(&ctx, word);
        let mut pool = exact;
        for strategy in [
            Strategy::SoundAlike,
            Strategy::SyllableSplit,
            Strategy::TwoWordSplit,
        ] {
            if !strategy.enabled(&self.config) {
                continue;
            }
            // strict_first: the sound-alike service is a fallback, consulted
            // only when no exact match exists.
            if strategy == Strategy::SoundAlike
                && self.config.strict_first
                && !pool.is_empty()
            {
                continue;
            }
            pool.extend(strategy.generate(&ctx, word));
        }

        // Deduplicate across strategies; the first occurrence wins, and the
        // pool is already in source-priority order.
        let mut seen = ahash::AHashSet::new();
        pool.retain(|c| seen.insert(c.spelling()));

        let mut zipf_of = |w: &str| self.graph.frequency(w, self.frequency.as_ref());
        score::rank(word, pool, &self.config, &mut zipf_of)
    }
}
