//! homofo-core
//!
//! Candidate generation, scoring, and tiered caching for homophonic
//! respelling. The pipeline takes a normalized word, gathers sound-alike
//! replacement candidates from several sources (curated overrides, exact
//! phonetic matches, an approximate sound-alike service, syllable and
//! two-word splits), ranks them with a weighted score, and remembers every
//! discovered pairing in a persistent relationship graph so later runs get
//! cheaper and richer.
//!
//! Public API:
//! - `Engine` - Per-word selection pipeline with LRU + graph caching
//! - `Candidate` / `Source` / `SourceSet` - Candidate data model
//! - `CmuLexicon` - CMU-format phonetic dictionary with reverse indexes
//! - `GraphStore` - Persistent word/link graph (redb, in-memory fallback)
//! - `Datamuse` - Sound-alike and frequency oracle over HTTP
//! - `Config` - Behavior flags and scoring weights

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

pub mod candidate;
pub use candidate::{Candidate, Source, SourceSet};

pub mod lexicon;
pub use lexicon::CmuLexicon;

pub mod oracle;
pub use oracle::{
    Datamuse, FrequencyOracle, OracleError, PhoneticOracle, SoundAlikeOracle, TableFrequency,
    TableSoundAlike,
};

pub mod graph;
pub use graph::GraphStore;

pub mod cache;
pub use cache::SelectionCache;

pub mod overrides;

pub mod score;
pub use score::Scored;

pub mod generate;
pub use generate::Strategy;

pub mod engine;
pub use engine::Engine;

/// Processing mode: substitute whole words, or respell syllable by syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Word,
    Syllable,
}

/// Behavior flags and scoring weights for the selection pipeline.
///
/// Serializable to TOML for config files; every field that influences which
/// candidates are generated or how they are ranked participates in
/// [`Config::fingerprint`], which scopes recency-cache keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Processing mode (`word` or `syllable`).
    pub mode: Mode,
    /// Enable two-word splits (e.g. "mister" -> "missed her").
    pub multiword: bool,
    /// Use only exact phonetic matches; never consult the sound-alike service.
    pub strict_only: bool,
    /// Consult the sound-alike service only when no exact match exists.
    pub strict_first: bool,
    /// Reward longer respellings via the length term.
    pub prefer_longer: bool,

    /// Weight for phonetic similarity.
    pub alpha: f64,
    /// Weight for orthographic (spelling) similarity.
    pub beta: f64,
    /// Weight for word frequency.
    pub gamma: f64,
    /// Weight for candidate length.
    pub length_weight: f64,
    /// Minimum Zipf frequency for a candidate to count as a real word.
    pub min_zipf: f64,

    /// Recency-cache capacity in entries; 0 disables the cache.
    pub cache_capacity: usize,
    /// Cap on results requested from the sound-alike service per word.
    pub max_sound_alike: usize,
    /// Per-request timeout for network oracles, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Word,
            multiword: false,
            strict_only: false,
            strict_first: false,
            prefer_longer: false,
            alpha: 1.0,
            beta: 0.5,
            gamma: 0.2,
            length_weight: 0.0,
            min_zipf: 2.0,
            cache_capacity: 2048,
            max_sound_alike: 20,
            timeout_ms: 500,
        }
    }
}

/// Configuration rejected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("scoring weight `{0}` must be finite")]
    NonFiniteWeight(&'static str),
    #[error("max_sound_alike must be at least 1")]
    ZeroSoundAlikeLimit,
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Validate the configuration. Invalid settings are fatal at startup;
    /// everything after construction degrades per-word instead of failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("length_weight", self.length_weight),
            ("min_zipf", self.min_zipf),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NonFiniteWeight(name));
            }
        }
        if self.max_sound_alike == 0 {
            return Err(ConfigError::ZeroSoundAlikeLimit);
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Stable digest of every field that affects candidate generation or
    /// ranking. Two configs with the same fingerprint must select the same
    /// candidate for the same word, so the fingerprint scopes cache keys.
    pub fn fingerprint(&self) -> u64 {
        let mut h = std::collections::hash_map::DefaultHasher::new();
        self.mode.hash(&mut h);
        (
            self.multiword,
            self.strict_only,
            self.strict_first,
            self.prefer_longer,
        )
            .hash(&mut h);
        for w in [
            self.alpha,
            self.beta,
            self.gamma,
            self.length_weight,
            self.min_zipf,
        ] {
            w.to_bits().hash(&mut h);
        }
        self.max_sound_alike.hash(&mut h);
        h.finish()
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize a word token into its lexical key: NFC, case-folded, with
    /// leading and trailing punctuation stripped. Interior apostrophes
    /// ("wouldn't") survive.
    pub fn normalize(token: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        token
            .nfc()
            .collect::<String>()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase()
    }
}
