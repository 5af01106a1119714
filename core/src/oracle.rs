//! Oracle contracts and the Datamuse-backed implementations.
//!
//! The pipeline depends on three query contracts, not on provider internals:
//! a phonetic lexicon (exact pronunciations), a sound-alike service
//! (approximate phonetic neighbors), and a word-frequency source. All three
//! are fallible: a miss is `UnknownWord`, a network problem is `Unavailable`.
//! Callers degrade to empty results on failure; nothing here is fatal.
//!
//! Uses `reqwest` blocking client for simplicity - no async runtime needed.

use ahash::AHashMap;
use serde::Deserialize;
use std::time::Duration;

/// Why an oracle query produced no answer.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The provider has no entry for this word.
    #[error("unknown word: {0}")]
    UnknownWord(String),
    /// The provider could not be reached (network failure, timeout).
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

pub type OracleResult<T> = Result<T, OracleError>;

/// Exact-pronunciation queries against a phonetic dictionary.
pub trait PhoneticOracle {
    /// Primary phoneme sequence for a word.
    fn phones(&self, word: &str) -> OracleResult<Vec<String>>;
    /// Words sharing the word's primary phoneme sequence, excluding itself.
    fn homophones(&self, word: &str) -> OracleResult<Vec<String>>;
    /// Words pronounced exactly as the given phoneme sequence.
    fn words_by_phones(&self, phones: &[String]) -> Vec<String>;
    /// Words whose pronunciation matches after collapsing vowels and stress.
    fn near_words_by_phones(&self, phones: &[String]) -> Vec<String>;
    /// Phoneme-derived syllable groups, one vowel per group.
    fn syllables(&self, word: &str) -> OracleResult<Vec<Vec<String>>>;
}

/// Approximate phonetic neighbors, best first.
pub trait SoundAlikeOracle {
    fn sounds_like(&self, word: &str, limit: usize) -> OracleResult<Vec<String>>;
}

/// Word commonness on the Zipf scale (log10 of occurrences per billion).
pub trait FrequencyOracle {
    fn zipf(&self, word: &str) -> OracleResult<f64>;
}

impl<T: PhoneticOracle + ?Sized> PhoneticOracle for Box<T> {
    fn phones(&self, word: &str) -> OracleResult<Vec<String>> {
        (**self).phones(word)
    }
    fn homophones(&self, word: &str) -> OracleResult<Vec<String>> {
        (**self).homophones(word)
    }
    fn words_by_phones(&self, phones: &[String]) -> Vec<String> {
        (**self).words_by_phones(phones)
    }
    fn near_words_by_phones(&self, phones: &[String]) -> Vec<String> {
        (**self).near_words_by_phones(phones)
    }
    fn syllables(&self, word: &str) -> OracleResult<Vec<Vec<String>>> {
        (**self).syllables(word)
    }
}

impl<T: SoundAlikeOracle + ?Sized> SoundAlikeOracle for Box<T> {
    fn sounds_like(&self, word: &str, limit: usize) -> OracleResult<Vec<String>> {
        (**self).sounds_like(word, limit)
    }
}

impl<T: FrequencyOracle + ?Sized> FrequencyOracle for Box<T> {
    fn zipf(&self, word: &str) -> OracleResult<f64> {
        (**self).zipf(word)
    }
}

const DATAMUSE_URL: &str = "https://api.datamuse.com/words";

#[derive(Debug, Deserialize)]
struct DatamuseEntry {
    word: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Datamuse client: `?sl=` for sound-alikes, `md=f` metadata for frequency.
///
/// Blocking calls with a per-request timeout; any failure degrades to an
/// `Unavailable` error that callers treat as an empty result.
pub struct Datamuse {
    timeout_ms: u64,
}

impl Datamuse {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    fn get(&self, query: &str) -> OracleResult<Vec<DatamuseEntry>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        let url = format!("{DATAMUSE_URL}?{query}");
        let response = client
            .get(&url)
            .send()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        let text = response
            .text()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| OracleError::Unavailable(e.to_string()))
    }
}

impl Default for Datamuse {
    fn default() -> Self {
        Self::new(500)
    }
}

impl SoundAlikeOracle for Datamuse {
    fn sounds_like(&self, word: &str, limit: usize) -> OracleResult<Vec<String>> {
        if word.is_empty() {
            return Ok(vec![]);
        }
        let entries = self.get(&format!(
            "sl={}&max={}",
            urlencoding::encode(word),
            limit
        ))?;
        Ok(entries
            .into_iter()
            .map(|e| e.word)
            .filter(|w| !w.is_empty())
            .collect())
    }
}

impl FrequencyOracle for Datamuse {
    fn zipf(&self, word: &str) -> OracleResult<f64> {
        let entries = self.get(&format!(
            "sp={}&qe=sp&md=f&max=1",
            urlencoding::encode(word)
        ))?;
        entries
            .iter()
            .flat_map(|e| e.tags.iter())
            .find_map(|tag| parse_frequency_tag(tag))
            .ok_or_else(|| OracleError::UnknownWord(word.to_string()))
    }
}

/// Parse a Datamuse `f:<per-million>` tag into a Zipf value.
fn parse_frequency_tag(tag: &str) -> Option<f64> {
    let per_million: f64 = tag.strip_prefix("f:")?.parse().ok()?;
    if per_million <= 0.0 {
        return None;
    }
    // Zipf is log10 of occurrences per billion words.
    Some(per_million.log10() + 3.0)
}

/// Fixed sound-alike table for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct TableSoundAlike {
    map: AHashMap<String, Vec<String>>,
}

impl TableSoundAlike {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<W: Into<String>>(&mut self, word: W, neighbors: &[&str]) {
        self.map
            .insert(word.into(), neighbors.iter().map(|s| s.to_string()).collect());
    }
}

impl SoundAlikeOracle for TableSoundAlike {
    fn sounds_like(&self, word: &str, limit: usize) -> OracleResult<Vec<String>> {
        let mut out = self.map.get(word).cloned().unwrap_or_default();
        out.truncate(limit);
        Ok(out)
    }
}

/// Fixed Zipf table for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct TableFrequency {
    map: AHashMap<String, f64>,
}

impl TableFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<W: Into<String>>(&mut self, word: W, zipf: f64) {
        self.map.insert(word.into(), zipf);
    }

    /// Plausible frequencies for every word in the demo lexicon.
    pub fn demo() -> Self {
        let mut t = Self::new();
        for (word, zipf) in [
            ("see", 5.9),
            ("sea", 5.1),
            ("c", 4.9),
            ("be", 6.4),
            ("bee", 3.9),
            ("bean", 3.8),
            ("purple", 4.3),
            ("per", 5.3),
            ("pill", 4.0),
            ("pull", 4.7),
            ("beginning", 5.0),
            ("big", 5.8),
            ("inning", 3.6),
            ("night", 5.8),
            ("knight", 3.9),
            ("read", 5.5),
            ("reed", 3.4),
            ("red", 5.2),
            ("eye", 5.2),
            ("i", 7.0),
            ("aye", 3.3),
            ("please", 5.7),
            ("pleas", 2.8),
            ("mister", 4.3),
            ("missed", 4.8),
            ("her", 6.5),
            ("wooden", 4.0),
            ("wouldn't", 5.2),
        ] {
            t.insert(word, zipf);
        }
        t
    }
}

impl FrequencyOracle for TableFrequency {
    fn zipf(&self, word: &str) -> OracleResult<f64> {
        self.map
            .get(word)
            .copied()
            .ok_or_else(|| OracleError::UnknownWord(word.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_tag_parses_to_zipf() {
        // "the" is around 50k per million: zipf ~ 7.7
        let z = parse_frequency_tag("f:50714.6").unwrap();
        assert!((z - 7.7).abs() < 0.01);
        assert!(parse_frequency_tag("f:0").is_none());
        assert!(parse_frequency_tag("n").is_none());
    }

    #[test]
    fn table_sound_alike_respects_limit() {
        let mut t = TableSoundAlike::new();
        t.insert("see", &["sea", "si", "saw", "say"]);
        let got = t.sounds_like("see", 2).unwrap();
        assert_eq!(got, vec!["sea", "si"]);
        assert!(t.sounds_like("unknown", 5).unwrap().is_empty());
    }

    #[test]
    fn table_frequency_misses_are_unknown() {
        let t = TableFrequency::demo();
        assert!(t.zipf("purple").unwrap() > 4.0);
        assert!(matches!(
            t.zipf("qqq"),
            Err(OracleError::UnknownWord(_))
        ));
    }
}
