//! CMU-style phonetic lexicon.
//!
//! Maps words to phoneme sequences (ARPABET, stress-marked) and maintains two
//! reverse indexes:
//! - exact: joined phoneme sequence -> words pronounced exactly that way
//! - skeleton: stress-stripped, vowel-collapsed sequence -> words, used for
//!   approximate matching of split halves ("P AH0 L" and "P IH1 L" share the
//!   skeleton "P V L")
//!
//! The lexicon loads from a CMU-format dictionary file and can be compiled to
//! a bincode snapshot for fast startup. `load_demo` provides a small built-in
//! table for offline runs and tests.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

use crate::oracle::{OracleError, OracleResult, PhoneticOracle};

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize snapshot: {0}")]
    Snapshot(#[from] bincode::Error),
}

/// In-memory phonetic dictionary with forward and reverse indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmuLexicon {
    /// word -> pronunciations (first entry is primary)
    phones: AHashMap<String, Vec<Vec<String>>>,
    /// joined primary-or-variant phones -> words
    by_phones: AHashMap<String, Vec<String>>,
    /// vowel-collapsed skeleton -> words
    by_skeleton: AHashMap<String, Vec<String>>,
}

/// ARPABET vowel phones start with a vowel letter; consonants never do.
fn is_vowel(phone: &str) -> bool {
    matches!(phone.bytes().next(), Some(b'A' | b'E' | b'I' | b'O' | b'U'))
}

/// Strip the stress digit from a phone ("IH1" -> "IH").
fn strip_stress(phone: &str) -> &str {
    phone.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Collapse a phone sequence to its consonant skeleton ("P IH1 L" -> "P V L").
pub fn skeleton_key(phones: &[String]) -> String {
    phones
        .iter()
        .map(|p| if is_vowel(p) { "V" } else { strip_stress(p) })
        .collect::<Vec<_>>()
        .join(" ")
}

fn phones_key(phones: &[String]) -> String {
    phones.join(" ")
}

impl CmuLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pronunciation for a word. Later insertions for the same word
    /// become variant pronunciations; the first stays primary.
    pub fn insert(&mut self, word: &str, phones: &[&str]) {
        let word = word.to_lowercase();
        let seq: Vec<String> = phones.iter().map(|p| p.to_uppercase()).collect();

        let exact = self.by_phones.entry(phones_key(&seq)).or_default();
        if !exact.contains(&word) {
            exact.push(word.clone());
        }
        let near = self.by_skeleton.entry(skeleton_key(&seq)).or_default();
        if !near.contains(&word) {
            near.push(word.clone());
        }
        self.phones.entry(word).or_default().push(seq);
    }

    /// Parse a CMU-format dictionary file.
    ///
    /// Accepts both the classic `cmudict-0.7b` layout (`;;;` comments,
    /// `WORD(1)` variant markers) and the lowercase `cmudict.dict` layout
    /// with trailing `#` comments.
    pub fn from_cmudict_file<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let reader = BufReader::new(File::open(path)?);
        let mut lx = Self::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() || line.starts_with(";;;") {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(head) = parts.next() else { continue };
            // "word(1)" marks a variant pronunciation of "word"
            let word = head.split('(').next().unwrap_or(head);
            if !word.chars().any(|c| c.is_alphabetic()) {
                continue;
            }
            let phones: Vec<&str> = parts.collect();
            if !phones.is_empty() {
                lx.insert(word, &phones);
            }
        }
        Ok(lx)
    }

    /// Save a compiled snapshot with bincode.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), LexiconError> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a snapshot produced by `save_snapshot`.
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    /// Small built-in table for offline runs and smoke tests.
    pub fn load_demo() -> Self {
        let mut lx = Self::new();
        for (word, phones) in [
            ("see", "S IY1"),
            ("sea", "S IY1"),
            ("c", "S IY1"),
            ("be", "B IY1"),
            ("bee", "B IY1"),
            ("bean", "B IY1 N"),
            ("purple", "P ER1 P AH0 L"),
            ("per", "P ER1"),
            ("pill", "P IH1 L"),
            ("pull", "P UH1 L"),
            ("beginning", "B IH0 G IH1 N IH0 NG"),
            ("big", "B IH1 G"),
            ("inning", "IH1 N IH0 NG"),
            ("night", "N AY1 T"),
            ("knight", "N AY1 T"),
            ("read", "R IY1 D"),
            ("reed", "R IY1 D"),
            ("red", "R EH1 D"),
            ("eye", "AY1"),
            ("i", "AY1"),
            ("aye", "AY1"),
            ("please", "P L IY1 Z"),
            ("pleas", "P L IY1 Z"),
            ("mister", "M IH1 S T ER0"),
            ("missed", "M IH1 S T"),
            ("her", "HH ER1"),
            ("wooden", "W UH1 D AH0 N"),
            ("wouldn't", "W UH1 D AH0 N T"),
        ] {
            let seq: Vec<&str> = phones.split(' ').collect();
            lx.insert(word, &seq);
        }
        lx
    }

    /// Number of words in the lexicon.
    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    /// Primary pronunciation, if the word is known.
    pub fn primary_phones(&self, word: &str) -> Option<&[String]> {
        self.phones
            .get(word)
            .and_then(|v| v.first())
            .map(|v| v.as_slice())
    }
}

impl PhoneticOracle for CmuLexicon {
    fn phones(&self, word: &str) -> OracleResult<Vec<String>> {
        self.primary_phones(word)
            .map(|p| p.to_vec())
            .ok_or_else(|| OracleError::UnknownWord(word.to_string()))
    }

    fn homophones(&self, word: &str) -> OracleResult<Vec<String>> {
        let phones = self
            .primary_phones(word)
            .ok_or_else(|| OracleError::UnknownWord(word.to_string()))?;
        Ok(self
            .by_phones
            .get(&phones_key(phones))
            .map(|words| {
                words
                    .iter()
                    .filter(|w| w.as_str() != word)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn words_by_phones(&self, phones: &[String]) -> Vec<String> {
        self.by_phones
            .get(&phones_key(phones))
            .cloned()
            .unwrap_or_default()
    }

    fn near_words_by_phones(&self, phones: &[String]) -> Vec<String> {
        self.by_skeleton
            .get(&skeleton_key(phones))
            .cloned()
            .unwrap_or_default()
    }

    fn syllables(&self, word: &str) -> OracleResult<Vec<Vec<String>>> {
        let phones = self
            .primary_phones(word)
            .ok_or_else(|| OracleError::UnknownWord(word.to_string()))?;

        // Onset consonants attach to the following vowel; trailing consonants
        // join the last group.
        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for phone in phones {
            if is_vowel(phone) {
                pending.push(phone.clone());
                groups.push(std::mem::take(&mut pending));
            } else {
                pending.push(phone.clone());
            }
        }
        if !pending.is_empty() {
            match groups.last_mut() {
                Some(last) => last.extend(pending),
                None => return Err(OracleError::UnknownWord(word.to_string())),
            }
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homophones_share_primary_phones() {
        let lx = CmuLexicon::load_demo();
        let mut homs = lx.homophones("see").unwrap();
        homs.sort();
        assert_eq!(homs, vec!["c", "sea"]);
        assert!(lx.homophones("xylophone").is_err());
    }

    #[test]
    fn skeleton_collapses_vowels_and_stress() {
        let p: Vec<String> = ["P", "IH1", "L"].iter().map(|s| s.to_string()).collect();
        let q: Vec<String> = ["P", "AH0", "L"].iter().map(|s| s.to_string()).collect();
        assert_eq!(skeleton_key(&p), "P V L");
        assert_eq!(skeleton_key(&p), skeleton_key(&q));
    }

    #[test]
    fn near_lookup_matches_across_vowels() {
        let lx = CmuLexicon::load_demo();
        let half: Vec<String> = ["P", "AH0", "L"].iter().map(|s| s.to_string()).collect();
        let near = lx.near_words_by_phones(&half);
        assert!(near.contains(&"pill".to_string()));
        assert!(near.contains(&"pull".to_string()));
    }

    #[test]
    fn syllabification_groups_one_vowel_each() {
        let lx = CmuLexicon::load_demo();
        let syl = lx.syllables("beginning").unwrap();
        assert_eq!(syl.len(), 3);
        assert_eq!(syl[0], vec!["B", "IH0"]);
        assert_eq!(syl[1], vec!["G", "IH1"]);
        assert_eq!(syl[2], vec!["N", "IH0", "NG"]);
        // Trailing consonants fold into the final group
        let syl = lx.syllables("bean").unwrap();
        assert_eq!(syl, vec![vec!["B", "IY1", "N"]]);
    }

    #[test]
    fn variant_pronunciations_keep_first_primary() {
        let mut lx = CmuLexicon::new();
        lx.insert("read", &["R", "IY1", "D"]);
        lx.insert("read", &["R", "EH1", "D"]);
        assert_eq!(
            lx.primary_phones("read").unwrap(),
            &["R".to_string(), "IY1".to_string(), "D".to_string()]
        );
    }

    #[test]
    fn snapshot_roundtrip() {
        let tmp = std::env::temp_dir().join("homofo_lexicon_test.bin");
        let lx = CmuLexicon::load_demo();
        lx.save_snapshot(&tmp).unwrap();
        let loaded = CmuLexicon::load_snapshot(&tmp).unwrap();
        assert_eq!(loaded.len(), lx.len());
        assert_eq!(loaded.homophones("night").unwrap(), vec!["knight"]);
        let _ = std::fs::remove_file(tmp);
    }
}
