//! Candidate data model: discovery sources and proposed respellings.

use serde::{Deserialize, Serialize};

/// Where a candidate (or a persisted link) came from.
///
/// Declaration order doubles as tie-break priority: an `Override` beats a
/// `Cmu` match at equal score, and so on down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Override,
    Cmu,
    Datamuse,
    Syllable,
    Multiword,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Override,
        Source::Cmu,
        Source::Datamuse,
        Source::Syllable,
        Source::Multiword,
    ];

    /// Tie-break rank; lower wins.
    pub fn priority(self) -> u8 {
        match self {
            Source::Override => 0,
            Source::Cmu => 1,
            Source::Datamuse => 2,
            Source::Syllable => 3,
            Source::Multiword => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Source::Override => "override",
            Source::Cmu => "cmu",
            Source::Datamuse => "datamuse",
            Source::Syllable => "syllable",
            Source::Multiword => "multiword",
        }
    }

    fn bit(self) -> u8 {
        1 << self.priority()
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of sources that have justified a link.
///
/// Stored as a bitmask so the graph store can persist it in a single byte.
/// The set only ever grows; there is no removal operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet(u8);

impl SourceSet {
    pub fn new() -> Self {
        SourceSet(0)
    }

    pub fn single(source: Source) -> Self {
        SourceSet(source.bit())
    }

    pub fn insert(&mut self, source: Source) {
        self.0 |= source.bit();
    }

    pub fn contains(self, source: Source) -> bool {
        self.0 & source.bit() != 0
    }

    /// Union with another set; the merge direction never loses a source.
    pub fn merge(self, other: SourceSet) -> SourceSet {
        SourceSet(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Source> {
        Source::ALL.into_iter().filter(move |s| self.contains(*s))
    }

    /// Raw bitmask for persistence.
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        SourceSet(bits & 0b0001_1111)
    }
}

impl std::fmt::Display for SourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for s in self.iter() {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(s.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// A proposed replacement for one input word.
///
/// `words` holds one entry for whole-word and syllable substitutions and two
/// for two-word splits. `phonetic` is the generator's similarity measure in
/// [0, 1] (1.0 for exact matches); the scorer combines it with orthographic,
/// frequency, and length terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub words: Vec<String>,
    pub source: Source,
    pub phonetic: f64,
}

impl Candidate {
    pub fn new(words: Vec<String>, source: Source, phonetic: f64) -> Self {
        Candidate {
            words,
            source,
            phonetic,
        }
    }

    /// Single-word convenience constructor.
    pub fn word<T: Into<String>>(word: T, source: Source, phonetic: f64) -> Self {
        Candidate::new(vec![word.into()], source, phonetic)
    }

    /// A candidate's spelling splits on spaces; multiword candidates are
    /// stored in the graph as one node whose key contains the joining space.
    pub fn from_spelling(spelling: &str, source: Source, phonetic: f64) -> Self {
        Candidate::new(
            spelling.split(' ').map(str::to_string).collect(),
            source,
            phonetic,
        )
    }

    /// Concatenated surface form ("per pill").
    pub fn spelling(&self) -> String {
        self.words.join(" ")
    }
}
