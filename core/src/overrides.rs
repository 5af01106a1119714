//! Curated substitution tables.
//!
//! Hand-authored respellings that bypass generation and scoring entirely,
//! a blacklist of substitutions that are never acceptable, and phrase-level
//! patterns applied by callers before tokenization. Curated entries are
//! listed best-first; the first entry is always the one selected so output
//! stays reproducible.

use ahash::AHashMap;
use once_cell::sync::Lazy;

static CURATED: Lazy<AHashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: AHashMap<&'static str, &'static [&'static str]> = AHashMap::new();
    m.insert("nice", &["ice", "gneiss"][..]);
    m.insert("it", &["tit"][..]);
    m.insert("be", &["bee", "bean"][..]);
    m.insert("see", &["sea"][..]);
    m.insert("read", &["reed"][..]);
    m.insert("red", &["read"][..]);
    m.insert("eye", &["i", "aye"][..]);
    m.insert("please", &["pleas"][..]);
    m.insert("mister", &["missed her"][..]);
    m.insert("dunno", &["dough no"][..]);
    m.insert("wouldn't", &["wooden"][..]);
    m.insert("beginning", &["big inning"][..]);
    m
});

static BLACKLIST: Lazy<AHashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: AHashMap<&'static str, &'static [&'static str]> = AHashMap::new();
    m.insert("st", &["street"][..]);
    m
});

/// Phrase-level overrides, applied to raw text before tokenization.
/// Patterns are regex sources; callers compile them case-insensitively.
pub const PHRASES: &[(&str, &str)] = &[
    (r"\bwouldn't it\b", "wooden tit"),
    (r"\bit be\b", "eat bee"),
];

/// Curated respellings for a normalized word, best first.
pub fn curated(word: &str) -> Option<&'static [&'static str]> {
    CURATED.get(word).copied()
}

/// Whether `respelling` is banned as a substitution for `word`.
pub fn is_banned(word: &str, respelling: &str) -> bool {
    BLACKLIST
        .get(word)
        .is_some_and(|banned| banned.contains(&respelling))
}
