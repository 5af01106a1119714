//! Candidate generation strategies.
//!
//! Four strategies produce raw candidates for a word, each tagged with the
//! source it represents: exact phonetic matches, approximate sound-alikes,
//! syllable-by-syllable respelling, and two-word splits of the phoneme
//! sequence. Every strategy consults the relationship graph first (cheap, no
//! network) and writes newly discovered pairs back, so the graph accumulates
//! across words and runs. Oracle failures degrade to empty output.

use ahash::AHashSet;

use crate::candidate::{Candidate, Source};
use crate::graph::GraphStore;
use crate::oracle::{FrequencyOracle, PhoneticOracle, SoundAlikeOracle};
use crate::{score, Config, Mode};

/// At most this many words are considered per split half, best first.
const SPLIT_FANOUT: usize = 3;

/// Shared read context for generation.
pub struct GenContext<'a> {
    pub phonetic: &'a dyn PhoneticOracle,
    pub sound_alike: &'a dyn SoundAlikeOracle,
    pub frequency: &'a dyn FrequencyOracle,
    pub graph: &'a GraphStore,
    pub config: &'a Config,
}

/// A candidate generation strategy. Adding a discovery source means adding a
/// variant here, not a new type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Exact,
    SoundAlike,
    SyllableSplit,
    TwoWordSplit,
}

impl Strategy {
    pub fn source(self) -> Source {
        match self {
            Strategy::Exact => Source::Cmu,
            Strategy::SoundAlike => Source::Datamuse,
            Strategy::SyllableSplit => Source::Syllable,
            Strategy::TwoWordSplit => Source::Multiword,
        }
    }

    /// Whether this strategy runs under the given configuration.
    /// (`strict_first` gating additionally depends on the exact results and
    /// is applied by the selector.)
    pub fn enabled(self, cfg: &Config) -> bool {
        match self {
            Strategy::Exact => true,
            Strategy::SoundAlike => !cfg.strict_only,
            Strategy::SyllableSplit => cfg.mode == Mode::Syllable && !cfg.strict_only,
            Strategy::TwoWordSplit => cfg.multiword && !cfg.strict_only,
        }
    }

    /// Produce candidates for a normalized word.
    pub fn generate(self, ctx: &GenContext<'_>, word: &str) -> Vec<Candidate> {
        // Known neighbors first: anything this source discovered for this
        // word in any previous run (or earlier in this one).
        let known = from_graph(ctx, word, self.source());
        if !known.is_empty() {
            return known;
        }
        match self {
            Strategy::Exact => exact(ctx, word),
            Strategy::SoundAlike => sound_alike(ctx, word),
            Strategy::SyllableSplit => syllable_split(ctx, word),
            Strategy::TwoWordSplit => two_word_split(ctx, word),
        }
    }
}

fn exact(ctx: &GenContext<'_>, word: &str) -> Vec<Candidate> {
    let homophones = match ctx.phonetic.homophones(word) {
        Ok(h) => h,
        Err(_) => return Vec::new(),
    };
    homophones
        .into_iter()
        .map(|h| {
            ctx.graph.upsert_link(word, &h, Source::Cmu);
            Candidate::word(h, Source::Cmu, 1.0)
        })
        .collect()
}

fn sound_alike(ctx: &GenContext<'_>, word: &str) -> Vec<Candidate> {
    let ranked = match ctx
        .sound_alike
        .sounds_like(word, ctx.config.max_sound_alike)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(word, error = %e, "sound-alike oracle degraded to empty");
            return Vec::new();
        }
    };
    let input_phones = ctx.phonetic.phones(word).ok();
    ranked
        .into_iter()
        .filter(|w| w != word)
        .map(|w| {
            ctx.graph.upsert_link(word, &w, Source::Datamuse);
            let fallback = spelling_proxy(word, &w);
            let cand = Candidate::from_spelling(&w, Source::Datamuse, fallback);
            let phonetic = candidate_similarity(ctx, input_phones.as_deref(), &cand, fallback);
            Candidate { phonetic, ..cand }
        })
        .collect()
}

fn syllable_split(ctx: &GenContext<'_>, word: &str) -> Vec<Candidate> {
    let groups = match ctx.phonetic.syllables(word) {
        Ok(g) if g.len() >= 2 => g,
        // Unsegmentable (or monosyllabic) words yield nothing.
        _ => return Vec::new(),
    };

    let mut chosen: Vec<String> = Vec::with_capacity(groups.len());
    for group in &groups {
        match best_matches(ctx, group, word, 1).into_iter().next() {
            Some(w) => chosen.push(w),
            None => return Vec::new(),
        }
    }

    let spelling = chosen.join(" ");
    ctx.graph.upsert_link(word, &spelling, Source::Syllable);
    let input_phones = ctx.phonetic.phones(word).ok();
    let fallback = spelling_proxy(word, &spelling);
    let cand = Candidate::new(chosen, Source::Syllable, fallback);
    let phonetic = candidate_similarity(ctx, input_phones.as_deref(), &cand, fallback);
    vec![Candidate { phonetic, ..cand }]
}

fn two_word_split(ctx: &GenContext<'_>, word: &str) -> Vec<Candidate> {
    let phones = match ctx.phonetic.phones(word) {
        Ok(p) if p.len() >= 2 => p,
        _ => return Vec::new(),
    };
    let input_phones = Some(phones.as_slice());

    let mut seen: AHashSet<String> = AHashSet::new();
    let mut out = Vec::new();
    for split in 1..phones.len() {
        let (left, right) = phones.split_at(split);
        let lefts = best_matches(ctx, left, word, SPLIT_FANOUT);
        if lefts.is_empty() {
            continue;
        }
        let rights = best_matches(ctx, right, word, SPLIT_FANOUT);
        for lw in &lefts {
            for rw in &rights {
                let spelling = format!("{lw} {rw}");
                if !seen.insert(spelling.clone()) {
                    continue;
                }
                ctx.graph.upsert_link(word, &spelling, Source::Multiword);
                let fallback = spelling_proxy(word, &spelling);
                let cand = Candidate::new(
                    vec![lw.clone(), rw.clone()],
                    Source::Multiword,
                    fallback,
                );
                let phonetic = candidate_similarity(ctx, input_phones, &cand, fallback);
                out.push(Candidate { phonetic, ..cand });
            }
        }
    }
    out
}

/// Rebuild candidates from graph neighbors tagged with `source`.
fn from_graph(ctx: &GenContext<'_>, word: &str, source: Source) -> Vec<Candidate> {
    let input_phones = ctx.phonetic.phones(word).ok();
    ctx.graph
        .neighbors(word)
        .into_iter()
        .filter(|(_, sources)| sources.contains(source))
        .map(|(spelling, _)| {
            // Exact links are exact by construction; everything else gets its
            // similarity recomputed from pronunciations where possible.
            let fallback = if source == Source::Cmu {
                1.0
            } else {
                spelling_proxy(word, &spelling)
            };
            let cand = Candidate::from_spelling(&spelling, source, fallback);
            let phonetic = candidate_similarity(ctx, input_phones.as_deref(), &cand, fallback);
            Candidate { phonetic, ..cand }
        })
        .collect()
}

/// Known words pronounced as `phones` (exactly, else by vowel-collapsed
/// skeleton), ranked by frequency then spelling, truncated to `limit`.
fn best_matches(
    ctx: &GenContext<'_>,
    phones: &[String],
    input: &str,
    limit: usize,
) -> Vec<String> {
    let mut words = ctx.phonetic.words_by_phones(phones);
    if words.is_empty() {
        words = ctx.phonetic.near_words_by_phones(phones);
    }
    words.retain(|w| w != input);
    words.sort_by(|a, b| {
        let za = ctx.graph.frequency(a, ctx.frequency);
        let zb = ctx.graph.frequency(b, ctx.frequency);
        zb.partial_cmp(&za)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(b))
    });
    words.truncate(limit);
    words
}

/// Stand-in similarity when a pronunciation is missing: edit distance over
/// spellings instead of phones. Recomputable from the pair alone, so a link
/// replayed from the graph scores the same as it did when first discovered.
fn spelling_proxy(word: &str, spelling: &str) -> f64 {
    score::phonetic_similarity(score::char_distance(word, spelling))
}

/// Phonetic similarity of a candidate to the input word, from the edit
/// distance between the input pronunciation and the candidate's constituent
/// pronunciations concatenated; `fallback` when either side is unknown.
fn candidate_similarity(
    ctx: &GenContext<'_>,
    input_phones: Option<&[String]>,
    candidate: &Candidate,
    fallback: f64,
) -> f64 {
    let Some(input_phones) = input_phones else {
        return fallback;
    };
    let mut assembled: Vec<String> = Vec::new();
    for w in &candidate.words {
        match ctx.phonetic.phones(w) {
            Ok(p) => assembled.extend(p),
            Err(_) => return fallback,
        }
    }
    score::phonetic_similarity(score::edit_distance(input_phones, &assembled))
}
