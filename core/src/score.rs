//! Candidate scoring and ranking.
//!
//! score = alpha * phonetic + beta * orthographic + gamma * frequency
//!       + length_weight * length_bonus
//!
//! Candidates below the frequency floor, blacklisted pairs, and identity
//! respellings are filtered before scoring. Ordering is fully deterministic:
//! score descending, then source priority, then spelling.

use std::cmp::Ordering;

use crate::candidate::Candidate;
use crate::{overrides, Config};

/// Levenshtein distance over any comparable sequence (phones or chars).
/// Space-optimized two-row dynamic program.
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (m, n) = (a.len(), b.len());
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

pub fn char_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    edit_distance(&a, &b)
}

/// Spelling closeness in [0, 1]: 1 minus the length-normalized edit distance.
pub fn orthographic_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - char_distance(a, b) as f64 / longest as f64
}

/// Phonetic closeness in [0, 1] from a phoneme edit distance.
pub fn phonetic_similarity(distance: usize) -> f64 {
    1.0 / (1.0 + distance as f64)
}

/// Zipf frequency normalized to [0, 1].
pub fn frequency_score(zipf: f64) -> f64 {
    (zipf / 7.0).clamp(0.0, 1.0)
}

/// A candidate with its composite score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub candidate: Candidate,
    pub score: f64,
}

/// Filter and score candidates for `input`, best first.
///
/// `zipf_of` supplies per-word frequencies (normally the graph store's
/// memoizing fetch). A candidate's aggregate frequency is the minimum across
/// its constituent words, so a split cannot hide one obscure half.
pub fn rank(
    input: &str,
    candidates: Vec<Candidate>,
    cfg: &Config,
    zipf_of: &mut dyn FnMut(&str) -> f64,
) -> Vec<Scored> {
    let mut surviving: Vec<(Candidate, String, f64)> = Vec::new();
    for cand in candidates {
        let spelling = cand.spelling();
        if spelling.is_empty() || spelling == input {
            continue;
        }
        if overrides::is_banned(input, &spelling) {
            continue;
        }
        let aggregate = cand
            .words
            .iter()
            .map(|w| zipf_of(w))
            .fold(f64::INFINITY, f64::min);
        if !aggregate.is_finite() || aggregate < cfg.min_zipf {
            continue;
        }
        surviving.push((cand, spelling, aggregate));
    }

    let use_length = cfg.prefer_longer || cfg.length_weight != 0.0;
    let longest = surviving
        .iter()
        .map(|(_, s, _)| s.chars().count())
        .max()
        .unwrap_or(1)
        .max(1);

    let mut scored: Vec<Scored> = surviving
        .into_iter()
        .map(|(cand, spelling, aggregate)| {
            let length_bonus = if use_length {
                spelling.chars().count() as f64 / longest as f64
            } else {
                0.0
            };
            let score = cfg.alpha * cand.phonetic
                + cfg.beta * orthographic_similarity(input, &spelling)
                + cfg.gamma * frequency_score(aggregate)
                + cfg.length_weight * length_bonus;
            Scored { candidate: cand, score }
        })
        .collect();

    scored.sort_by(compare);
    scored
}

/// Total order: score descending, then source priority, then spelling.
/// Guarantees reproducible winners for identical input and configuration.
fn compare(a: &Scored, b: &Scored) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.candidate
                .source
                .priority()
                .cmp(&b.candidate.source.priority())
        })
        .then_with(|| a.candidate.spelling().cmp(&b.candidate.spelling()))
}
