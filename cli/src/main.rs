//! Homophonic respeller CLI.
//!
//! Reads a text file, replaces words with their best-scoring phonetic
//! alternatives, and writes the result to a file or stdout. Tokenization
//! preserves whitespace and punctuation; substitutions inherit the original
//! token's casing. Progress and cache statistics go to stderr.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use regex::Regex;

use homofo_core::{
    overrides, CmuLexicon, Config, Datamuse, Engine, FrequencyOracle, GraphStore, Mode,
    TableFrequency,
};

/// Token pattern: words (with interior apostrophes), whitespace runs, and
/// single punctuation marks, covering the input exactly.
const TOKEN_PATTERN: &str = r"[\w']+|\s+|[^\w\s]";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Word,
    Syllable,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Mode {
        match m {
            ModeArg::Word => Mode::Word,
            ModeArg::Syllable => Mode::Syllable,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "homofo", about = "Homophonic respeller with tiered caching.")]
struct Args {
    /// Path to input text file.
    input_file: PathBuf,
    /// Output file (defaults to stdout).
    output_file: Option<PathBuf>,
    /// Number of tokens to process at a time.
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Size of the in-memory LRU cache for words.
    #[arg(long, default_value_t = 2048)]
    lru_cache_size: usize,
    /// Path to the persistent relationship graph.
    #[arg(long, default_value = "homophone_graph.redb")]
    graph_path: PathBuf,
    /// CMU-format dictionary file, or a compiled .bin snapshot.
    #[arg(long)]
    dict: Option<PathBuf>,

    /// Use only strict homophones from the phonetic dictionary.
    #[arg(long)]
    strict_only: bool,
    /// Consult the sound-alike service only when no strict homophone exists.
    #[arg(long)]
    strict_first: bool,
    /// Enable multi-word splits (e.g. "mister" -> "missed her").
    #[arg(long)]
    multiword: bool,
    /// Prefer longer homophone candidates.
    #[arg(long)]
    prefer_longer: bool,
    /// Processing mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Word)]
    mode: ModeArg,

    /// Weight for phonetic similarity.
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,
    /// Weight for orthographic similarity.
    #[arg(long, default_value_t = 0.5)]
    beta: f64,
    /// Weight for word frequency.
    #[arg(long, default_value_t = 0.2)]
    gamma: f64,
    /// Weight for candidate length.
    #[arg(long, default_value_t = 0.0)]
    length_weight: f64,
    /// Minimum Zipf frequency for a candidate to count as a real word.
    #[arg(long, default_value_t = 2.0)]
    min_zipf: f64,

    /// Per-request timeout for network lookups, in milliseconds.
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,
    /// Cap on sound-alike results requested per word.
    #[arg(long, default_value_t = 20)]
    max_sound_alike: usize,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            mode: self.mode.into(),
            multiword: self.multiword,
            strict_only: self.strict_only,
            strict_first: self.strict_first,
            prefer_longer: self.prefer_longer,
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            length_weight: self.length_weight,
            min_zipf: self.min_zipf,
            cache_capacity: self.lru_cache_size,
            max_sound_alike: self.max_sound_alike,
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Load the phonetic dictionary: an explicit `--dict`, then the `data/`
/// artifacts, then the built-in demo table.
fn load_lexicon(dict: Option<&PathBuf>) -> Result<(CmuLexicon, bool)> {
    if let Some(path) = dict {
        let lx = if path.extension().is_some_and(|e| e == "bin") {
            CmuLexicon::load_snapshot(path)
        } else {
            CmuLexicon::from_cmudict_file(path)
        }
        .with_context(|| format!("failed to load dictionary from {}", path.display()))?;
        return Ok((lx, false));
    }

    let snapshot = PathBuf::from("data/lexicon.bin");
    if snapshot.exists() {
        if let Ok(lx) = CmuLexicon::load_snapshot(&snapshot) {
            tracing::info!(words = lx.len(), "loaded lexicon snapshot");
            return Ok((lx, false));
        }
    }
    let dict_file = PathBuf::from("data/cmudict.dict");
    if dict_file.exists() {
        let lx = CmuLexicon::from_cmudict_file(&dict_file)?;
        tracing::info!(words = lx.len(), "loaded CMU dictionary");
        // Compile a snapshot so the next run starts faster.
        if let Err(e) = lx.save_snapshot(&snapshot) {
            tracing::debug!(error = %e, "could not write lexicon snapshot");
        }
        return Ok((lx, false));
    }

    tracing::info!("no dictionary found; using built-in demo lexicon");
    Ok((CmuLexicon::load_demo(), true))
}

/// Apply phrase-level overrides, then respell every word token, preserving
/// whitespace, punctuation, and casing.
fn respell_text(
    engine: &Engine,
    phrase_overrides: &[(Regex, &'static str)],
    token_re: &Regex,
    text: &str,
) -> String {
    let mut text = text.to_string();
    for (pattern, replacement) in phrase_overrides {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    let tokens: Vec<&str> = token_re.find_iter(&text).map(|m| m.as_str()).collect();
    let word_indices: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| is_word_token(t))
        .map(|(i, _)| i)
        .collect();
    let words: Vec<String> = word_indices
        .iter()
        .map(|&i| tokens[i].to_lowercase())
        .collect();

    let selections = engine.resolve_all(&words);

    let mut out: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    for (&i, selection) in word_indices.iter().zip(selections.iter()) {
        if let Some(candidate) = selection {
            out[i] = restore_case(tokens[i], &candidate.spelling());
        }
    }
    out.concat()
}

fn is_word_token(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic())
        && token.chars().all(|c| c.is_alphanumeric() || c == '\'')
}

/// Carry the original token's casing over to the replacement.
fn restore_case(original: &str, replacement: &str) -> String {
    let alpha: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if alpha.is_empty() {
        return replacement.to_string();
    }
    if alpha.len() > 1 && alpha.iter().all(|c| c.is_uppercase()) {
        replacement.to_uppercase()
    } else if alpha[0].is_uppercase() {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();

    let (lexicon, demo) = load_lexicon(args.dict.as_ref())?;
    let graph = Arc::new(GraphStore::open(&args.graph_path));

    // The demo lexicon ships its own frequencies so offline runs still rank;
    // otherwise frequencies come from the network, memoized into the graph.
    let frequency: Box<dyn FrequencyOracle + Send + Sync> = if demo {
        Box::new(TableFrequency::demo())
    } else {
        Box::new(Datamuse::new(args.timeout_ms))
    };
    let engine = Engine::new(
        lexicon,
        Datamuse::new(args.timeout_ms),
        frequency,
        graph,
        config,
    )?;

    let content = std::fs::read_to_string(&args.input_file)
        .with_context(|| format!("input file not found at {}", args.input_file.display()))?;

    let token_re = Regex::new(TOKEN_PATTERN).expect("token pattern is valid");
    let phrase_overrides: Vec<(Regex, &'static str)> = overrides::PHRASES
        .iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(&format!("(?i){pattern}")).expect("phrase pattern is valid"),
                *replacement,
            )
        })
        .collect();

    let all_tokens: Vec<&str> = token_re.find_iter(&content).map(|m| m.as_str()).collect();
    let total = all_tokens.len();
    tracing::info!(tokens = total, chunk_size = args.chunk_size, "tokenized input");

    let mut writer: BufWriter<Box<dyn Write>> = BufWriter::new(match &args.output_file {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("cannot create output file {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    });

    let chunk_size = args.chunk_size.max(1);
    for (index, chunk) in all_tokens.chunks(chunk_size).enumerate() {
        let processed = respell_text(&engine, &phrase_overrides, &token_re, &chunk.concat());
        writer.write_all(processed.as_bytes())?;
        let done = ((index + 1) * chunk_size).min(total);
        tracing::info!(
            "processed {done}/{total} tokens ({:.1}%)",
            done as f64 / total.max(1) as f64 * 100.0
        );
    }
    writer.flush()?;

    let (hits, misses) = engine.cache_stats();
    tracing::info!(hits, misses, "recency cache statistics");
    Ok(())
}
