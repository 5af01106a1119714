//! Persistent relationship graph.
//!
//! Durable record of every word pair the generators have ever linked, tagged
//! with the set of sources that justified the link, plus a durable memo of
//! fetched word frequencies. Backed by `redb`; if the database cannot be
//! opened the store degrades to an in-memory graph for the run (warned once)
//! rather than aborting.
//!
//! Layout: a `links` table keyed `"<word>\x1f<neighbor>"` -> source bitmask
//! (each undirected edge is stored as two rows so `neighbors` is a single
//! prefix scan), and a `freqs` table keyed by word -> Zipf value. An edge's
//! source set only ever grows: upserts OR the new source into the stored
//! mask inside one write transaction, which also serializes concurrent
//! writers to the same edge.

use ahash::AHashMap;
use redb::{ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::candidate::{Source, SourceSet};
use crate::oracle::{FrequencyOracle, OracleError};

const LINKS: TableDefinition<&str, u8> = TableDefinition::new("homophone_links");
const FREQS: TableDefinition<&str, u64> = TableDefinition::new("word_freqs");

/// Separator for adjacency keys. Sorts below every printable character, so
/// the prefix range `"<word>\x1f" .. "<word>\x20"` covers exactly one word's
/// neighbors, including neighbors whose own key contains spaces.
const SEP: char = '\u{1f}';

fn adjacency_key(word: &str, neighbor: &str) -> String {
    format!("{word}{SEP}{neighbor}")
}

/// Word/link graph with durable (`redb`) and ephemeral backends.
pub enum GraphStore {
    InMemory(InMemoryGraph),
    Redb(RedbGraph),
}

impl GraphStore {
    /// Open the durable graph at `path`, degrading to an in-memory graph
    /// (with a single warning) if the persistence medium is unavailable.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        match RedbGraph::open(path.as_ref()) {
            Ok(g) => GraphStore::Redb(g),
            Err(e) => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "relationship graph unavailable; using in-memory graph for this run"
                );
                GraphStore::InMemory(InMemoryGraph::new())
            }
        }
    }

    /// Ephemeral graph, used by tests and as the degraded fallback.
    pub fn in_memory() -> Self {
        GraphStore::InMemory(InMemoryGraph::new())
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, GraphStore::Redb(_))
    }

    /// Record that `source` linked `a` and `b`. Idempotent; the edge's
    /// source set is merged, never replaced. Self-links are ignored.
    pub fn upsert_link(&self, a: &str, b: &str, source: Source) {
        if a == b || a.is_empty() || b.is_empty() {
            return;
        }
        match self {
            GraphStore::InMemory(g) => g.upsert_link(a, b, source),
            GraphStore::Redb(g) => {
                if let Err(e) = g.upsert_link(a, b, source) {
                    tracing::debug!(error = %e, "graph write failed; link not persisted");
                }
            }
        }
    }

    /// All words directly linked to `word`, with the sources that linked them.
    pub fn neighbors(&self, word: &str) -> Vec<(String, SourceSet)> {
        match self {
            GraphStore::InMemory(g) => g.neighbors(word),
            GraphStore::Redb(g) => g.neighbors(word).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "graph read failed");
                Vec::new()
            }),
        }
    }

    /// Memoizing frequency fetch. A fetched value never changes; an unknown
    /// word memoizes as 0.0 (below any reasonable threshold); a transient
    /// oracle failure returns 0.0 without memoizing so later runs can retry.
    pub fn frequency(&self, word: &str, oracle: &dyn FrequencyOracle) -> f64 {
        if let Some(z) = self.cached_frequency(word) {
            return z;
        }
        match oracle.zipf(word) {
            Ok(z) => {
                self.memoize_frequency(word, z);
                z
            }
            Err(OracleError::UnknownWord(_)) => {
                self.memoize_frequency(word, 0.0);
                0.0
            }
            Err(OracleError::Unavailable(e)) => {
                tracing::debug!(word, error = %e, "frequency oracle unavailable");
                0.0
            }
        }
    }

    fn cached_frequency(&self, word: &str) -> Option<f64> {
        match self {
            GraphStore::InMemory(g) => g.cached_frequency(word),
            GraphStore::Redb(g) => g.cached_frequency(word).ok().flatten(),
        }
    }

    fn memoize_frequency(&self, word: &str, zipf: f64) {
        match self {
            GraphStore::InMemory(g) => g.memoize_frequency(word, zipf),
            GraphStore::Redb(g) => {
                if let Err(e) = g.memoize_frequency(word, zipf) {
                    tracing::debug!(error = %e, "graph write failed; frequency not memoized");
                }
            }
        }
    }
}

/// Thread-safe ephemeral graph.
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    links: RwLock<AHashMap<String, AHashMap<String, SourceSet>>>,
    freqs: RwLock<AHashMap<String, f64>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert_link(&self, a: &str, b: &str, source: Source) {
        if let Ok(mut links) = self.links.write() {
            for (from, to) in [(a, b), (b, a)] {
                links
                    .entry(from.to_string())
                    .or_default()
                    .entry(to.to_string())
                    .or_default()
                    .insert(source);
            }
        }
    }

    fn neighbors(&self, word: &str) -> Vec<(String, SourceSet)> {
        if let Ok(links) = self.links.read() {
            links
                .get(word)
                .map(|m| m.iter().map(|(w, s)| (w.clone(), *s)).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    fn cached_frequency(&self, word: &str) -> Option<f64> {
        self.freqs.read().ok()?.get(word).copied()
    }

    fn memoize_frequency(&self, word: &str, zipf: f64) {
        if let Ok(mut freqs) = self.freqs.write() {
            freqs.entry(word.to_string()).or_insert(zipf);
        }
    }
}

/// Redb-backed durable graph.
///
/// Write transactions are exclusive, so concurrent upserts of the same edge
/// serialize and the read-merge-write of the source mask never loses a bit.
pub struct RedbGraph {
    db: redb::Database,
    #[allow(dead_code)]
    path: PathBuf,
}

impl RedbGraph {
    /// Create or open the database and make sure both tables exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, redb::Error> {
        if let Some(parent) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let db = redb::Database::create(path.as_ref())?;
        let txn = db.begin_write()?;
        {
            txn.open_table(LINKS)?;
            txn.open_table(FREQS)?;
        }
        txn.commit()?;
        Ok(RedbGraph {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    fn upsert_link(&self, a: &str, b: &str, source: Source) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(LINKS)?;
            for (from, to) in [(a, b), (b, a)] {
                let key = adjacency_key(from, to);
                let mut set = match table.get(key.as_str())? {
                    Some(existing) => SourceSet::from_bits(existing.value()),
                    None => SourceSet::new(),
                };
                set.insert(source);
                table.insert(key.as_str(), set.bits())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    fn neighbors(&self, word: &str) -> Result<Vec<(String, SourceSet)>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(LINKS)?;
        let lo = format!("{word}{SEP}");
        let hi = format!("{word}\u{20}");
        let mut out = Vec::new();
        for item in table.range::<&str>(lo.as_str()..hi.as_str())? {
            let (k, v) = item?;
            if let Some(neighbor) = k.value().strip_prefix(lo.as_str()) {
                out.push((neighbor.to_string(), SourceSet::from_bits(v.value())));
            }
        }
        Ok(out)
    }

    fn cached_frequency(&self, word: &str) -> Result<Option<f64>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(FREQS)?;
        Ok(table.get(word)?.map(|v| f64::from_bits(v.value())))
    }

    fn memoize_frequency(&self, word: &str, zipf: f64) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(FREQS)?;
            if table.get(word)?.is_none() {
                // stored as raw bits
                table.insert(word, zipf.to_bits())?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{OracleResult, TableFrequency};

    struct FailingFrequency;
    impl FrequencyOracle for FailingFrequency {
        fn zipf(&self, _word: &str) -> OracleResult<f64> {
            Err(OracleError::Unavailable("down".into()))
        }
    }

    #[test]
    fn upsert_is_idempotent_and_monotone() {
        let g = GraphStore::in_memory();
        g.upsert_link("awesome", "possum", Source::Datamuse);
        g.upsert_link("awesome", "possum", Source::Datamuse);

        let n = g.neighbors("awesome");
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].0, "possum");
        assert!(n[0].1.contains(Source::Datamuse));
        assert!(!n[0].1.contains(Source::Cmu));

        // A later discovery by another source extends the same edge.
        g.upsert_link("possum", "awesome", Source::Cmu);
        let n = g.neighbors("awesome");
        assert_eq!(n.len(), 1);
        assert!(n[0].1.contains(Source::Datamuse));
        assert!(n[0].1.contains(Source::Cmu));
    }

    #[test]
    fn links_are_symmetric_and_self_links_ignored() {
        let g = GraphStore::in_memory();
        g.upsert_link("see", "sea", Source::Cmu);
        g.upsert_link("see", "see", Source::Cmu);
        assert_eq!(g.neighbors("sea").len(), 1);
        assert_eq!(g.neighbors("see").len(), 1);
    }

    #[test]
    fn frequency_memoizes_and_skips_transient_failures() {
        let g = GraphStore::in_memory();
        let mut table = TableFrequency::new();
        table.insert("sea", 5.1);

        assert_eq!(g.frequency("sea", &table), 5.1);
        // Unknown words memoize as 0.0 ...
        assert_eq!(g.frequency("qqq", &table), 0.0);
        // ... and stay answered from the memo even if the oracle later fails.
        assert_eq!(g.frequency("sea", &FailingFrequency), 5.1);
        assert_eq!(g.frequency("qqq", &FailingFrequency), 0.0);
        // Transient failure on a fresh word is not memoized.
        assert_eq!(g.frequency("pill", &FailingFrequency), 0.0);
        let mut later = TableFrequency::new();
        later.insert("pill", 4.0);
        assert_eq!(g.frequency("pill", &later), 4.0);
    }

    #[test]
    fn redb_roundtrip_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "homofo_graph_test_{}.redb",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        {
            let g = GraphStore::open(&path);
            assert!(g.is_durable());
            g.upsert_link("see", "sea", Source::Cmu);
            g.upsert_link("see", "sea", Source::Datamuse);
            g.upsert_link("mister", "missed her", Source::Multiword);
            g.memoize_frequency("sea", 5.1);
        }
        {
            let g = GraphStore::open(&path);
            let mut n = g.neighbors("see");
            n.sort_by(|a, b| a.0.cmp(&b.0));
            assert_eq!(n.len(), 1);
            assert!(n[0].1.contains(Source::Cmu));
            assert!(n[0].1.contains(Source::Datamuse));

            // Multiword node keys survive the prefix scan unharmed.
            let n = g.neighbors("mister");
            assert_eq!(n[0].0, "missed her");
            assert_eq!(g.cached_frequency("sea"), Some(5.1));
        }
        let _ = std::fs::remove_file(&path);
    }
}
