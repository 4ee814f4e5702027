//! Parse tree caching for the Java grammar adapter
//!
//! Operations are pure functions of the file text, so a tree parsed for one request can be
//! reused by the next request that sees byte-identical text (typical when the host chains
//! several operations on one file, or re-runs an operation to check idempotency).
//! Correctness never depends on the cache: a miss simply re-parses.
//!
//! ## Cache Strategy
//!
//! - **Key**: Content hash (u64 via DefaultHasher)
//! - **Value**: (content_string, parse_tree) tuple for hash collision detection
//! - **Eviction**: clear ~10% of entries (at least one) when full
//! - **Invalidation**: Automatic on content change (hash mismatch)

use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tree_sitter::Tree;
use tracing::trace;

/// Cache for Tree-sitter parse results
///
/// Stores parse trees keyed by content hash with collision detection.
/// DashMap keeps it usable from several worker threads sharing one engine.
pub struct ParseCache {
    /// Maps content hash -> (original content, parse tree)
    cache: Arc<DashMap<u64, (String, Tree)>>,

    /// Maximum number of cached entries
    max_size: usize,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl ParseCache {
    /// Creates a new parse cache holding at most `max_size` trees
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: Arc::new(DashMap::with_capacity(max_size)),
            max_size,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Attempts to retrieve a cached parse tree
    ///
    /// Returns `Some(tree)` only if the hash matches an entry *and* the stored content is
    /// byte-identical (collision detection).
    pub fn get(&self, content: &str) -> Option<Tree> {
        let hash = Self::hash_content(content);

        let found = self.cache.get(&hash).and_then(|entry| {
            let (cached_content, tree) = entry.value();
            if cached_content == content {
                Some(tree.clone())
            } else {
                trace!("Parse cache hash collision for {} bytes", content.len());
                None
            }
        });

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Stores a parse tree in the cache
    ///
    /// If the cache is at capacity, ~10% of the entries are dropped first. DashMap
    /// iteration order is undefined, so eviction is effectively pseudo-random.
    pub fn insert(&self, content: String, tree: Tree) {
        if self.max_size == 0 {
            return;
        }

        if self.cache.len() >= self.max_size {
            let to_remove = (self.max_size / 10).max(1);
            let mut removed = 0;

            self.cache.retain(|_, _| {
                if removed < to_remove {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
            trace!("Evicted {} parse trees", removed);
        }

        let hash = Self::hash_content(&content);
        self.cache.insert(hash, (content, tree));
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            size: self.cache.len(),
            capacity: self.max_size,
            hit_rate: (lookups > 0).then(|| hits as f64 / lookups as f64),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,

    /// Maximum capacity
    pub capacity: usize,

    /// Fraction of lookups that hit, `None` before the first lookup
    pub hit_rate: Option<f64>,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(64)
    }
}
