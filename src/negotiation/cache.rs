//! Representation cache.
//!
//! Memoizes the scanner result per request path for the lifetime of a server
//! instance. Entries are never invalidated: implementations assume the served
//! tree does not change shape while the server runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::negotiation::{DirectoryScanner, Representations};
use crate::observability::metrics;

/// Resolves the representations available for a request path.
#[async_trait]
pub trait RepresentationCache: Send + Sync {
    /// Representations for `request_path` (the path as received, before any
    /// extension is appended). Never fails; unknown paths resolve to an empty set.
    async fn resolve(&self, request_path: &str) -> Arc<Representations>;
}

/// Unbounded in-memory cache in front of a [`DirectoryScanner`].
///
/// Two concurrent misses for the same path may both scan; the last store
/// wins. Both stores hold the same value as long as the filesystem is static.
#[derive(Debug)]
pub struct MemoryRepresentationCache {
    scanner: DirectoryScanner,
    entries: DashMap<String, Arc<Representations>>,
    scans: AtomicU64,
}

impl MemoryRepresentationCache {
    pub fn new(scanner: DirectoryScanner) -> Self {
        Self {
            scanner,
            entries: DashMap::new(),
            scans: AtomicU64::new(0),
        }
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of directory scans performed so far.
    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RepresentationCache for MemoryRepresentationCache {
    async fn resolve(&self, request_path: &str) -> Arc<Representations> {
        // The guard must be released before awaiting the scan
        if let Some(hit) = self.entries.get(request_path).map(|r| Arc::clone(r.value())) {
            metrics::record_cache_lookup(true);
            return hit;
        }
        metrics::record_cache_lookup(false);

        self.scans.fetch_add(1, Ordering::Relaxed);
        let representations = Arc::new(self.scanner.scan(request_path).await);
        self.entries
            .insert(request_path.to_string(), Arc::clone(&representations));
        representations
    }
}
