//! Per-function memoization of compiled matchers.
//!
//! Entries are built lazily and live as long as the cache. The build closure
//! runs while the entry's shard is write-locked, so concurrent first requests
//! for the same function build it exactly once. A failed build stores
//! nothing.

use crate::compiler::CompiledFunction;
use dashmap::DashMap;
use smol_str::SmolStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    /// Successful builds.
    pub builds: u64,
    pub entries: usize,
}

/// Compiled functions keyed by qualified identifier.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: DashMap<SmolStr, Arc<CompiledFunction>>,
    hits: AtomicU64,
    builds: AtomicU64,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entry for `key`, building it with `build` if absent.
    ///
    /// `build` must not touch this cache.
    pub fn get_or_build<E>(
        &self,
        key: &str,
        build: impl FnOnce() -> Result<CompiledFunction, E>,
    ) -> Result<Arc<CompiledFunction>, E> {
        if let Some(found) = self.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(function = key, "schema cache hit");
            return Ok(Arc::clone(found.value()));
        }

        let mut built = false;
        let entry = self
            .entries
            .entry(SmolStr::from(key))
            .or_try_insert_with(|| {
                built = true;
                build().map(Arc::new)
            })?;
        let compiled = Arc::clone(entry.value());
        drop(entry);

        if built {
            self.builds.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                function = key,
                overloads = compiled.matcher.overloads().len(),
                diagnostics = compiled.diagnostics.len(),
                "compiled parameter schema"
            );
        } else {
            // Another thread won the race between our lookup and insert.
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(compiled)
    }

    /// Returns the cached entry without building.
    pub fn get(&self, key: &str) -> Option<Arc<CompiledFunction>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Statistics are kept.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
