// Ahoy Language Server
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Open-document store.
//!
//! Documents are immutable snapshots held behind `Arc`. An edit never touches
//! the published snapshot: the pipeline builds a complete replacement on the
//! blocking pool and the store swaps it in with a single map insert. Readers
//! holding the old `Arc` keep a consistent, if stale, view.
//!
//! # Ordering
//!
//! Pipelines for successive versions of one document may finish out of
//! order. A result is committed only if its version is at least the stored
//! version. Every close bumps a per-URI counter that open and change
//! pipelines sample before analysis; a result whose counter moved is dropped,
//! so a close that lands mid-pipeline is never undone.
//!
//! # Memory Management
//!
//! The store holds at most `max_cache_size` documents and evicts the least
//! recently used one when a new document would exceed it. Content larger than
//! `max_document_size` bytes is rejected before any analysis runs.

use crate::analysis::Document;
use crate::config::{AnalysisLimits, ServerConfig};
use crate::error::DocumentError;
use crate::guard::run_with_deadline;
use ahoy_syntax::Frontend;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_lsp::lsp_types::Url;
use tracing::{debug, error, warn};

struct Entry {
    document: Arc<Document>,
    /// Last access timestamp for LRU eviction.
    last_access: Mutex<Instant>,
}

impl Entry {
    fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            last_access: Mutex::new(Instant::now()),
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStatistics {
    /// Lookups that found an open document.
    pub hits: u64,
    /// Lookups for a document that is not open.
    pub misses: u64,
    /// Number of document evictions due to cache size limit.
    pub evictions: u64,
    /// Current number of documents in cache.
    pub current_size: usize,
    /// Maximum cache size.
    pub max_size: usize,
}

/// Concurrency-safe map of open documents.
pub struct DocumentManager {
    documents: DashMap<Url, Entry>,
    closes: DashMap<Url, u64>,
    cache_stats: Mutex<CacheStatistics>,
    max_cache_size: RwLock<usize>,
    max_document_size: RwLock<usize>,
    frontend: Arc<dyn Frontend>,
    limits: AnalysisLimits,
    pipeline_timeout: Duration,
}

impl DocumentManager {
    pub fn new(config: &ServerConfig, frontend: Arc<dyn Frontend>) -> Self {
        Self {
            documents: DashMap::new(),
            closes: DashMap::new(),
            cache_stats: Mutex::new(CacheStatistics {
                max_size: config.max_cache_size,
                ..Default::default()
            }),
            max_cache_size: RwLock::new(config.max_cache_size),
            max_document_size: RwLock::new(config.max_document_size),
            frontend,
            limits: config.analysis.clone(),
            pipeline_timeout: config.pipeline_timeout,
        }
    }

    /// Get current cache statistics.
    pub fn statistics(&self) -> CacheStatistics {
        let mut stats = self.cache_stats.lock();
        stats.current_size = self.documents.len();
        stats.clone()
    }

    /// Update maximum cache size (can be called during runtime).
    ///
    /// Shrinking below the current size evicts documents until it fits.
    pub fn set_max_cache_size(&self, new_max: usize) {
        *self.max_cache_size.write() = new_max;
        self.cache_stats.lock().max_size = new_max;
        while self.documents.len() > new_max && self.evict_lru_document() {}
        debug!(new_max, "cache max size updated");
    }

    pub fn max_cache_size(&self) -> usize {
        *self.max_cache_size.read()
    }

    /// Update maximum document size (can be called during runtime).
    pub fn set_max_document_size(&self, new_max: usize) {
        *self.max_document_size.write() = new_max;
        debug!(new_max, "max document size updated");
    }

    pub fn max_document_size(&self) -> usize {
        *self.max_document_size.read()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    /// Analyse and publish a newly opened document.
    ///
    /// Returns the published snapshot, or `None` if a newer version was
    /// already stored or the document was closed during analysis.
    pub async fn open(&self, uri: Url, version: i32, content: String) -> Result<Option<Arc<Document>>, DocumentError> {
        self.check_size(&uri, &content)?;
        let closes = self.close_count(&uri);
        let document = self.analyze(uri, version, content).await;
        Ok(self.commit(document, false, closes))
    }

    /// Analyse and publish new full content for an open document.
    ///
    /// A rejected change leaves the previous snapshot in place.
    pub async fn change(&self, uri: Url, version: i32, content: String) -> Result<Option<Arc<Document>>, DocumentError> {
        if !self.documents.contains_key(&uri) {
            return Err(DocumentError::NotOpen(uri));
        }
        self.check_size(&uri, &content)?;
        let closes = self.close_count(&uri);
        let document = self.analyze(uri, version, content).await;
        Ok(self.commit(document, true, closes))
    }

    /// Remove a document. Its symbol table is torn down as soon as the last
    /// reader releases the snapshot.
    pub fn close(&self, uri: &Url) -> bool {
        // Bumped before the removal so a commit holding the entry sees it.
        *self.closes.entry(uri.clone()).or_insert(0) += 1;
        let removed = self.documents.remove(uri).is_some();
        debug!(%uri, removed, "document closed");
        removed
    }

    /// The current snapshot of a document.
    pub fn get(&self, uri: &Url) -> Option<Arc<Document>> {
        let found = self.documents.get(uri).map(|entry| {
            *entry.last_access.lock() = Instant::now();
            Arc::clone(&entry.document)
        });
        let mut stats = self.cache_stats.lock();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    /// Drop every document and reset statistics.
    pub fn clear(&self) {
        self.documents.clear();
        let mut stats = self.cache_stats.lock();
        stats.hits = 0;
        stats.misses = 0;
        stats.evictions = 0;
    }

    fn check_size(&self, uri: &Url, content: &str) -> Result<(), DocumentError> {
        let max = self.max_document_size();
        if content.len() > max {
            warn!(
                %uri,
                size = content.len(),
                max,
                "document size limit exceeded (rejected)"
            );
            return Err(DocumentError::TooLarge {
                size: content.len(),
                max,
            });
        }
        Ok(())
    }

    /// Run the pipeline under the deadline. A fault yields the degraded
    /// document rather than an error.
    async fn analyze(&self, uri: Url, version: i32, content: String) -> Arc<Document> {
        let frontend = Arc::clone(&self.frontend);
        let limits = self.limits.clone();
        let task_uri = uri.clone();
        let task_content = content.clone();
        let started = Instant::now();

        let result = run_with_deadline(self.pipeline_timeout, move || {
            Document::analyze(task_uri, version, &task_content, frontend.as_ref(), &limits)
        })
        .await;

        match result {
            Ok(document) => {
                debug!(%uri, version, elapsed = ?started.elapsed(), "pipeline finished");
                Arc::new(document)
            }
            Err(fault) => {
                error!(%uri, version, %fault, "pipeline failed, publishing degraded document");
                Arc::new(Document::faulted(uri, version, &content, &fault))
            }
        }
    }

    fn close_count(&self, uri: &Url) -> u64 {
        self.closes.get(uri).map_or(0, |count| *count)
    }

    /// Publish `document` unless a newer version is already stored or the
    /// document was closed since `closes` was sampled.
    fn commit(&self, document: Arc<Document>, require_open: bool, closes: u64) -> Option<Arc<Document>> {
        let uri = document.uri.clone();
        if !require_open && !self.documents.contains_key(&uri) && self.documents.len() >= self.max_cache_size() {
            warn!(
                current = self.documents.len(),
                max = self.max_cache_size(),
                %uri,
                "cache limit reached, triggering LRU eviction"
            );
            self.evict_lru_document();
        }

        let entry = self.documents.entry(uri);
        if self.close_count(entry.key()) != closes {
            debug!(uri = %entry.key(), "document closed during analysis, discarding");
            return None;
        }
        match entry {
            MapEntry::Occupied(mut occupied) => {
                let stored = occupied.get().document.version;
                if stored > document.version {
                    debug!(
                        uri = %occupied.key(),
                        stored,
                        finished = document.version,
                        "discarding stale analysis"
                    );
                    return None;
                }
                occupied.insert(Entry::new(Arc::clone(&document)));
            }
            MapEntry::Vacant(vacant) => {
                if require_open {
                    debug!(uri = %vacant.key(), "document closed during analysis, discarding");
                    return None;
                }
                vacant.insert(Entry::new(Arc::clone(&document)));
            }
        }
        Some(document)
    }

    /// Evict the least recently used document. Returns false if the store is
    /// empty.
    fn evict_lru_document(&self) -> bool {
        let lru = self
            .documents
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value().last_access.lock()))
            .min_by_key(|(_, last_access)| *last_access);

        let Some((uri, last_access)) = lru else {
            warn!("LRU eviction requested but cache is empty (no-op)");
            return false;
        };

        if self.documents.remove(&uri).is_none() {
            // Another writer evicted or closed it first.
            return true;
        }
        warn!(%uri, idle = ?last_access.elapsed(), "evicted LRU document");
        let mut stats = self.cache_stats.lock();
        stats.evictions += 1;
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            evictions = stats.evictions,
            size = self.documents.len(),
            "cache statistics after eviction"
        );
        true
    }
}
