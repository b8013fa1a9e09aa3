//! Breadth-first frontier for one harvest run
//!
//! The frontier owns the FIFO queue, the set of URLs already queued and the
//! set of URLs already dequeued (visited). All three are keyed by the
//! normalized URL string. A URL is queued at most once and dequeued at most
//! once per run, and because the queue is FIFO and every admitted link sits
//! one level below its parent, all depth-`d` entries leave the queue before
//! any depth-`d + 1` entry discovered from them.
//!
//! Seeds are trusted: they bypass the keyword/domain filter. Only links
//! discovered on fetched pages go through [`FrontierManager::admit`].

use crate::crawler::model::FrontierEntry;
use crate::url::{normalize_url, AdmissionFilter};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Why a discovered link was not enqueued
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("depth {depth} exceeds maximum {max_depth}")]
    DepthExceeded { depth: u32, max_depth: u32 },

    #[error("already visited")]
    AlreadyVisited,

    #[error("already queued")]
    AlreadyQueued,

    #[error("no keyword match")]
    KeywordMismatch,

    #[error("required domain substring missing")]
    DomainMismatch,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Frontier state, constructed fresh for each run
#[derive(Debug)]
pub struct FrontierManager {
    max_depth: u32,
    filter: AdmissionFilter,
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl FrontierManager {
    pub fn new(max_depth: u32, filter: AdmissionFilter) -> Self {
        Self {
            max_depth,
            filter,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn filter(&self) -> &AdmissionFilter {
        &self.filter
    }

    /// Enqueues seeds at depth 0 in the order given
    ///
    /// Unparseable seeds and seeds already queued or visited are skipped.
    /// Returns the number of seeds actually enqueued.
    pub fn seed<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for url in urls {
            let url = url.as_ref();
            let key = match normalize_url(url) {
                Ok(normalized) => normalized.to_string(),
                Err(e) => {
                    tracing::warn!("Skipping invalid seed {}: {}", url, e);
                    continue;
                }
            };
            if self.visited.contains(&key) || !self.queued.insert(key.clone()) {
                tracing::trace!("Skipping duplicate seed {}", key);
                continue;
            }
            self.queue.push_back(FrontierEntry::new(key, 0));
            added += 1;
        }
        added
    }

    /// Evaluates a link found on a page at `parent_depth`
    ///
    /// On acceptance the new entry, one level below its parent, is enqueued
    /// and a copy returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use topic_harvester::crawler::{FrontierManager, Rejection};
    /// use topic_harvester::url::AdmissionFilter;
    ///
    /// let mut frontier = FrontierManager::new(1, AdmissionFilter::new(["msc"], "example.edu"));
    /// frontier.seed(["https://example.edu/admissions/graduate/msc-ai"]);
    ///
    /// let entry = frontier
    ///     .admit("https://example.edu/admissions/graduate/msc-ai/apply", 0)
    ///     .unwrap();
    /// assert_eq!(entry.depth, 1);
    /// assert_eq!(
    ///     frontier.admit("https://example.edu/about", 0),
    ///     Err(Rejection::KeywordMismatch)
    /// );
    /// ```
    pub fn admit(&mut self, link: &str, parent_depth: u32) -> Result<FrontierEntry, Rejection> {
        let depth = parent_depth.saturating_add(1);
        if depth > self.max_depth {
            return Err(Rejection::DepthExceeded {
                depth,
                max_depth: self.max_depth,
            });
        }

        let key = normalize_url(link)
            .map_err(|e| Rejection::InvalidUrl(e.to_string()))?
            .to_string();

        if self.visited.contains(&key) {
            return Err(Rejection::AlreadyVisited);
        }
        if self.queued.contains(&key) {
            return Err(Rejection::AlreadyQueued);
        }
        if !self.filter.matches_keywords(&key) {
            return Err(Rejection::KeywordMismatch);
        }
        if !self.filter.matches_domain(&key) {
            return Err(Rejection::DomainMismatch);
        }

        let entry = FrontierEntry::new(key.clone(), depth);
        self.queued.insert(key);
        self.queue.push_back(entry.clone());
        Ok(entry)
    }

    /// Pops the earliest-enqueued entry and marks it visited
    pub fn next(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop_front() {
            self.queued.remove(&entry.url);
            // Queued URLs are already normalized
            if self.visited.insert(entry.url.clone()) {
                return Some(entry);
            }
        }
        None
    }

    /// Dequeues up to `limit` entries, each marked visited
    pub fn take_batch(&mut self, limit: usize) -> Vec<FrontierEntry> {
        let mut batch = Vec::with_capacity(limit.min(self.queue.len()));
        while batch.len() < limit {
            match self.next() {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }
        batch
    }

    /// Records a URL as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        let key = normalize_url(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        self.visited.insert(key)
    }

    pub fn is_visited(&self, url: &str) -> bool {
        normalize_url(url)
            .map(|u| self.visited.contains(u.as_str()))
            .unwrap_or(false)
    }

    /// Entries still waiting to be dequeued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
