//! Per-origin robots.txt cache with 24 hour expiry

use crate::robots::RobotsPolicy;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// A policy and the time it was fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub policy: RobotsPolicy,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(policy: RobotsPolicy) -> Self {
        Self {
            policy,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the entry is older than 24 hours
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(24)
    }
}

/// Thread-safe map from origin (`scheme://host:port`) to cached policy
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fresh policy for an origin, if any
    pub fn get(&self, origin: &str) -> Option<RobotsPolicy> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(origin)
            .filter(|cached| !cached.is_stale())
            .map(|cached| cached.policy.clone())
    }

    /// Stores a freshly fetched policy
    pub fn insert(&self, origin: &str, policy: RobotsPolicy) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(origin.to_string(), CachedRobots::new(policy));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
