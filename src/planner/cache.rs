//! Plan cache.
//!
//! One process-wide map from normalized-message hash to a validated plan.
//! Entries expire after the configured TTL; eviction is lazy on read. The
//! lock only guards a map lookup or insert, so a coarse mutex is plenty —
//! the cache never blocks emission.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::planner::PlannedComponent;

/// Cache key: SHA-256 of the message after trimming and lowercasing.
pub fn cache_key(message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.trim().to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

struct CacheEntry {
    components: Vec<PlannedComponent>,
    expires_at: Instant,
}

/// TTL cache for validated plans. Fallback plans are never stored.
pub struct PlanCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl PlanCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Non-expired plan for `key`, evicting it lazily when stale.
    pub fn get(&self, key: &str) -> Option<Vec<PlannedComponent>> {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("plan cache lock poisoned; treating as miss");
            return None;
        };
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.components.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn store(&self, key: &str, components: Vec<PlannedComponent>) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("plan cache lock poisoned; dropping store");
            return;
        };
        entries.insert(
            key.to_string(),
            CacheEntry {
                components,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use serde_json::Map;

    fn sample_plan() -> Vec<PlannedComponent> {
        vec![PlannedComponent {
            kind: ComponentKind::SimpleComponent,
            data: Map::new(),
        }]
    }

    #[test]
    fn test_cache_key_normalizes_message() {
        assert_eq!(cache_key("Show Me Sales"), cache_key("  show me sales  "));
        assert_ne!(cache_key("show me sales"), cache_key("show me users"));
    }

    #[test]
    fn test_store_then_get() {
        let cache = PlanCache::new(Duration::from_secs(60));
        cache.store("k", sample_plan());
        let hit = cache.get("k").unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].kind, ComponentKind::SimpleComponent);
    }

    #[test]
    fn test_miss_for_unknown_key() {
        let cache = PlanCache::new(Duration::from_secs(60));
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let cache = PlanCache::new(Duration::ZERO);
        cache.store("k", sample_plan());
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = PlanCache::new(Duration::from_secs(60));
        cache.store("a", sample_plan());
        cache.store("b", sample_plan());
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
