// Cache manager - handles request fingerprinting and lookup

use crate::cache::models::{CacheEntry, CacheStats};
use lru::LruCache;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Generate a SHA-256 fingerprint over (model id, canonical request payload).
///
/// `serde_json` keeps object keys in a sorted map, so serializing a `Value`
/// yields the same bytes regardless of the field order the payload was built
/// with. Two logically identical requests therefore always share a key.
pub fn fingerprint(model: &str, payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update(payload.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Bounded LRU store of normalized responses keyed by request fingerprint.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.lock().await.get(key).cloned();
        let prefix = key.get(..16).unwrap_or(key);
        match &entry {
            Some(_) => {
                debug!(key = prefix, "cache hit");
                self.stats.write().await.hits += 1;
            }
            None => {
                debug!(key = prefix, "cache miss");
                self.stats.write().await.misses += 1;
            }
        }
        entry
    }

    pub async fn put(&self, key: String, entry: CacheEntry) {
        self.entries.lock().await.put(key, entry);
        self.stats.write().await.stores += 1;
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
        debug!("cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fingerprint_ignores_field_order() {
        let a = json!({
            "contents": [{"parts": [{"text": "hello"}]}],
            "generationConfig": {"temperature": 0.7, "maxOutputTokens": 512}
        });
        let b = json!({
            "generationConfig": {"maxOutputTokens": 512, "temperature": 0.7},
            "contents": [{"parts": [{"text": "hello"}]}]
        });

        assert_eq!(fingerprint("models/gemini-2.5-flash", &a), fingerprint("models/gemini-2.5-flash", &b));
    }

    #[test]
    fn fingerprint_separates_models_and_payloads() {
        let payload = json!({"contents": [{"parts": [{"text": "hello"}]}]});
        let other = json!({"contents": [{"parts": [{"text": "goodbye"}]}]});

        assert_ne!(
            fingerprint("models/gemini-2.5-flash", &payload),
            fingerprint("models/gemini-1.5-pro", &payload)
        );
        assert_ne!(
            fingerprint("models/gemini-2.5-flash", &payload),
            fingerprint("models/gemini-2.5-flash", &other)
        );
    }

    #[tokio::test]
    async fn put_then_get_returns_entry_unchanged() {
        let cache = ResponseCache::new(8);
        let entry = CacheEntry {
            text: "generated".to_string(),
            degraded: false,
        };

        cache.put("k".repeat(64), entry.clone()).await;
        assert_eq!(cache.get(&"k".repeat(64)).await, Some(entry));
    }

    #[tokio::test]
    async fn evicts_least_recently_used_beyond_capacity() {
        let cache = ResponseCache::new(2);
        let entry = |t: &str| CacheEntry {
            text: t.to_string(),
            degraded: false,
        };

        cache.put("a".repeat(64), entry("1")).await;
        cache.put("b".repeat(64), entry("2")).await;
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.get(&"a".repeat(64)).await.is_some());
        cache.put("c".repeat(64), entry("3")).await;

        assert!(cache.get(&"a".repeat(64)).await.is_some());
        assert!(cache.get(&"b".repeat(64)).await.is_none());
        assert!(cache.get(&"c".repeat(64)).await.is_some());
    }

    #[tokio::test]
    async fn tracks_hits_and_misses() {
        let cache = ResponseCache::new(4);
        cache
            .put(
                "x".repeat(64),
                CacheEntry {
                    text: "t".to_string(),
                    degraded: false,
                },
            )
            .await;

        cache.get(&"x".repeat(64)).await;
        cache.get(&"y".repeat(64)).await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.stores, 1);
    }
}
