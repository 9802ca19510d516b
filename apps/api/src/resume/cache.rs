//! Process-wide TTL cache for resume analysis results.
//!
//! An optimization only: a disabled cache (TTL 0) yields identical results.
//! The lock is never held across an await, and entries are written only
//! after a full computation succeeds.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::debug;

/// `resume:analysis:<sha256(text)>:<sha256(requirements_key)>`
pub fn cache_key(resume_text: &str, requirements_key: &str) -> String {
    format!(
        "resume:analysis:{}:{}",
        sha256_hex(resume_text),
        sha256_hex(requirements_key)
    )
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &str) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("Analysis cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, value: V) {
        if !self.is_enabled() {
            return;
        }
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_shape() {
        let key = cache_key("resume", "");
        let parts: Vec<_> = key.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(&parts[..2], &["resume", "analysis"]);
        assert_eq!(parts[2].len(), 64);
        // sha256("")
        assert_eq!(
            parts[3],
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(cache_key("resume", "a"), cache_key("resume", "b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.insert("k".to_string(), 7u32);
        assert_eq!(cache.get("k"), Some(7));

        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(cache.get("k"), Some(7));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("k".to_string(), "v".to_string());
        assert!(!cache.is_enabled());
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }
}
