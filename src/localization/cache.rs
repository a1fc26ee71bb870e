use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Label entries live for 7 days.
pub const LABEL_TTL_MS: i64 = 1000 * 60 * 60 * 24 * 7;

struct Entry {
    value: Option<String>,
    cached_at_ms: i64,
}

/// In-memory map from canonical (English) title to localized label.
///
/// Keys are trimmed, case-sensitive titles. A `None` value is a valid
/// negative entry: "looked up, no localized label known", cached to avoid
/// repeated misses. Expired entries are evicted lazily on lookup, never
/// swept.
pub struct LabelCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl_ms: i64,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::with_ttl_ms(LABEL_TTL_MS)
    }

    pub fn with_ttl_ms(ttl_ms: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl_ms,
        }
    }

    /// Outer `None` = miss or expired; `Some(None)` = cached negative.
    pub fn get(&self, title: &str) -> Option<Option<String>> {
        self.get_at(title, Utc::now().timestamp_millis())
    }

    pub fn insert(&self, title: &str, value: Option<String>) {
        self.insert_at(title, value, Utc::now().timestamp_millis());
    }

    fn get_at(&self, title: &str, now_ms: i64) -> Option<Option<String>> {
        let key = title.trim();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            None => None,
            Some(entry) if now_ms - entry.cached_at_ms > self.ttl_ms => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
        }
    }

    fn insert_at(&self, title: &str, value: Option<String>, now_ms: i64) {
        self.entries.lock().unwrap().insert(
            title.trim().to_string(),
            Entry {
                value,
                cached_at_ms: now_ms,
            },
        );
    }
}

impl Default for LabelCache {
    fn default() -> Self {
        Self::new()
    }
}
