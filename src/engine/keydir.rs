//! CaskDB - KeyDir (In-Memory Index)
//! Maps every live key to the location of its latest record in the data file.
//! Values never live here, only offsets and sizes.

use std::collections::HashMap;

use crate::types::KeyEntry;

/// In-memory hash index backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct KeyDir {
    entries: HashMap<String, KeyEntry>,
}

impl KeyDir {
    /// Create a new, empty KeyDir.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of indexed keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Point a key at a new record, returning the superseded entry.
    pub fn insert(&mut self, key: String, entry: KeyEntry) -> Option<KeyEntry> {
        self.entries.insert(key, entry)
    }

    /// Location of the latest record for `key`.
    pub fn get(&self, key: &str) -> Option<&KeyEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over indexed keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Bytes occupied by the records the index still points at.
    pub fn live_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.total_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut dir = KeyDir::new();
        dir.insert("name".into(), KeyEntry::new(10, 0, 20));
        assert_eq!(dir.get("name"), Some(&KeyEntry::new(10, 0, 20)));
    }

    #[test]
    fn test_get_nonexistent() {
        let dir = KeyDir::new();
        assert_eq!(dir.get("missing"), None);
        assert!(!dir.contains_key("missing"));
    }

    #[test]
    fn test_overwrite_returns_previous() {
        let mut dir = KeyDir::new();
        assert!(dir.insert("k".into(), KeyEntry::new(1, 0, 14)).is_none());
        let old = dir.insert("k".into(), KeyEntry::new(2, 14, 15));
        assert_eq!(old, Some(KeyEntry::new(1, 0, 14)));
        assert_eq!(dir.get("k").unwrap().position, 14);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_live_bytes() {
        let mut dir = KeyDir::new();
        dir.insert("a".into(), KeyEntry::new(1, 0, 14));
        dir.insert("b".into(), KeyEntry::new(1, 14, 20));
        dir.insert("a".into(), KeyEntry::new(1, 34, 13));
        assert_eq!(dir.live_bytes(), 33);
    }

    #[test]
    fn test_keys() {
        let mut dir = KeyDir::new();
        assert!(dir.is_empty());
        dir.insert("x".into(), KeyEntry::new(0, 0, 13));
        dir.insert("y".into(), KeyEntry::new(0, 13, 13));
        let mut keys: Vec<&str> = dir.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["x", "y"]);
    }
}
