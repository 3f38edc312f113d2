//! Cache contents and the dirty flag.

use indexmap::IndexMap;
use rollcall_core::{Record, RecordId};

use super::stats::CacheStats;

/// Bulk-listing view of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never populated and not invalidated.
    Empty,
    /// Populated and trusted for listing.
    Fresh,
    /// Must be rebuilt from the remote tier before it is trusted for listing.
    Dirty,
}

/// Ordered id→record map plus dirty flag.
///
/// `entries` is `None` until the first write or successful read. All
/// mutation goes through the owning repository.
#[derive(Debug)]
pub struct RecordCache<R: Record> {
    entries: Option<IndexMap<RecordId, R>>,
    dirty: bool,
    stats: CacheStats,
}

impl<R: Record> Default for RecordCache<R> {
    fn default() -> Self {
        Self {
            entries: None,
            dirty: false,
            stats: CacheStats::default(),
        }
    }
}

impl<R: Record> RecordCache<R> {
    /// Create an empty, clean cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bulk-listing state.
    pub fn state(&self) -> CacheState {
        if self.dirty {
            CacheState::Dirty
        } else if self.entries.is_some() {
            CacheState::Fresh
        } else {
            CacheState::Empty
        }
    }

    /// True once anything has been stored, even if later removed.
    pub fn is_populated(&self) -> bool {
        self.entries.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.contains_key(id))
    }

    /// Copy of the contents in insertion order if the cache is `Fresh`.
    ///
    /// Records a list hit or miss.
    pub fn fresh_snapshot(&mut self) -> Option<Vec<R>> {
        match (&self.entries, self.dirty) {
            (Some(entries), false) => {
                self.stats.list_hits += 1;
                Some(entries.values().cloned().collect())
            }
            _ => {
                self.stats.list_misses += 1;
                None
            }
        }
    }

    /// Look up one record, ignoring the dirty flag.
    ///
    /// Records a hit or miss.
    pub fn get(&mut self, id: &str) -> Option<R> {
        let found = self
            .entries
            .as_ref()
            .and_then(|entries| entries.get(id))
            .cloned();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    /// Look up one record without touching the counters.
    pub fn peek(&self, id: &str) -> Option<&R> {
        self.entries.as_ref().and_then(|entries| entries.get(id))
    }

    /// Replace the contents wholesale and mark the cache clean.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = R>) {
        let entries = records
            .into_iter()
            .map(|record| (record.record_id().to_string(), record))
            .collect::<IndexMap<_, _>>();
        self.entries = Some(entries);
        self.dirty = false;
        self.stats.reloads += 1;
    }

    /// Insert or replace one record. Creates the map on first use.
    /// An existing id keeps its position.
    pub fn put(&mut self, record: R) {
        self.entries
            .get_or_insert_with(IndexMap::new)
            .insert(record.record_id().to_string(), record);
    }

    /// Remove exactly the entry keyed by `id`; every other entry keeps its
    /// position.
    pub fn remove(&mut self, id: &str) -> Option<R> {
        self.entries
            .as_mut()
            .and_then(|entries| entries.shift_remove(id))
    }

    /// Invalidate the bulk view. Pure state transition.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Back to `Empty` with zeroed counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Counters plus the current entry count.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.len() as u64,
            ..self.stats.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: u32,
    }

    impl Record for Item {
        fn record_id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, value: u32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_new_cache_is_empty() {
        let mut cache = RecordCache::<Item>::new();
        assert_eq!(cache.state(), CacheState::Empty);
        assert!(!cache.is_populated());
        assert!(cache.fresh_snapshot().is_none());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_state_transitions() {
        let mut cache = RecordCache::new();
        cache.replace_all(vec![item("a", 1)]);
        assert_eq!(cache.state(), CacheState::Fresh);

        cache.mark_dirty();
        assert_eq!(cache.state(), CacheState::Dirty);
        assert!(cache.fresh_snapshot().is_none());

        cache.replace_all(vec![item("b", 2)]);
        assert_eq!(cache.state(), CacheState::Fresh);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_mark_dirty_on_empty_cache() {
        let mut cache = RecordCache::<Item>::new();
        cache.mark_dirty();
        assert_eq!(cache.state(), CacheState::Dirty);
        assert!(!cache.is_populated());
    }

    #[test]
    fn test_get_ignores_dirty_flag() {
        let mut cache = RecordCache::new();
        cache.replace_all(vec![item("a", 1)]);
        cache.mark_dirty();
        assert_eq!(cache.get("a"), Some(item("a", 1)));
    }

    #[test]
    fn test_put_creates_map_lazily_and_keeps_position() {
        let mut cache = RecordCache::new();
        cache.put(item("a", 1));
        cache.put(item("b", 2));
        assert_eq!(cache.state(), CacheState::Fresh);

        cache.put(item("a", 10));
        let snapshot = cache.fresh_snapshot().unwrap();
        assert_eq!(snapshot, vec![item("a", 10), item("b", 2)]);
    }

    #[test]
    fn test_remove_only_touches_target() {
        let mut cache = RecordCache::new();
        cache.replace_all(vec![item("a", 1), item("b", 2), item("c", 3)]);

        assert_eq!(cache.remove("b"), Some(item("b", 2)));
        assert_eq!(cache.remove("missing"), None);

        let snapshot = cache.fresh_snapshot().unwrap();
        assert_eq!(snapshot, vec![item("a", 1), item("c", 3)]);
    }

    #[test]
    fn test_stats_count_hits_and_misses() {
        let mut cache = RecordCache::new();
        assert!(cache.fresh_snapshot().is_none());
        cache.replace_all(vec![item("a", 1)]);
        assert!(cache.fresh_snapshot().is_some());
        assert!(cache.get("a").is_some());
        assert!(cache.get("z").is_none());

        let stats = cache.stats();
        assert_eq!(stats.list_misses, 1);
        assert_eq!(stats.list_hits, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.reloads, 1);
        assert_eq!(stats.entry_count, 1);

        cache.reset();
        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(cache.state(), CacheState::Empty);
    }
}
