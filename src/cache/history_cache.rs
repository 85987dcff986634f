use crate::error::{OcrError, Result};
use crate::models::{HistoryEntry, HISTORY_CAPACITY};
use crate::store::{KeyValueStore, HISTORY_KEY};

/// Bounded, most-recent-first history of extractions.
///
/// Every mutation is written through to the store before it returns; when the
/// write fails the in-memory collection is left as it was.
pub struct HistoryCache<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
    entries: Vec<HistoryEntry>,
}

impl<'s, S: KeyValueStore + ?Sized> HistoryCache<'s, S> {
    /// Read the persisted history. Missing or unreadable data yields an empty
    /// history; the failure is only logged.
    pub fn load(store: &'s S) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_CAPACITY);
                    entries
                }
                Err(e) => {
                    tracing::warn!("Failed to parse history, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history, starting empty: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} history entries", entries.len());
        Self { store, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend `entry`, evicting the oldest entries beyond capacity.
    ///
    /// Ids stay strictly increasing from oldest to newest: an entry whose id
    /// is not greater than the current newest one is re-stamped. When the
    /// newest id is already `i64::MAX` the insert fails and nothing changes.
    pub fn insert(&mut self, mut entry: HistoryEntry) -> Result<&[HistoryEntry]> {
        if let Some(newest) = self.entries.first() {
            if entry.id <= newest.id {
                entry.id = newest.id.checked_add(1).ok_or(OcrError::HistoryIdExhausted)?;
            }
        }
        let mut next = Vec::with_capacity(HISTORY_CAPACITY);
        next.push(entry);
        next.extend(self.entries.iter().take(HISTORY_CAPACITY - 1).cloned());
        if self.entries.len() >= HISTORY_CAPACITY {
            tracing::debug!("History full, evicting {} entr(ies)", self.entries.len() + 1 - HISTORY_CAPACITY);
        }
        self.commit(next)
    }

    /// Drop the entry with `id`. Unknown ids are a no-op.
    pub fn remove(&mut self, id: i64) -> Result<&[HistoryEntry]> {
        let next: Vec<HistoryEntry> = self.entries.iter().filter(|e| e.id != id).cloned().collect();
        if next.len() == self.entries.len() {
            tracing::debug!("History entry {} not present", id);
        }
        self.commit(next)
    }

    /// Empty the history and remove the persisted key.
    pub fn clear(&mut self) -> Result<&[HistoryEntry]> {
        self.store.remove(HISTORY_KEY)?;
        self.entries.clear();
        Ok(&self.entries)
    }

    /// Look up an entry for restoring it into the result view.
    pub fn restore(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn commit(&mut self, next: Vec<HistoryEntry>) -> Result<&[HistoryEntry]> {
        let json = serde_json::to_string(&next)?;
        self.store.set(HISTORY_KEY, &json)?;
        self.entries = next;
        Ok(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn entry(id: i64) -> HistoryEntry {
        HistoryEntry {
            id,
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            model: "mistral-ocr-latest".to_string(),
            image_label: format!("image-{}.png", id),
            source_image: "data:image/png;base64,AAA".to_string(),
            normalized_result: format!("result {}", id),
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(OcrError::LockPoisoned)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(OcrError::LockPoisoned)
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(OcrError::LockPoisoned)
        }
    }

    #[test]
    fn insert_prepends_newest() {
        let store = MemoryStore::new();
        let mut cache = HistoryCache::load(&store);
        cache.insert(entry(1)).unwrap();
        let entries = cache.insert(entry(2)).unwrap();
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn eleventh_insert_evicts_oldest() {
        let store = MemoryStore::new();
        let mut cache = HistoryCache::load(&store);
        for id in 1..=11 {
            cache.insert(entry(id)).unwrap();
        }
        assert_eq!(cache.len(), HISTORY_CAPACITY);
        assert_eq!(cache.entries()[0].id, 11);
        assert!(cache.restore(1).is_none());
        assert!(cache.restore(2).is_some());
    }

    #[test]
    fn insert_then_load_round_trips() {
        let store = MemoryStore::new();
        let mut cache = HistoryCache::load(&store);
        cache.insert(entry(10)).unwrap();
        cache.insert(entry(20)).unwrap();
        let expected = cache.entries().to_vec();

        let reloaded = HistoryCache::load(&store);
        assert_eq!(reloaded.entries(), expected.as_slice());
    }

    #[test]
    fn remove_drops_matching_entry_only() {
        let store = MemoryStore::new();
        let mut cache = HistoryCache::load(&store);
        for id in 1..=3 {
            cache.insert(entry(id)).unwrap();
        }
        let ids: Vec<i64> = cache.remove(2).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(cache.remove(99).unwrap().len(), 2);
        assert_eq!(HistoryCache::load(&store).len(), 2);
    }

    #[test]
    fn clear_is_terminal() {
        let store = MemoryStore::new();
        let mut cache = HistoryCache::load(&store);
        for id in 1..=5 {
            cache.insert(entry(id)).unwrap();
        }
        assert!(cache.clear().unwrap().is_empty());
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
        assert!(HistoryCache::load(&store).is_empty());
    }

    #[test]
    fn restore_does_not_mutate() {
        let store = MemoryStore::new();
        let mut cache = HistoryCache::load(&store);
        cache.insert(entry(7)).unwrap();
        let restored = cache.restore(7).unwrap();
        assert_eq!(restored.normalized_result, "result 7");
        assert!(cache.restore(8).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn corrupt_or_unreadable_history_loads_empty() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();
        assert!(HistoryCache::load(&store).is_empty());

        assert!(HistoryCache::load(&FailingStore).is_empty());
    }

    #[test]
    fn oversized_persisted_history_is_truncated() {
        let store = MemoryStore::new();
        let many: Vec<HistoryEntry> = (1..=15).rev().map(entry).collect();
        store.set(HISTORY_KEY, &serde_json::to_string(&many).unwrap()).unwrap();
        let cache = HistoryCache::load(&store);
        assert_eq!(cache.len(), HISTORY_CAPACITY);
        assert_eq!(cache.entries()[0].id, 15);
    }

    #[test]
    fn colliding_ids_are_restamped() {
        let store = MemoryStore::new();
        let mut cache = HistoryCache::load(&store);
        cache.insert(entry(100)).unwrap();
        let entries = cache.insert(entry(100)).unwrap();
        assert_eq!(entries[0].id, 101);
        assert_eq!(entries[1].id, 100);
    }

    #[test]
    fn restamp_at_max_id_fails_without_change() {
        let store = MemoryStore::new();
        store
            .set(HISTORY_KEY, &serde_json::to_string(&vec![entry(i64::MAX)]).unwrap())
            .unwrap();
        let mut cache = HistoryCache::load(&store);
        assert!(matches!(cache.insert(entry(5)), Err(OcrError::HistoryIdExhausted)));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.entries()[0].id, i64::MAX);
        assert_eq!(HistoryCache::load(&store).len(), 1);
    }

    #[test]
    fn failed_write_leaves_collection_untouched() {
        let mut cache = HistoryCache::load(&FailingStore);
        assert!(cache.insert(entry(1)).is_err());
        assert!(cache.is_empty());
    }
}
