//! View cache
//!
//! An in-memory, UI-facing copy of one table. It is seeded once from the
//! store and from then on only moves in step with store results: a change is
//! applied after the store reported success, never before and never
//! speculatively. The cache never writes anything back.

use crate::models::Record;

/// A store mutation that succeeded and must be mirrored
#[derive(Debug, Clone, PartialEq)]
pub enum Change<R> {
    /// A row was inserted; carries the stored record
    Inserted(R),
    /// Row `id` now has `payload`
    Updated { id: i64, payload: String },
    /// Row `id` was removed
    Deleted(i64),
}

/// Ordered mirror of one table, oldest first
#[derive(Debug, Clone)]
pub struct ViewCache<R: Record> {
    records: Vec<R>,
    load_error: Option<String>,
}

impl<R: Record> Default for ViewCache<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            load_error: None,
        }
    }
}

impl<R: Record> ViewCache<R> {
    /// Seed the cache from a full table load
    pub fn seeded(records: Vec<R>) -> Self {
        Self {
            records,
            load_error: None,
        }
    }

    /// An empty cache standing in for a table that failed to load
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            load_error: Some(error.into()),
        }
    }

    /// Replace the whole contents, e.g. after the store file was swapped
    pub fn reseed(&mut self, records: Vec<R>) {
        self.records = records;
        self.load_error = None;
    }

    /// Mirror one successful store mutation
    ///
    /// Updates and deletes for ids that are not cached are ignored.
    pub fn apply(&mut self, change: Change<R>) {
        match change {
            Change::Inserted(record) => self.records.push(record),
            Change::Updated { id, payload } => {
                if let Some(record) = self.records.iter_mut().find(|r| r.id() == id) {
                    record.set_payload(payload);
                }
            }
            Change::Deleted(id) => self.records.retain(|r| r.id() != id),
        }
    }

    /// Records in store order (oldest first)
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Records in display order (newest first)
    pub fn display(&self) -> impl Iterator<Item = &R> + '_ {
        self.records.iter().rev()
    }

    pub fn get(&self, id: i64) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Why the initial load failed, if it did
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Whether ids are unique, as the store guarantees
    #[cfg(test)]
    pub fn ids_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.records.len());
        self.records.iter().all(|r| seen.insert(r.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Image, Note};

    fn texts(cache: &ViewCache<Note>) -> Vec<&str> {
        cache.records().iter().map(|n| n.text.as_str()).collect()
    }

    #[test]
    fn test_insert_appends_and_display_reverses() {
        let mut cache = ViewCache::default();
        cache.apply(Change::Inserted(Note::new(1, "Buy milk")));
        cache.apply(Change::Inserted(Note::new(2, "Call Sam")));

        assert_eq!(texts(&cache), vec!["Buy milk", "Call Sam"]);
        let shown: Vec<_> = cache.display().map(|n| n.text.as_str()).collect();
        assert_eq!(shown, vec!["Call Sam", "Buy milk"]);
    }

    #[test]
    fn test_update_replaces_matching_payload() {
        let mut cache = ViewCache::seeded(vec![Note::new(1, "a"), Note::new(2, "b")]);
        cache.apply(Change::Updated {
            id: 2,
            payload: "b2".to_string(),
        });

        assert_eq!(texts(&cache), vec!["a", "b2"]);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cache = ViewCache::seeded(vec![Note::new(1, "a")]);
        cache.apply(Change::Updated {
            id: 9,
            payload: "ghost".to_string(),
        });

        assert_eq!(cache.records(), &[Note::new(1, "a")]);
    }

    #[test]
    fn test_delete_removes_matching_entry() {
        let mut cache = ViewCache::seeded(vec![
            Image::new(1, "file:///1.jpg"),
            Image::new(2, "file:///2.jpg"),
        ]);
        cache.apply(Change::Deleted(1));
        cache.apply(Change::Deleted(7));

        assert_eq!(cache.records(), &[Image::new(2, "file:///2.jpg")]);
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());
    }

    #[test]
    fn test_failed_cache_is_empty_with_error() {
        let mut cache: ViewCache<Note> = ViewCache::failed("disk I/O error");
        assert!(cache.is_empty());
        assert_eq!(cache.load_error(), Some("disk I/O error"));

        cache.reseed(vec![Note::new(1, "back")]);
        assert_eq!(cache.len(), 1);
        assert!(cache.load_error().is_none());
    }

    #[test]
    fn test_ids_unique() {
        let cache = ViewCache::seeded(vec![Note::new(1, "a"), Note::new(2, "b")]);
        assert!(cache.ids_unique());

        let cache = ViewCache::seeded(vec![Note::new(1, "a"), Note::new(1, "b")]);
        assert!(!cache.ids_unique());
    }
}
