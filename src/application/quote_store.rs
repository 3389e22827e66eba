//! The in-memory quote collection and its persistence.
//!
//! Every mutation is written through to the key-value store before it
//! returns; a failed write rolls the in-memory change back.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::Mutex;

use crate::domain::{seed_quotes, AppError, QuoteRecord, Result};
use crate::infrastructure::local_storage::{KeyValueStore, QUOTES_KEY, SELECTED_CATEGORY_KEY};

/// Store handle shared between the presenter and the reconciler.
pub type SharedStore = Arc<Mutex<QuoteStore>>;

/// Ordered collection of quotes backed by a key-value store.
pub struct QuoteStore {
    storage: Box<dyn KeyValueStore>,
    quotes: Vec<QuoteRecord>,
}

impl QuoteStore {
    /// Load the collection from storage, falling back to the seed set.
    ///
    /// Never fails: unreadable or corrupt data is logged and treated as absent.
    pub fn initialize(storage: Box<dyn KeyValueStore>) -> Self {
        let quotes = Self::load(&*storage).unwrap_or_else(|| {
            tracing::debug!("No stored quotes, using seed set");
            seed_quotes()
        });

        tracing::info!(count = quotes.len(), "Quote store initialized");

        Self { storage, quotes }
    }

    fn load(storage: &dyn KeyValueStore) -> Option<Vec<QuoteRecord>> {
        let raw = match storage.get(QUOTES_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored quotes");
                return None;
            }
        };

        match serde_json::from_str::<Vec<QuoteRecord>>(&raw) {
            Ok(quotes) => Some(quotes),
            Err(e) => {
                let err = AppError::StorageParse {
                    message: e.to_string(),
                };
                tracing::warn!(error = %err, "Ignoring stored quotes");
                None
            }
        }
    }

    /// Wrap into a shared handle.
    #[must_use]
    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Validate and append a new quote.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if either field is blank after trimming,
    /// or a storage error if the write fails.
    pub fn add(&mut self, text: &str, category: &str) -> Result<QuoteRecord> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() {
            return Err(AppError::Validation { field: "text" });
        }
        if category.is_empty() {
            return Err(AppError::Validation { field: "category" });
        }

        let record = QuoteRecord::new(text, category);
        self.extend(vec![record.clone()])?;

        tracing::info!(category = %record.category, "Quote added");

        Ok(record)
    }

    /// Append records verbatim and persist once.
    ///
    /// # Errors
    /// Returns error if the write fails; the store is left as it was.
    pub fn extend(&mut self, records: Vec<QuoteRecord>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let previous_len = self.quotes.len();
        let added = records.len();
        self.quotes.extend(records);

        if let Err(e) = self.persist() {
            self.quotes.truncate(previous_len);
            return Err(e);
        }

        Ok(added)
    }

    /// Records matching a category filter, in insertion order.
    ///
    /// `None` and `"all"` return everything.
    #[must_use]
    pub fn list(&self, filter: Option<&str>) -> Vec<&QuoteRecord> {
        self.quotes.iter().filter(|q| q.matches(filter)).collect()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.quotes
            .iter()
            .filter(|q| seen.insert(q.category.as_str()))
            .map(|q| q.category.clone())
            .collect()
    }

    /// Uniformly pick one record passing the filter.
    pub fn random<R: Rng + ?Sized>(
        &self,
        filter: Option<&str>,
        rng: &mut R,
    ) -> Option<&QuoteRecord> {
        self.list(filter).choose(rng).copied()
    }

    /// Write the full sequence to storage.
    ///
    /// # Errors
    /// Returns error if serialization or the storage write fails.
    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.quotes).map_err(AppError::json_parse)?;
        self.storage.set(QUOTES_KEY, &json)?;
        tracing::trace!(count = self.quotes.len(), "Quotes persisted");
        Ok(())
    }

    /// The last category filter the user picked, if any.
    #[must_use]
    pub fn selected_category(&self) -> Option<String> {
        self.storage
            .get(SELECTED_CATEGORY_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read selected category");
                None
            })
    }

    /// Remember a category filter.
    ///
    /// # Errors
    /// Returns error if the storage write fails.
    pub fn set_selected_category(&self, category: &str) -> Result<()> {
        self.storage.set(SELECTED_CATEGORY_KEY, category)
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[QuoteRecord] {
        &self.quotes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// The `quotes` value as currently written to storage.
    #[cfg(test)]
    pub(crate) fn stored_quotes(&self) -> Option<Vec<QuoteRecord>> {
        let raw = self.storage.get(QUOTES_KEY).ok()??;
        serde_json::from_str(&raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::local_storage::{LocalStorage, MemoryStorage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    /// Storage whose writes always fail.
    struct ReadOnlyStorage;

    impl KeyValueStore for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::Storage {
                message: "read-only".into(),
                source: None,
            })
        }
    }

    fn seeded() -> QuoteStore {
        QuoteStore::initialize(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn test_initialize_falls_back_to_seed() {
        let store = seeded();
        assert_eq!(store.records(), seed_quotes().as_slice());
    }

    #[test]
    fn test_initialize_ignores_corrupt_data() {
        let storage = MemoryStorage::new();
        storage.set(QUOTES_KEY, "{not json").unwrap();
        let store = QuoteStore::initialize(Box::new(storage));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_initialize_keeps_empty_array() {
        let storage = MemoryStorage::new();
        storage.set(QUOTES_KEY, "[]").unwrap();
        let store = QuoteStore::initialize(Box::new(storage));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_trims_appends_and_persists() {
        let mut store = seeded();
        let record = store.add("  Stay hungry.  ", " Life ").unwrap();

        assert_eq!(record, QuoteRecord::new("Stay hungry.", "Life"));
        assert_eq!(store.len(), 4);
        assert_eq!(store.list(None).last(), Some(&&record));
        assert_eq!(store.stored_quotes().as_deref(), Some(store.records()));
    }

    #[test]
    fn test_add_rejects_blank_fields() {
        let mut store = seeded();

        assert!(matches!(
            store.add("", "Life"),
            Err(AppError::Validation { field: "text" })
        ));
        assert!(matches!(
            store.add("Something", "   "),
            Err(AppError::Validation { field: "category" })
        ));
        assert_eq!(store.len(), 3);
        assert!(store.storage.get(QUOTES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_add_keeps_local_duplicates() {
        let mut store = seeded();
        store.add("The only limit is your mind.", "Motivation").unwrap();
        assert_eq!(store.list(Some("Motivation")).len(), 2);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut store = QuoteStore::initialize(Box::new(ReadOnlyStorage));
        assert!(store.add("text", "cat").is_err());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_list_filters() {
        let mut store = seeded();
        store.add("Another", "Life").unwrap();

        assert_eq!(store.list(None).len(), 4);
        assert_eq!(store.list(Some("all")), store.list(None));

        let life: Vec<_> = store.list(Some("Life")).iter().map(|q| q.text.as_str()).collect();
        assert_eq!(life, vec!["Turn your wounds into wisdom.", "Another"]);

        assert!(store.list(Some("life")).is_empty());
        assert!(store.list(Some("Unknown")).is_empty());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let mut store = seeded();
        store.add("x", "Life").unwrap();
        store.add("y", "Humor").unwrap();
        assert_eq!(
            store.categories(),
            vec!["Motivation", "Philosophy", "Life", "Humor"]
        );
    }

    #[test]
    fn test_random_respects_filter() {
        let store = seeded();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..10 {
            let picked = store.random(Some("Philosophy"), &mut rng).unwrap();
            assert_eq!(picked.category, "Philosophy");
        }
        assert!(store.random(Some("Nope"), &mut rng).is_none());
    }

    #[test]
    fn test_selected_category_roundtrip() {
        let store = seeded();
        assert!(store.selected_category().is_none());
        store.set_selected_category("Life").unwrap();
        assert_eq!(store.selected_category().as_deref(), Some("Life"));
    }

    #[test]
    fn test_state_survives_restart() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("quotes.db");

        {
            let storage = LocalStorage::open(&db_path).unwrap();
            let mut store = QuoteStore::initialize(Box::new(storage));
            store.add("Persist me", "Test").unwrap();
        }

        let storage = LocalStorage::open(&db_path).unwrap();
        let store = QuoteStore::initialize(Box::new(storage));
        assert_eq!(store.len(), 4);
        assert_eq!(store.records()[3], QuoteRecord::new("Persist me", "Test"));
    }
}
