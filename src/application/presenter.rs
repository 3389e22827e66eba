//! User-facing adapter over the store and the remote.
//!
//! Owns the session storage and the selected category filter, and turns
//! sync completions into terminal notices.

use std::sync::Arc;

use rand::Rng;

use crate::domain::{MergeOutcome, QuoteRecord, Result, ALL_CATEGORIES};
use crate::infrastructure::local_storage::{KeyValueStore, LAST_QUOTE_KEY};
use crate::infrastructure::RemoteSource;

use super::formatter::format_sync_notice;
use super::quote_store::SharedStore;
use super::reconciler::SyncListener;

/// Wires user commands to the quote store.
pub struct Presenter {
    store: SharedStore,
    session: Box<dyn KeyValueStore>,
    remote: Option<Arc<dyn RemoteSource>>,
}

impl Presenter {
    /// Create a presenter. Without a remote, added quotes are not posted.
    #[must_use]
    pub fn new(
        store: SharedStore,
        session: Box<dyn KeyValueStore>,
        remote: Option<Arc<dyn RemoteSource>>,
    ) -> Self {
        Self {
            store,
            session,
            remote,
        }
    }

    /// The filter currently in effect, restored from storage.
    pub async fn current_filter(&self) -> Option<String> {
        self.store.lock().await.selected_category()
    }

    /// Pick a random quote under the current filter and remember it for the session.
    ///
    /// # Errors
    /// Returns error if the session write fails.
    pub async fn show_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<QuoteRecord>> {
        let quote = {
            let store = self.store.lock().await;
            let filter = store.selected_category();
            store.random(filter.as_deref(), rng).cloned()
        };

        if let Some(quote) = &quote {
            let json = serde_json::to_string(quote).map_err(crate::domain::AppError::json_parse)?;
            self.session.set(LAST_QUOTE_KEY, &json)?;
        }

        Ok(quote)
    }

    /// Quotes under `category`, or under the saved selection when `None`.
    ///
    /// An explicit category becomes the new saved selection.
    ///
    /// # Errors
    /// Returns error if the selection cannot be saved.
    pub async fn filter(&self, category: Option<&str>) -> Result<(String, Vec<QuoteRecord>)> {
        let store = self.store.lock().await;

        let selected = match category {
            Some(category) => {
                store.set_selected_category(category)?;
                category.to_string()
            }
            None => store
                .selected_category()
                .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
        };

        let quotes = store
            .list(Some(selected.as_str()))
            .into_iter()
            .cloned()
            .collect();

        Ok((selected, quotes))
    }

    /// Distinct categories plus the saved selection.
    pub async fn categories(&self) -> (Vec<String>, Option<String>) {
        let store = self.store.lock().await;
        (store.categories(), store.selected_category())
    }

    /// Add a quote and post it to the remote best-effort.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for blank input, or a storage error.
    /// Post failures are only logged.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<QuoteRecord> {
        let record = self.store.lock().await.add(text, category)?;

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.post_quote(&record).await {
                tracing::warn!(error = %e, "Post failed");
            }
        }

        Ok(record)
    }

    /// The last quote shown in this session.
    #[cfg(test)]
    fn last_shown(&self) -> Option<QuoteRecord> {
        self.session
            .get(LAST_QUOTE_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }
}

/// Prints sync notices to the terminal.
pub struct ConsoleListener;

impl SyncListener for ConsoleListener {
    fn on_synced(&self, outcome: &MergeOutcome, message: &str) {
        println!("{}", format_sync_notice(outcome, message));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::application::quote_store::QuoteStore;
    use crate::domain::{AppError, RemoteItem};
    use crate::infrastructure::local_storage::MemoryStorage;

    #[derive(Default)]
    struct CountingRemote {
        posts: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RemoteSource for CountingRemote {
        async fn fetch_items(&self) -> Result<Vec<RemoteItem>> {
            Ok(Vec::new())
        }

        async fn post_quote(&self, _quote: &QuoteRecord) -> Result<()> {
            self.posts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Network {
                    message: "offline".into(),
                });
            }
            Ok(())
        }
    }

    fn presenter(remote: Option<Arc<dyn RemoteSource>>) -> Presenter {
        let store = QuoteStore::initialize(Box::new(MemoryStorage::new())).shared();
        Presenter::new(store, Box::new(MemoryStorage::new()), remote)
    }

    #[tokio::test]
    async fn test_show_random_records_last_quote() {
        let presenter = presenter(None);
        let mut rng = StdRng::seed_from_u64(1);

        let shown = presenter.show_random(&mut rng).await.unwrap();

        assert!(shown.is_some());
        assert_eq!(presenter.last_shown(), shown);
    }

    #[tokio::test]
    async fn test_show_random_uses_saved_filter() {
        let presenter = presenter(None);
        presenter.filter(Some("Life")).await.unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let shown = presenter.show_random(&mut rng).await.unwrap().unwrap();
        assert_eq!(shown.category, "Life");
    }

    #[tokio::test]
    async fn test_show_random_with_no_match_is_none() {
        let presenter = presenter(None);
        presenter.filter(Some("Nothing")).await.unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        assert!(presenter.show_random(&mut rng).await.unwrap().is_none());
        assert!(presenter.last_shown().is_none());
    }

    #[tokio::test]
    async fn test_filter_saves_and_restores_selection() {
        let presenter = presenter(None);

        let (selected, quotes) = presenter.filter(None).await.unwrap();
        assert_eq!(selected, "all");
        assert_eq!(quotes.len(), 3);

        let (_, quotes) = presenter.filter(Some("Philosophy")).await.unwrap();
        assert_eq!(quotes.len(), 1);

        let (selected, quotes) = presenter.filter(None).await.unwrap();
        assert_eq!(selected, "Philosophy");
        assert_eq!(quotes.len(), 1);
        assert_eq!(presenter.current_filter().await.as_deref(), Some("Philosophy"));

        let (_, quotes) = presenter.filter(Some("all")).await.unwrap();
        assert_eq!(quotes.len(), 3);
    }

    #[tokio::test]
    async fn test_add_posts_to_remote() {
        let remote = Arc::new(CountingRemote::default());
        let presenter = presenter(Some(Arc::clone(&remote) as Arc<dyn RemoteSource>));

        presenter.add_quote("Posted", "Remote").await.unwrap();

        assert_eq!(remote.posts.load(Ordering::SeqCst), 1);
        let (categories, _) = presenter.categories().await;
        assert!(categories.contains(&"Remote".to_string()));
    }

    #[tokio::test]
    async fn test_add_ignores_post_failure() {
        let remote = Arc::new(CountingRemote {
            fail: true,
            ..CountingRemote::default()
        });
        let presenter = presenter(Some(Arc::clone(&remote) as Arc<dyn RemoteSource>));

        let record = presenter.add_quote("Still saved", "Local").await.unwrap();
        assert_eq!(record.text, "Still saved");
    }

    #[tokio::test]
    async fn test_invalid_add_does_not_post() {
        let remote = Arc::new(CountingRemote::default());
        let presenter = presenter(Some(Arc::clone(&remote) as Arc<dyn RemoteSource>));

        let result = presenter.add_quote("", "Life").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(remote.posts.load(Ordering::SeqCst), 0);
    }
}
