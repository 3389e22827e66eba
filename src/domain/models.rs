//! Domain models for the quote collection.

use serde::{Deserialize, Serialize};

/// Filter value that selects every category.
pub const ALL_CATEGORIES: &str = "all";

/// Category assigned to every record that arrives from the remote source.
pub const SERVER_CATEGORY: &str = "Server";

/// A single quote. Records are never edited once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// The quote itself. Merge identity is exact equality of this field.
    pub text: String,
    /// Free-form category label, compared case-sensitively.
    pub category: String,
}

impl QuoteRecord {
    /// Create a record without validation.
    #[must_use]
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Whether this record passes a category filter.
    ///
    /// `None` and [`ALL_CATEGORIES`] match everything.
    #[must_use]
    pub fn matches(&self, filter: Option<&str>) -> bool {
        match filter {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => self.category == category,
        }
    }
}

/// The default collection used when nothing has been persisted yet.
#[must_use]
pub fn seed_quotes() -> Vec<QuoteRecord> {
    vec![
        QuoteRecord::new("The only limit is your mind.", "Motivation"),
        QuoteRecord::new("Happiness depends upon ourselves.", "Philosophy"),
        QuoteRecord::new("Turn your wounds into wisdom.", "Life"),
    ]
}

/// An item from the remote list endpoint. Only the title is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteItem {
    /// Title text, used verbatim as the quote text.
    pub title: String,
}

impl RemoteItem {
    /// Map into a quote record under the server category.
    #[must_use]
    pub fn into_record(self) -> QuoteRecord {
        QuoteRecord::new(self.title, SERVER_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_has_three_distinct_categories() {
        let seed = seed_quotes();
        assert_eq!(seed.len(), 3);
        assert_eq!(seed[0].category, "Motivation");
        assert_eq!(seed[2].text, "Turn your wounds into wisdom.");
    }

    #[test]
    fn test_filter_matching() {
        let q = QuoteRecord::new("a", "Life");
        assert!(q.matches(None));
        assert!(q.matches(Some("all")));
        assert!(q.matches(Some("Life")));
        assert!(!q.matches(Some("life")));
        assert!(!q.matches(Some("Motivation")));
    }

    #[test]
    fn test_remote_item_ignores_extra_fields() {
        let items: Vec<RemoteItem> =
            serde_json::from_str(r#"[{"userId":1,"id":1,"title":"hello","body":"x"}]"#).unwrap();
        let record = items.into_iter().next().unwrap().into_record();
        assert_eq!(record, QuoteRecord::new("hello", "Server"));
    }
}
