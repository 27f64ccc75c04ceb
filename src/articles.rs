// src/articles.rs
//! Normalized article records and the bounded, newest-first in-memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "general";

/// One normalized article from any provider. Never mutated after creation.
/// The Arabic variants exist for the publishing layer; the aggregator itself
/// never fills them (translation happens downstream).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_ar: Option<String>,
    /// Canonical upstream URL. Not globally unique across providers.
    pub url: String,
    /// Provider name as reported by the upstream API; may differ from the
    /// registry name of the source it was fetched through.
    pub source: String,
    pub country: String,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub category: String,
    pub keywords: Vec<String>,
    pub relevance_score: f64,
}

/// Shared article store, capped and kept sorted by `published_at` descending.
/// Ordering is re-established after every append, not maintained
/// incrementally, so readers always see a fully sorted snapshot.
pub struct ArticleStore {
    items: Vec<NewsItem>,
    cap: usize,
}

impl ArticleStore {
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            cap,
        }
    }

    pub fn append(&mut self, new_items: Vec<NewsItem>) {
        self.items.extend(new_items);
        self.items
            .sort_by(|a, b| b.published_at.cmp(&a.published_at));
        self.items.truncate(self.cap);
    }

    pub fn page(&self, limit: usize, offset: usize) -> Vec<NewsItem> {
        self.items.iter().skip(offset).take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
