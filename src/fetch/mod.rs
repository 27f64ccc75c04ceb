// src/fetch/mod.rs
pub mod providers;

use crate::articles::{NewsItem, DEFAULT_CATEGORY};
use crate::score;
use crate::sources::SourceRegistry;
use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use self::providers::{gnews::GnewsFetcher, newsapi::NewsApiFetcher, newsdata::NewsDataFetcher};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("aggregator_runs_total", "Completed job runs (any outcome).");
        describe_counter!(
            "aggregator_items_fetched_total",
            "Articles normalized from upstream responses."
        );
        describe_counter!(
            "aggregator_items_kept_total",
            "Articles surviving dedup + relevance filter."
        );
        describe_counter!("aggregator_dedup_total", "Articles removed as title duplicates.");
        describe_counter!(
            "aggregator_filtered_total",
            "Articles dropped by the relevance filter."
        );
        describe_counter!(
            "aggregator_fetch_errors_total",
            "Per-country upstream fetch/parse failures."
        );
        describe_counter!("aggregator_job_failures_total", "Job runs ending in error status.");
        describe_gauge!(
            "aggregator_last_run_ts",
            "Unix ts when a job run last completed."
        );
    });
}

/// Merged result of one adapter's fan-out across countries. `errors` counts
/// per-country failures the adapter swallowed; degraded source health stays
/// observable without aborting sibling fetches.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<NewsItem>,
    pub errors: usize,
}

impl FetchOutcome {
    pub fn merge(&mut self, other: FetchOutcome) {
        self.items.extend(other.items);
        self.errors += other.errors;
    }
}

/// One upstream provider integration. Implementations catch their own
/// per-country failures; an `Err` here means something escaped that catch
/// and aborts the surrounding job run.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, countries: &[String], keywords: &[String]) -> Result<FetchOutcome>;
}

/// Normalize one upstream record. Records missing a title or URL are skipped;
/// description/category/published_at get defaults; keywords and relevance are
/// derived here so every provider shares the same rules.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_item(
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: String,
    country: &str,
    published_at: Option<DateTime<Utc>>,
    image_url: Option<String>,
    category: Option<String>,
    job_keywords: &[String],
) -> Option<NewsItem> {
    let title = title.filter(|t| !t.trim().is_empty())?;
    let url = url.filter(|u| !u.trim().is_empty())?;
    let description = description.unwrap_or_default();
    Some(NewsItem {
        id: uuid::Uuid::new_v4().to_string(),
        keywords: score::extract_keywords(&title, &description),
        relevance_score: score::relevance_score(&title, &description, job_keywords),
        title,
        description,
        title_ar: None,
        description_ar: None,
        url,
        source,
        country: country.to_string(),
        published_at: published_at.unwrap_or_else(Utc::now),
        image_url,
        category: category.filter(|c| !c.is_empty()).unwrap_or_else(|| DEFAULT_CATEGORY.into()),
    })
}

/// Build one adapter per catalogued source that has a key configured.
/// Keyless sources are skipped silently (configuration gap, not an error).
pub fn build_fetchers(
    registry: &SourceRegistry,
    client: &reqwest::Client,
) -> Vec<Arc<dyn SourceFetcher>> {
    let mut out: Vec<Arc<dyn SourceFetcher>> = Vec::new();
    for source in registry.all() {
        if !source.has_key() {
            tracing::warn!(source = %source.name, "no API key configured, source disabled");
            continue;
        }
        match source.name.as_str() {
            "newsapi" => out.push(Arc::new(NewsApiFetcher::new(source.clone(), client.clone()))),
            "gnews" => out.push(Arc::new(GnewsFetcher::new(source.clone(), client.clone()))),
            "newsdata" => out.push(Arc::new(NewsDataFetcher::new(source.clone(), client.clone()))),
            other => tracing::warn!(source = %other, "no adapter for catalogued source"),
        }
    }
    out
}
