// src/aggregator.rs
//! The aggregation service: owns the job map and the article store, resolves
//! sources, and runs the fetch-merge-score-store pipeline.
//!
//! Both collections sit behind their own lock and no lock is ever held
//! across an await point; job runs read a snapshot of the job, fetch without
//! locks, then write results back.

use anyhow::Result;
use chrono::Utc;
use metrics::{counter, gauge};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::articles::{ArticleStore, NewsItem};
use crate::config::AggregatorConfig;
use crate::fetch::{self, FetchOutcome, SourceFetcher};
use crate::jobs::{AggregationJob, Frequency, JobPatch, JobStatus, NewJob};
use crate::score;
use crate::sources::SourceRegistry;

pub struct Aggregator {
    registry: SourceRegistry,
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    config: AggregatorConfig,
    jobs: RwLock<HashMap<String, AggregationJob>>,
    store: RwLock<ArticleStore>,
}

impl Aggregator {
    pub fn new(
        registry: SourceRegistry,
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        config: AggregatorConfig,
    ) -> Self {
        fetch::ensure_metrics_described();
        let store = ArticleStore::new(config.store_cap);
        Self {
            registry,
            fetchers,
            config,
            jobs: RwLock::new(HashMap::new()),
            store: RwLock::new(store),
        }
    }

    // ---- Job CRUD ----

    pub fn create_job(&self, new: NewJob) -> AggregationJob {
        let id = uuid::Uuid::new_v4().to_string();
        let sources = new
            .sources
            .unwrap_or_else(|| self.registry.sources_for_countries(&new.countries));
        let job = AggregationJob {
            name: new.name.unwrap_or_else(|| format!("job-{}", &id[..8])),
            id,
            countries: new.countries,
            keywords: new.keywords,
            sources,
            is_active: new.is_active.unwrap_or(true),
            last_run: None,
            next_run: None,
            frequency: new.frequency.unwrap_or(Frequency::Daily),
            articles_found: 0,
            status: JobStatus::Idle,
        };
        self.jobs
            .write()
            .expect("jobs lock poisoned")
            .insert(job.id.clone(), job.clone());
        tracing::info!(job = %job.id, name = %job.name, "aggregation job created");
        job
    }

    pub fn get_job(&self, id: &str) -> Option<AggregationJob> {
        self.jobs.read().expect("jobs lock poisoned").get(id).cloned()
    }

    pub fn list_jobs(&self) -> Vec<AggregationJob> {
        self.jobs
            .read()
            .expect("jobs lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn update_job(&self, id: &str, patch: JobPatch) -> Option<AggregationJob> {
        let mut jobs = self.jobs.write().expect("jobs lock poisoned");
        let job = jobs.get_mut(id)?;
        patch.apply(job);
        Some(job.clone())
    }

    pub fn delete_job(&self, id: &str) -> bool {
        self.jobs
            .write()
            .expect("jobs lock poisoned")
            .remove(id)
            .is_some()
    }

    // ---- Article store ----

    pub fn news_items(&self, limit: usize, offset: usize) -> Vec<NewsItem> {
        self.store.read().expect("store lock poisoned").page(limit, offset)
    }

    pub fn article_count(&self) -> usize {
        self.store.read().expect("store lock poisoned").len()
    }

    // ---- Pipeline ----

    /// Scan every job and run the due ones, sequentially. A job failure
    /// flips that job to error status and never escapes to the caller, so
    /// the remaining due jobs still run on the same tick.
    pub async fn run_due_jobs(&self) {
        let now = Utc::now();
        let due: Vec<String> = {
            let jobs = self.jobs.read().expect("jobs lock poisoned");
            jobs.values()
                .filter(|j| j.is_due(now))
                .map(|j| j.id.clone())
                .collect()
        };
        for id in due {
            self.run_job(&id).await;
        }
    }

    /// Execute one aggregation cycle for a job. Returns the updated job, or
    /// `None` if the id is unknown.
    pub async fn run_job(&self, id: &str) -> Option<AggregationJob> {
        // Step 1: mark running and stamp last_run before any fetch.
        let snapshot = {
            let mut jobs = self.jobs.write().expect("jobs lock poisoned");
            let job = jobs.get_mut(id)?;
            job.status = JobStatus::Running;
            job.last_run = Some(Utc::now());
            job.clone()
        };
        tracing::info!(job = %snapshot.id, name = %snapshot.name, "job run started");

        match self.fetch_and_store(&snapshot).await {
            Ok(kept) => {
                let mut jobs = self.jobs.write().expect("jobs lock poisoned");
                let job = jobs.get_mut(id)?;
                job.articles_found += kept as u64;
                job.status = JobStatus::Idle;
                job.next_run = Some(Utc::now() + job.frequency.interval());
                counter!("aggregator_runs_total").increment(1);
                gauge!("aggregator_last_run_ts").set(Utc::now().timestamp() as f64);
                tracing::info!(job = %job.id, kept, "job run finished");
                Some(job.clone())
            }
            Err(e) => {
                // last_run stays stamped so the job is not immediately due
                // again; next_run is left untouched.
                let mut jobs = self.jobs.write().expect("jobs lock poisoned");
                let job = jobs.get_mut(id)?;
                job.status = JobStatus::Error;
                counter!("aggregator_runs_total").increment(1);
                counter!("aggregator_job_failures_total").increment(1);
                tracing::warn!(job = %job.id, error = ?e, "job run failed");
                Some(job.clone())
            }
        }
    }

    /// Steps 2-6: fetch, dedupe, relevance-filter, append. Returns the
    /// number of survivors appended to the store.
    async fn fetch_and_store(&self, job: &AggregationJob) -> Result<usize> {
        let outcome = self
            .fetch_from(&job.sources, &job.countries, &job.keywords)
            .await?;
        if outcome.errors > 0 {
            tracing::warn!(job = %job.id, errors = outcome.errors, "job ran with degraded sources");
        }

        let deduped = score::dedupe_by_title(outcome.items, self.config.dedup_prefix_chars);
        let deduped_len = deduped.len();
        let survivors = score::relevance_filter(
            deduped,
            !job.keywords.is_empty(),
            self.config.relevance_threshold,
        );
        let kept = survivors.len();
        counter!("aggregator_items_kept_total").increment(kept as u64);
        counter!("aggregator_filtered_total").increment((deduped_len - kept) as u64);

        self.store.write().expect("store lock poisoned").append(survivors);
        Ok(kept)
    }

    /// On-demand fetch outside the schedule: same fetch + dedup rules, no
    /// job bookkeeping, nothing written to the shared store. Per-fetcher
    /// failures are logged and skipped; the admin gets whatever succeeded.
    pub async fn manual_fetch(&self, countries: &[String], keywords: &[String]) -> Vec<NewsItem> {
        let sources = self.registry.sources_for_countries(countries);
        let mut merged = FetchOutcome::default();
        for fetcher in self.fetchers_named(&sources) {
            match fetcher.fetch(countries, keywords).await {
                Ok(outcome) => merged.merge(outcome),
                Err(e) => {
                    tracing::warn!(source = fetcher.name(), error = ?e, "manual fetch source failed")
                }
            }
        }
        score::dedupe_by_title(merged.items, self.config.dedup_prefix_chars)
    }

    async fn fetch_from(
        &self,
        sources: &[String],
        countries: &[String],
        keywords: &[String],
    ) -> Result<FetchOutcome> {
        let mut merged = FetchOutcome::default();
        for fetcher in self.fetchers_named(sources) {
            merged.merge(fetcher.fetch(countries, keywords).await?);
        }
        Ok(merged)
    }

    fn fetchers_named(&self, names: &[String]) -> Vec<Arc<dyn SourceFetcher>> {
        self.fetchers
            .iter()
            .filter(|f| names.iter().any(|n| n.eq_ignore_ascii_case(f.name())))
            .cloned()
            .collect()
    }
}
