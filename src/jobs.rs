// src/jobs.rs
//! Aggregation jobs: the named, schedulable units the scheduler runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
}

impl Frequency {
    pub fn interval_hours(self) -> i64 {
        match self {
            Frequency::Hourly => 1,
            Frequency::Daily => 24,
            Frequency::Weekly => 168,
        }
    }

    pub fn interval(self) -> Duration {
        Duration::hours(self.interval_hours())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
    Error,
}

/// A job's status is `Running` for exactly one fetch-and-merge cycle; the
/// due-check refuses running jobs, so a cycle is never re-entered. `Error`
/// is not terminal: the job becomes due again after its normal interval.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationJob {
    pub id: String,
    pub name: String,
    pub countries: Vec<String>,
    /// Empty means no keyword filter.
    pub keywords: Vec<String>,
    /// Registry names of the sources this job queries.
    pub sources: Vec<String>,
    pub is_active: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub frequency: Frequency,
    /// Relevant articles ever contributed by this job. Monotonic.
    pub articles_found: u64,
    pub status: JobStatus,
}

impl AggregationJob {
    /// Coarse due-check: active, not running, and either never run or at
    /// least one frequency interval of whole hours elapsed since `last_run`.
    /// With an hourly scheduler tick a job can run up to one tick late;
    /// that slack is accepted.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.status == JobStatus::Running {
            return false;
        }
        match self.last_run {
            None => true,
            Some(last) => (now - last).num_hours() >= self.frequency.interval_hours(),
        }
    }
}

/// Partial input for job creation. Missing fields are defaulted; `sources`
/// defaults to every keyed source covering at least one target country.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub name: Option<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub sources: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub frequency: Option<Frequency>,
}

/// Shallow-merge update: only supplied fields replace existing ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub name: Option<String>,
    pub countries: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub sources: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub frequency: Option<Frequency>,
}

impl JobPatch {
    pub fn apply(self, job: &mut AggregationJob) {
        if let Some(name) = self.name {
            job.name = name;
        }
        if let Some(countries) = self.countries {
            job.countries = countries;
        }
        if let Some(keywords) = self.keywords {
            job.keywords = keywords;
        }
        if let Some(sources) = self.sources {
            job.sources = sources;
        }
        if let Some(is_active) = self.is_active {
            job.is_active = is_active;
        }
        if let Some(frequency) = self.frequency {
            job.frequency = frequency;
        }
    }
}
