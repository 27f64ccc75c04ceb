// src/fetch/providers/newsdata.rs
//! NewsData.io adapter (`/api/1/news`, JSON). Dates arrive as naive
//! `YYYY-MM-DD HH:MM:SS` strings in UTC; categories come as an array of
//! which we keep the first.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::articles::NewsItem;
use crate::fetch::{build_item, FetchOutcome, SourceFetcher};
use crate::sources::NewsSource;

const INTER_REQUEST_PAUSE: Duration = Duration::from_millis(2000);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    results: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    image_url: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source_id: Option<String>,
    #[serde(default)]
    category: Vec<String>,
}

pub struct NewsDataFetcher {
    source: NewsSource,
    client: reqwest::Client,
}

impl NewsDataFetcher {
    pub fn new(source: NewsSource, client: reqwest::Client) -> Self {
        Self { source, client }
    }

    async fn fetch_country(&self, country: &str, keywords: &[String]) -> Result<Vec<NewsItem>> {
        let url = format!("{}/news", self.source.base_url);
        let api_key = self.source.api_key.as_deref().unwrap_or_default();
        let mut params: Vec<(&str, String)> = vec![
            ("apikey", api_key.to_string()),
            ("country", country.to_string()),
        ];
        if !keywords.is_empty() {
            // NewsData has no OR syntax on the free tier; plain join.
            params.push(("q", keywords.join(" ")));
        }

        let body: ApiResponse = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("newsdata http get")?
            .error_for_status()
            .context("newsdata http status")?
            .json()
            .await
            .context("newsdata json body")?;
        if body.status != "success" {
            return Err(anyhow!("newsdata error response: status={}", body.status));
        }

        let items = body
            .results
            .into_iter()
            .filter_map(|a| {
                build_item(
                    a.title,
                    a.description,
                    a.link,
                    a.source_id.unwrap_or_else(|| "NewsData".into()),
                    country,
                    a.pub_date.as_deref().and_then(parse_naive_utc),
                    a.image_url,
                    a.category.into_iter().next(),
                    keywords,
                )
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl SourceFetcher for NewsDataFetcher {
    fn name(&self) -> &str {
        &self.source.name
    }

    async fn fetch(&self, countries: &[String], keywords: &[String]) -> Result<FetchOutcome> {
        let mut outcome = FetchOutcome::default();
        let targets: Vec<&String> = countries.iter().filter(|c| self.source.covers(c)).collect();
        for (i, country) in targets.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(INTER_REQUEST_PAUSE).await;
            }
            match self.fetch_country(country, keywords).await {
                Ok(items) => {
                    counter!("aggregator_items_fetched_total").increment(items.len() as u64);
                    outcome.items.extend(items);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, source = "newsdata", %country, "country fetch failed");
                    counter!("aggregator_fetch_errors_total").increment(1);
                    outcome.errors += 1;
                }
            }
        }
        Ok(outcome)
    }
}

fn parse_naive_utc(ts: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|ndt| ndt.and_utc())
}
