// src/fetch/providers/newsapi.rs
//! NewsAPI.org adapter (`/v2/top-headlines`, JSON).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::articles::NewsItem;
use crate::fetch::{build_item, FetchOutcome, SourceFetcher};
use crate::sources::NewsSource;

const PAGE_SIZE: u32 = 50;
const INTER_REQUEST_PAUSE: Duration = Duration::from_millis(1000);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    message: Option<String>,
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct Article {
    source: Option<ArticleSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

pub struct NewsApiFetcher {
    source: NewsSource,
    client: reqwest::Client,
}

impl NewsApiFetcher {
    pub fn new(source: NewsSource, client: reqwest::Client) -> Self {
        Self { source, client }
    }

    async fn fetch_country(&self, country: &str, keywords: &[String]) -> Result<Vec<NewsItem>> {
        let url = format!("{}/top-headlines", self.source.base_url);
        let api_key = self.source.api_key.as_deref().unwrap_or_default();
        let mut params: Vec<(&str, String)> = vec![
            ("country", country.to_string()),
            ("pageSize", PAGE_SIZE.to_string()),
            ("apiKey", api_key.to_string()),
        ];
        if !keywords.is_empty() {
            params.push(("q", keywords.join(" OR ")));
        }

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("newsapi http get")?
            .error_for_status()
            .context("newsapi http status")?;
        let body: ApiResponse = resp.json().await.context("newsapi json body")?;
        if body.status != "ok" {
            return Err(anyhow!(
                "newsapi error response: {}",
                body.message.unwrap_or_else(|| "unknown".into())
            ));
        }

        let items = body
            .articles
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                build_item(
                    a.title,
                    a.description,
                    a.url,
                    a.source
                        .and_then(|s| s.name)
                        .unwrap_or_else(|| "NewsAPI".into()),
                    country,
                    a.published_at.as_deref().and_then(parse_rfc3339),
                    a.url_to_image,
                    None,
                    keywords,
                )
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl SourceFetcher for NewsApiFetcher {
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
                    tracing::warn!(error = ?e, source = "newsapi", %country, "country fetch failed");
                    counter!("aggregator_fetch_errors_total").increment(1);
                    outcome.errors += 1;
                }
            }
        }
        Ok(outcome)
    }
}

pub(crate) fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
