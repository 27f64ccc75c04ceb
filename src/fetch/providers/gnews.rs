// src/fetch/providers/gnews.rs
//! GNews adapter (`/v4/top-headlines`, JSON).

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::articles::NewsItem;
use crate::fetch::providers::newsapi::parse_rfc3339;
use crate::fetch::{build_item, FetchOutcome, SourceFetcher};
use crate::sources::NewsSource;

const MAX_ARTICLES: u32 = 50;
const INTER_REQUEST_PAUSE: Duration = Duration::from_millis(1500);

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

pub struct GnewsFetcher {
    source: NewsSource,
    client: reqwest::Client,
}

impl GnewsFetcher {
    pub fn new(source: NewsSource, client: reqwest::Client) -> Self {
        Self { source, client }
    }

    async fn fetch_country(&self, country: &str, keywords: &[String]) -> Result<Vec<NewsItem>> {
        let url = format!("{}/top-headlines", self.source.base_url);
        let token = self.source.api_key.as_deref().unwrap_or_default();
        let mut params: Vec<(&str, String)> = vec![
            ("country", country.to_string()),
            ("max", MAX_ARTICLES.to_string()),
            ("token", token.to_string()),
        ];
        if !keywords.is_empty() {
            params.push(("q", keywords.join(" OR ")));
        }

        let body: ApiResponse = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("gnews http get")?
            .error_for_status()
            .context("gnews http status")?
            .json()
            .await
            .context("gnews json body")?;

        let items = body
            .articles
            .into_iter()
            .filter_map(|a| {
                build_item(
                    a.title,
                    a.description,
                    a.url,
                    a.source
                        .and_then(|s| s.name)
                        .unwrap_or_else(|| "GNews".into()),
                    country,
                    a.published_at.as_deref().and_then(parse_rfc3339),
                    a.image,
                    None,
                    keywords,
                )
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl SourceFetcher for GnewsFetcher {
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
                    tracing::warn!(error = ?e, source = "gnews", %country, "country fetch failed");
                    counter!("aggregator_fetch_errors_total").increment(1);
                    outcome.errors += 1;
                }
            }
        }
        Ok(outcome)
    }
}
