// src/sources.rs
//! Static catalogue of upstream news providers and the registry queries
//! the job model uses to resolve which providers apply to a country set.

use serde::Serialize;

/// One upstream provider. Built once at startup, never mutated.
/// A source without an API key is disabled, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct NewsSource {
    pub name: String,
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub supported_countries: Vec<String>,
    pub supported_languages: Vec<String>,
    /// Nominal requests/hour. Advisory only; adapters self-throttle with
    /// fixed inter-request pauses instead of a token bucket.
    pub rate_limit: u32,
}

impl NewsSource {
    pub fn has_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn covers(&self, country: &str) -> bool {
        self.supported_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country))
    }

    pub fn covers_any(&self, countries: &[String]) -> bool {
        countries.iter().any(|c| self.covers(c))
    }
}

pub struct SourceRegistry {
    sources: Vec<NewsSource>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<NewsSource>) -> Self {
        Self { sources }
    }

    /// Fixed provider catalogue with keys taken from the environment:
    /// NEWSAPI_KEY, GNEWS_KEY, NEWSDATA_KEY.
    pub fn from_env() -> Self {
        let key = |name: &str| std::env::var(name).ok().filter(|k| !k.trim().is_empty());
        Self::new(vec![
            NewsSource {
                name: "newsapi".into(),
                base_url: "https://newsapi.org/v2".into(),
                api_key: key("NEWSAPI_KEY"),
                supported_countries: codes(&["ae", "sa", "eg", "ma", "us", "gb", "fr"]),
                supported_languages: codes(&["en", "ar"]),
                rate_limit: 100,
            },
            NewsSource {
                name: "gnews".into(),
                base_url: "https://gnews.io/api/v4".into(),
                api_key: key("GNEWS_KEY"),
                supported_countries: codes(&["ae", "sa", "eg", "qa", "kw", "us", "gb"]),
                supported_languages: codes(&["en", "ar"]),
                rate_limit: 100,
            },
            NewsSource {
                name: "newsdata".into(),
                base_url: "https://newsdata.io/api/1".into(),
                api_key: key("NEWSDATA_KEY"),
                supported_countries: codes(&[
                    "ae", "sa", "eg", "jo", "lb", "ma", "qa", "kw", "bh", "om",
                ]),
                supported_languages: codes(&["en", "ar"]),
                rate_limit: 200,
            },
        ])
    }

    pub fn all(&self) -> &[NewsSource] {
        &self.sources
    }

    pub fn get(&self, name: &str) -> Option<&NewsSource> {
        self.sources.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Names of sources that have a key configured and cover at least one of
    /// the requested countries. Empty when nothing matches or no keys are set.
    pub fn sources_for_countries(&self, countries: &[String]) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| s.has_key() && s.covers_any(countries))
            .map(|s| s.name.clone())
            .collect()
    }
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
