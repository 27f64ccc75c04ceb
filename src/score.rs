// src/score.rs
//! Keyword extraction, relevance scoring, title-prefix deduplication and the
//! relevance filter applied after every fetch.

use crate::articles::NewsItem;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;

const MAX_KEYWORDS: usize = 10;
const MIN_TOKEN_CHARS: usize = 4;

fn word_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    // (?u) so Arabic titles tokenize too
    RE.get_or_init(|| Regex::new(r"(?u)\b\w+\b").expect("word regex"))
}

/// Significant words from title+description: lowercased, punctuation
/// stripped, longer than 3 chars, deduplicated in order, capped to 10.
pub fn extract_keywords(title: &str, description: &str) -> Vec<String> {
    let text = format!("{title} {description}").to_lowercase();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for m in word_re().find_iter(&text) {
        let token = m.as_str();
        if token.chars().count() < MIN_TOKEN_CHARS {
            continue;
        }
        if seen.insert(token.to_string()) {
            out.push(token.to_string());
            if out.len() == MAX_KEYWORDS {
                break;
            }
        }
    }
    out
}

/// Fraction of job keywords found as substrings of the lowercased
/// title+description. A job without keywords scores everything 0.5 flat.
pub fn relevance_score(title: &str, description: &str, job_keywords: &[String]) -> f64 {
    if job_keywords.is_empty() {
        return 0.5;
    }
    let text = format!("{title} {description}").to_lowercase();
    let matched = job_keywords
        .iter()
        .filter(|k| text.contains(&k.to_lowercase()))
        .count();
    matched as f64 / job_keywords.len() as f64
}

/// Two articles are duplicates when the first `prefix_chars` characters of
/// their lowercased titles match exactly. First occurrence wins.
pub fn dedupe_by_title(items: Vec<NewsItem>, prefix_chars: usize) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let key: String = item
            .title
            .to_lowercase()
            .chars()
            .take(prefix_chars)
            .collect();
        if seen.insert(key) {
            out.push(item);
        } else {
            metrics::counter!("aggregator_dedup_total").increment(1);
        }
    }
    out
}

/// Drop items at or below the threshold when the job has keywords; identity
/// when it has none.
pub fn relevance_filter(items: Vec<NewsItem>, has_keywords: bool, threshold: f64) -> Vec<NewsItem> {
    if !has_keywords {
        return items;
    }
    items
        .into_iter()
        .filter(|i| i.relevance_score > threshold)
        .collect()
}
