// tests/jobs_crud.rs
use mena_news_aggregator::aggregator::Aggregator;
use mena_news_aggregator::config::AggregatorConfig;
use mena_news_aggregator::jobs::{Frequency, JobPatch, JobStatus, NewJob};
use mena_news_aggregator::sources::{NewsSource, SourceRegistry};

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn source(name: &str, key: Option<&str>, countries: &[&str]) -> NewsSource {
    NewsSource {
        name: name.into(),
        base_url: format!("https://{name}.test"),
        api_key: key.map(|k| k.to_string()),
        supported_countries: codes(countries),
        supported_languages: codes(&["en", "ar"]),
        rate_limit: 100,
    }
}

fn aggregator() -> Aggregator {
    let registry = SourceRegistry::new(vec![
        source("keyless", None, &["ae", "sa"]),
        source("gulfwire", Some("k1"), &["ae", "qa"]),
        source("atlantic", Some("k2"), &["us", "gb"]),
    ]);
    Aggregator::new(registry, vec![], AggregatorConfig::default())
}

#[test]
fn creation_defaults_resolve_sources_from_registry() {
    let agg = aggregator();
    let job = agg.create_job(NewJob {
        countries: codes(&["ae"]),
        ..Default::default()
    });

    // keyless is skipped, atlantic has no country overlap
    assert_eq!(job.sources, vec!["gulfwire".to_string()]);
    assert!(job.is_active);
    assert_eq!(job.frequency, Frequency::Daily);
    assert_eq!(job.status, JobStatus::Idle);
    assert_eq!(job.articles_found, 0);
    assert!(job.last_run.is_none());
    assert!(job.next_run.is_none());
    assert!(!job.name.is_empty());
}

#[test]
fn explicit_sources_are_kept_verbatim() {
    let agg = aggregator();
    let job = agg.create_job(NewJob {
        countries: codes(&["ae"]),
        sources: Some(codes(&["atlantic"])),
        ..Default::default()
    });
    assert_eq!(job.sources, vec!["atlantic".to_string()]);
}

#[test]
fn get_update_delete_roundtrip() {
    let agg = aggregator();
    let job = agg.create_job(NewJob {
        name: Some("gulf daily".into()),
        countries: codes(&["ae"]),
        frequency: Some(Frequency::Hourly),
        ..Default::default()
    });

    let fetched = agg.get_job(&job.id).expect("job exists");
    assert_eq!(fetched.name, "gulf daily");

    let updated = agg
        .update_job(
            &job.id,
            JobPatch {
                keywords: Some(codes(&["economy"])),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .expect("job exists");
    assert_eq!(updated.keywords, vec!["economy".to_string()]);
    assert!(!updated.is_active);
    // untouched fields survive the shallow merge
    assert_eq!(updated.frequency, Frequency::Hourly);
    assert_eq!(updated.name, "gulf daily");

    assert!(agg.delete_job(&job.id));
    assert!(!agg.delete_job(&job.id));
    assert!(agg.get_job(&job.id).is_none());
}

#[test]
fn unknown_ids_return_absent_not_errors() {
    let agg = aggregator();
    assert!(agg.get_job("nope").is_none());
    assert!(agg.update_job("nope", JobPatch::default()).is_none());
    assert!(!agg.delete_job("nope"));
}

#[test]
fn list_returns_every_job() {
    let agg = aggregator();
    for _ in 0..3 {
        agg.create_job(NewJob {
            countries: codes(&["ae"]),
            ..Default::default()
        });
    }
    assert_eq!(agg.list_jobs().len(), 3);
}
