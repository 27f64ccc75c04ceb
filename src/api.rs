// src/api.rs
//! Thin HTTP surface over the aggregator for the admin dashboard. Handlers
//! only translate between JSON and the service; all behavior lives in
//! `aggregator`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;
use crate::articles::NewsItem;
use crate::jobs::{AggregationJob, JobPatch, NewJob};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(list_news))
        .route("/api/aggregation/jobs", get(list_jobs).post(create_job))
        .route(
            "/api/aggregation/jobs/{id}",
            get(get_job).patch(update_job).delete(delete_job),
        )
        .route("/api/aggregation/jobs/{id}/run", post(run_job))
        .route("/api/aggregation/fetch", post(manual_fetch))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct NewsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_limit() -> usize {
    50
}

async fn list_news(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Json<Vec<NewsItem>> {
    Json(state.aggregator.news_items(q.limit, q.offset))
}

async fn list_jobs(State(state): State<AppState>) -> Json<Vec<AggregationJob>> {
    Json(state.aggregator.list_jobs())
}

async fn create_job(
    State(state): State<AppState>,
    Json(body): Json<NewJob>,
) -> (StatusCode, Json<AggregationJob>) {
    (StatusCode::CREATED, Json(state.aggregator.create_job(body)))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AggregationJob>, StatusCode> {
    state
        .aggregator
        .get_job(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<AggregationJob>, StatusCode> {
    state
        .aggregator
        .update_job(&id, patch)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_job(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.aggregator.delete_job(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Admin-triggered immediate run, outside the schedule. Runs synchronously
/// and returns the job's post-run state.
async fn run_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AggregationJob>, StatusCode> {
    state
        .aggregator
        .run_job(&id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct ManualFetchReq {
    countries: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

async fn manual_fetch(
    State(state): State<AppState>,
    Json(body): Json<ManualFetchReq>,
) -> Json<Vec<NewsItem>> {
    Json(
        state
            .aggregator
            .manual_fetch(&body.countries, &body.keywords)
            .await,
    )
}
