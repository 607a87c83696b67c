use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::debug;

use crate::{error::AppResult, models::MovieSummary};

/// Read-only movie catalog. One request per call: no paging, caching or retry.
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn fetch_collection(&self) -> AppResult<Vec<MovieSummary>>;

    async fn search(&self, query: &str) -> AppResult<Vec<MovieSummary>>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided; catalog requests will be rejected");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, base_url, limiter }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn get_page(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Vec<MovieSummary>> {
        self.limiter.until_ready().await;

        let resp: PageResponse = self
            .client
            .get(self.url(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(path = %path, results = resp.results.len(), "fetched catalog page");
        Ok(resp.results)
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn fetch_collection(&self) -> AppResult<Vec<MovieSummary>> {
        self.get_page("movie/popular", &[]).await
    }

    async fn search(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        self.get_page("search/movie", &[("query", query)]).await
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    results: Vec<MovieSummary>,
}
