use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    error::AppResult,
    models::{MovieSummary, ViewState},
    tmdb::MovieSource,
};

pub type MovieResults = ViewState<Vec<MovieSummary>>;

/// Catalog browsing and search. Remote failures end up in the published
/// state, never in the caller.
pub struct BrowseHolder {
    source: Arc<dyn MovieSource>,
    movies: watch::Sender<MovieResults>,
}

impl BrowseHolder {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self { source, movies: watch::channel(MovieResults::empty()).0 }
    }

    pub fn movies(&self) -> watch::Receiver<MovieResults> {
        self.movies.subscribe()
    }

    pub fn current(&self) -> MovieResults {
        self.movies.borrow().clone()
    }

    pub async fn load(&self) {
        self.movies.send_replace(ViewState::Loading);
        let result = self.source.fetch_collection().await;
        self.publish(result);
    }

    /// A blank query shows the default collection.
    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return self.load().await;
        }

        self.movies.send_replace(ViewState::Loading);
        let result = self.source.search(query).await;
        self.publish(result);
    }

    fn publish(&self, result: AppResult<Vec<MovieSummary>>) {
        let state = match result {
            Ok(movies) => {
                debug!(count = movies.len(), "catalog results");
                ViewState::Success(movies)
            },
            Err(err) => {
                warn!(error = %err, "catalog request failed");
                ViewState::Error(err.to_string())
            },
        };
        self.movies.send_replace(state);
    }
}
