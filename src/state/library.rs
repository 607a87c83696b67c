use tokio::sync::watch;
use tracing::warn;

use crate::{
    entities::movie_state,
    error::AppResult,
    models::{MovieFlag, ViewState},
    states::StateRepository,
};

pub type MovieList = ViewState<Vec<movie_state::Model>>;

/// Favorites, watched and want-to-watch lists for the signed-in user.
pub struct LibraryHolder {
    states: StateRepository,
    favorites: watch::Sender<MovieList>,
    watched: watch::Sender<MovieList>,
    want_to_watch: watch::Sender<MovieList>,
    error: watch::Sender<Option<String>>,
}

impl LibraryHolder {
    pub fn new(states: StateRepository) -> Self {
        Self {
            states,
            favorites: watch::channel(MovieList::empty()).0,
            watched: watch::channel(MovieList::empty()).0,
            want_to_watch: watch::channel(MovieList::empty()).0,
            error: watch::channel(None).0,
        }
    }

    fn sender(&self, flag: MovieFlag) -> &watch::Sender<MovieList> {
        match flag {
            MovieFlag::Favorite => &self.favorites,
            MovieFlag::Watched => &self.watched,
            MovieFlag::WantToWatch => &self.want_to_watch,
        }
    }

    pub fn list(&self, flag: MovieFlag) -> watch::Receiver<MovieList> {
        self.sender(flag).subscribe()
    }

    pub fn current(&self, flag: MovieFlag) -> MovieList {
        self.sender(flag).borrow().clone()
    }

    /// Reason the last toggle failed, cleared by the next success.
    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    /// Re-reads all three lists for `user_id` and republishes them.
    pub async fn refresh(&self, user_id: &str) {
        for flag in MovieFlag::ALL {
            self.sender(flag).send_replace(ViewState::Loading);
        }

        let (favorites, watched, want_to_watch) = futures::join!(
            self.states.list_by_user_and_flag(user_id, MovieFlag::Favorite),
            self.states.list_by_user_and_flag(user_id, MovieFlag::Watched),
            self.states.list_by_user_and_flag(user_id, MovieFlag::WantToWatch),
        );

        self.publish(user_id, MovieFlag::Favorite, favorites);
        self.publish(user_id, MovieFlag::Watched, watched);
        self.publish(user_id, MovieFlag::WantToWatch, want_to_watch);
    }

    fn publish(&self, user_id: &str, flag: MovieFlag, result: AppResult<Vec<movie_state::Model>>) {
        let state = match result {
            Ok(records) => ViewState::Success(records),
            Err(err) => {
                warn!(user_id = %user_id, flag = %flag, error = %err, "failed to load list");
                ViewState::Error(err.to_string())
            },
        };
        self.sender(flag).send_replace(state);
    }

    pub async fn toggle(
        &self,
        user_id: &str,
        record: &movie_state::Model,
        flag: MovieFlag,
    ) -> AppResult<movie_state::Model> {
        match self.states.toggle_flag(user_id, record, flag).await {
            Ok(stored) => {
                self.error.send_replace(None);
                self.refresh(user_id).await;
                Ok(stored)
            },
            Err(err) => {
                warn!(user_id = %user_id, remote_id = record.remote_id, flag = %flag, error = %err, "toggle failed");
                self.error.send_replace(Some(err.to_string()));
                Err(err)
            },
        }
    }

    /// Drops everything shown for the previous user.
    pub fn clear(&self) {
        for flag in MovieFlag::ALL {
            self.sender(flag).send_replace(MovieList::empty());
        }
        self.error.send_replace(None);
    }
}
