use futures::StreamExt;
use tokio::{sync::watch, task::JoinHandle};
use tracing::warn;

use crate::{
    comments::CommentRepository,
    entities::comment,
    error::AppResult,
    models::ViewState,
};

pub type CommentList = ViewState<Vec<comment::Model>>;

/// Comment thread for one movie screen. The subscription task lives as long
/// as the holder; dropping the holder cancels it.
pub struct CommentsHolder {
    repo: CommentRepository,
    movie_id: i32,
    comments: watch::Receiver<CommentList>,
    error: watch::Sender<Option<String>>,
    task: JoinHandle<()>,
}

impl CommentsHolder {
    /// Must be called inside a tokio runtime.
    pub fn bind(repo: CommentRepository, movie_id: i32) -> Self {
        let (tx, comments) = watch::channel(ViewState::Loading);
        let mut feed = repo.observe_for_movie(movie_id);

        let task = tokio::spawn(async move {
            while let Some(next) = feed.next().await {
                let state = match next {
                    Ok(list) => ViewState::Success(list),
                    Err(err) => {
                        warn!(movie_id, error = %err, "failed to load comments");
                        ViewState::Error(err.to_string())
                    },
                };
                if tx.send(state).is_err() {
                    break;
                }
            }
        });

        Self { repo, movie_id, comments, error: watch::channel(None).0, task }
    }

    pub fn movie_id(&self) -> i32 {
        self.movie_id
    }

    pub fn comments(&self) -> watch::Receiver<CommentList> {
        self.comments.clone()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    pub async fn add(&self, user_id: &str, content: &str) -> AppResult<comment::Model> {
        let result = self.repo.add(user_id, self.movie_id, content).await;
        self.record(result)
    }

    pub async fn edit(&self, id: i32, content: &str) -> AppResult<comment::Model> {
        let result = self.repo.update(id, content).await;
        self.record(result)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = self.repo.delete(id).await;
        self.record(result)
    }

    fn record<T>(&self, result: AppResult<T>) -> AppResult<T> {
        match &result {
            Ok(_) => self.error.send_replace(None),
            Err(err) => {
                warn!(movie_id = self.movie_id, error = %err, "comment change failed");
                self.error.send_replace(Some(err.to_string()))
            },
        };
        result
    }
}

impl Drop for CommentsHolder {
    fn drop(&mut self) {
        self.task.abort();
    }
}
