use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::warn;

use crate::{
    entities::user,
    error::{AppError, AppResult},
    models::ViewState,
    users::UserRepository,
};

/// Remote file storage for profile images. Returns a retrievable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> AppResult<String>;
}

pub struct ProfileHolder {
    users: UserRepository,
    blobs: Arc<dyn BlobStore>,
    profile: watch::Sender<ViewState<user::Model>>,
    error: watch::Sender<Option<String>>,
}

impl ProfileHolder {
    pub fn new(users: UserRepository, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            users,
            blobs,
            profile: watch::channel(ViewState::Loading).0,
            error: watch::channel(None).0,
        }
    }

    pub fn profile(&self) -> watch::Receiver<ViewState<user::Model>> {
        self.profile.subscribe()
    }

    pub fn current(&self) -> ViewState<user::Model> {
        self.profile.borrow().clone()
    }

    /// Failures of profile edits; load failures go to the profile itself.
    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    pub async fn load(&self, user_id: &str) {
        self.profile.send_replace(ViewState::Loading);

        let state = match self.users.find(user_id).await {
            Ok(Some(user)) => ViewState::Success(user),
            Ok(None) => ViewState::Error(AppError::NotFound(format!("user {user_id}")).to_string()),
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "failed to load profile");
                ViewState::Error(err.to_string())
            },
        };
        self.profile.send_replace(state);
    }

    pub async fn rename(&self, user_id: &str, nickname: &str) -> AppResult<user::Model> {
        let result = self.users.update_nickname(user_id, nickname).await;
        self.apply(user_id, result)
    }

    pub async fn upload_image(&self, user_id: &str, bytes: Vec<u8>) -> AppResult<user::Model> {
        let result = async {
            let url = self.blobs.upload(&format!("profile_images/{user_id}"), bytes).await?;
            self.users.update_profile_image(user_id, &url).await
        }
        .await;
        self.apply(user_id, result)
    }

    fn apply(&self, user_id: &str, result: AppResult<user::Model>) -> AppResult<user::Model> {
        match &result {
            Ok(user) => {
                self.error.send_replace(None);
                self.profile.send_replace(ViewState::Success(user.clone()));
            },
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "profile update failed");
                self.error.send_replace(Some(err.to_string()));
            },
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBlobs, TestDb, account};

    async fn setup(broken_blobs: bool) -> (TestDb, ProfileHolder) {
        let db = TestDb::new().await;
        let users = UserRepository::new(db.conn());
        users.register(&account("u1", "ripley@example.com")).await.unwrap();
        let holder = ProfileHolder::new(users, Arc::new(FakeBlobs { broken: broken_blobs }));
        (db, holder)
    }

    #[tokio::test]
    async fn load_moves_from_loading_to_success() {
        let (_db, holder) = setup(false).await;
        assert!(holder.current().is_loading());

        holder.load("u1").await;
        assert_eq!(holder.current().value().unwrap().email, "ripley@example.com");
    }

    #[tokio::test]
    async fn unknown_user_is_an_error_state() {
        let (_db, holder) = setup(false).await;
        holder.load("nobody").await;
        assert!(holder.current().error().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn edits_republish_profile() {
        let (_db, holder) = setup(false).await;
        holder.load("u1").await;

        holder.rename("u1", "Ellen").await.unwrap();
        assert_eq!(holder.current().value().unwrap().nickname.as_deref(), Some("Ellen"));

        holder.upload_image("u1", vec![0u8; 16]).await.unwrap();
        let url = holder.current().value().unwrap().profile_image_url.clone().unwrap();
        assert_eq!(url, "https://blobs.example.com/profile_images/u1?size=16");
    }

    #[tokio::test]
    async fn failed_upload_keeps_profile_and_reports() {
        let (_db, holder) = setup(true).await;
        holder.load("u1").await;

        assert!(holder.upload_image("u1", vec![1, 2, 3]).await.is_err());
        assert!(holder.current().value().unwrap().profile_image_url.is_none());
        assert!(holder.error().borrow().as_deref().unwrap().contains("quota"));
    }
}
