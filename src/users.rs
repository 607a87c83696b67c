use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};
use tracing::debug;

use crate::{
    entities::user,
    error::{AppError, AppResult},
    models::Account,
};

#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an authenticated account. A returning account only has its
    /// email refreshed; profile fields are left alone.
    pub async fn register(&self, account: &Account) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            id: Set(account.id.clone()),
            email: Set(account.email.clone()),
            nickname: Set(None),
            profile_image_url: Set(None),
        };

        user::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_column(user::Column::Email)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        debug!(user_id = %account.id, "registered user");
        self.get(&account.id).await
    }

    pub async fn find(&self, id: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id.to_string()).one(&self.db).await?)
    }

    async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.find(id).await?.ok_or_else(|| AppError::NotFound(format!("user {id}")))
    }

    pub async fn update_nickname(&self, id: &str, nickname: &str) -> AppResult<user::Model> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(AppError::Invalid("nickname must not be empty".to_string()));
        }

        let mut model: user::ActiveModel = self.get(id).await?.into();
        model.nickname = Set(Some(nickname.to_string()));
        let updated = user::Entity::update(model).exec(&self.db).await?;

        debug!(user_id = %id, "updated nickname");
        Ok(updated)
    }

    pub async fn update_profile_image(&self, id: &str, url: &str) -> AppResult<user::Model> {
        let mut model: user::ActiveModel = self.get(id).await?.into();
        model.profile_image_url = Set(Some(url.to_string()));
        let updated = user::Entity::update(model).exec(&self.db).await?;

        debug!(user_id = %id, "updated profile image");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestDb, account};

    #[tokio::test]
    async fn register_creates_then_refreshes_email_only() {
        let db = TestDb::new().await;
        let users = UserRepository::new(db.conn());

        let created = users.register(&account("u1", "old@example.com")).await.unwrap();
        assert_eq!(created.email, "old@example.com");
        assert_eq!(created.nickname, None);

        users.update_nickname("u1", "  Ripley ").await.unwrap();
        let again = users.register(&account("u1", "new@example.com")).await.unwrap();
        assert_eq!(again.email, "new@example.com");
        assert_eq!(again.nickname.as_deref(), Some("Ripley"));
    }

    #[tokio::test]
    async fn updates_require_an_existing_user() {
        let db = TestDb::new().await;
        let users = UserRepository::new(db.conn());

        assert!(users.find("ghost").await.unwrap().is_none());
        assert!(matches!(users.update_nickname("ghost", "Boo").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            users.update_profile_image("ghost", "https://cdn.example.com/a.png").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_blank_nickname_and_stores_image() {
        let db = TestDb::new().await;
        let users = UserRepository::new(db.conn());
        users.register(&account("u1", "a@example.com")).await.unwrap();

        assert!(matches!(users.update_nickname("u1", "   ").await, Err(AppError::Invalid(_))));

        let updated =
            users.update_profile_image("u1", "https://cdn.example.com/u1.png").await.unwrap();
        assert_eq!(updated.profile_image_url.as_deref(), Some("https://cdn.example.com/u1.png"));
    }
}
