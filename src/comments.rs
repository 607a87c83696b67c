use futures::stream::BoxStream;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::debug;

use crate::{
    changes::ChangeFeed,
    db::Store,
    entities::comment,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl CommentRepository {
    pub fn new(store: &Store) -> Self {
        Self { db: store.conn().clone(), changes: store.comments_feed().clone() }
    }

    /// Comments on `movie_id`, newest first, re-emitted on every change.
    pub fn observe_for_movie(
        &self,
        movie_id: i32,
    ) -> BoxStream<'static, AppResult<Vec<comment::Model>>> {
        let db = self.db.clone();
        self.changes.observe(move || {
            let db = db.clone();
            async move { query_movie(&db, movie_id).await }
        })
    }

    pub async fn list_for_movie(&self, movie_id: i32) -> AppResult<Vec<comment::Model>> {
        query_movie(&self.db, movie_id).await
    }

    pub async fn add(&self, user_id: &str, movie_id: i32, content: &str) -> AppResult<comment::Model> {
        self.add_at(user_id, movie_id, content, jiff::Timestamp::now()).await
    }

    pub async fn add_at(
        &self,
        user_id: &str,
        movie_id: i32,
        content: &str,
        at: jiff::Timestamp,
    ) -> AppResult<comment::Model> {
        let content = validate(content)?;
        let model = comment::ActiveModel {
            id: NotSet,
            user_id: Set(user_id.to_string()),
            movie_id: Set(movie_id),
            content: Set(content),
            created_at: Set(at.as_millisecond()),
        };

        let res = comment::Entity::insert(model).exec(&self.db).await?;
        self.changes.notify();

        debug!(user_id = %user_id, movie_id, comment_id = res.last_insert_id, "added comment");
        self.get(res.last_insert_id).await
    }

    pub async fn update(&self, id: i32, content: &str) -> AppResult<comment::Model> {
        let content = validate(content)?;
        let mut model: comment::ActiveModel = self.get(id).await?.into();
        model.content = Set(content);
        let updated = comment::Entity::update(model).exec(&self.db).await?;
        self.changes.notify();

        debug!(comment_id = id, "updated comment");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let res = comment::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound(format!("comment {id}")));
        }
        self.changes.notify();

        debug!(comment_id = id, "deleted comment");
        Ok(())
    }

    async fn get(&self, id: i32) -> AppResult<comment::Model> {
        comment::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {id}")))
    }
}

fn validate(content: &str) -> AppResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Invalid("comment must not be empty".to_string()));
    }
    Ok(content.to_string())
}

async fn query_movie(db: &DatabaseConnection, movie_id: i32) -> AppResult<Vec<comment::Model>> {
    let comments = comment::Entity::find()
        .filter(comment::Column::MovieId.eq(movie_id))
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .all(db)
        .await?;
    Ok(comments)
}
