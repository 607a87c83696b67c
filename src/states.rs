use futures::stream::BoxStream;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, sea_query::OnConflict,
};
use tracing::debug;

use crate::{
    changes::ChangeFeed,
    db::Store,
    entities::movie_state,
    error::{AppError, AppResult},
    models::MovieFlag,
};

/// Reads and writes per-user movie state records.
#[derive(Clone)]
pub struct StateRepository {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl StateRepository {
    pub fn new(store: &Store) -> Self {
        Self { db: store.conn().clone(), changes: store.movies_feed().clone() }
    }

    /// Inserts `record`, or replaces every field of the row already stored
    /// for its (remote id, user) pair. The stored row keeps its surrogate id.
    pub async fn upsert(&self, record: &movie_state::Model) -> AppResult<movie_state::Model> {
        let model = movie_state::ActiveModel {
            id: NotSet,
            remote_id: Set(record.remote_id),
            user_id: Set(record.user_id.clone()),
            title: Set(record.title.clone()),
            poster_path: Set(record.poster_path.clone()),
            overview: Set(record.overview.clone()),
            release_date: Set(record.release_date.clone()),
            is_favorite: Set(record.is_favorite),
            is_watched: Set(record.is_watched),
            is_want_to_watch: Set(record.is_want_to_watch),
        };

        movie_state::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([movie_state::Column::RemoteId, movie_state::Column::UserId])
                    .update_columns([
                        movie_state::Column::Title,
                        movie_state::Column::PosterPath,
                        movie_state::Column::Overview,
                        movie_state::Column::ReleaseDate,
                        movie_state::Column::IsFavorite,
                        movie_state::Column::IsWatched,
                        movie_state::Column::IsWantToWatch,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        self.changes.notify();

        debug!(user_id = %record.user_id, remote_id = record.remote_id, "upserted movie state");

        self.find_by_remote_id_and_user(record.remote_id, &record.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("movie {}", record.remote_id)))
    }

    pub async fn find_by_remote_id_and_user(
        &self,
        remote_id: i32,
        user_id: &str,
    ) -> AppResult<Option<movie_state::Model>> {
        let record = movie_state::Entity::find()
            .filter(movie_state::Column::RemoteId.eq(remote_id))
            .filter(movie_state::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(record)
    }

    pub async fn list_by_user_and_flag(
        &self,
        user_id: &str,
        flag: MovieFlag,
    ) -> AppResult<Vec<movie_state::Model>> {
        query_flag(&self.db, user_id, flag).await
    }

    /// Same filter as [`list_by_user_and_flag`](Self::list_by_user_and_flag),
    /// re-emitted whenever a write changes its result.
    pub fn observe_by_user_and_flag(
        &self,
        user_id: &str,
        flag: MovieFlag,
    ) -> BoxStream<'static, AppResult<Vec<movie_state::Model>>> {
        let db = self.db.clone();
        let user_id = user_id.to_string();
        self.changes.observe(move || {
            let db = db.clone();
            let user_id = user_id.clone();
            async move { query_flag(&db, &user_id, flag).await }
        })
    }

    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<movie_state::Model>> {
        let records = movie_state::Entity::find()
            .filter(movie_state::Column::UserId.eq(user_id))
            .order_by_asc(movie_state::Column::Title)
            .all(&self.db)
            .await?;
        Ok(records)
    }

    /// Removes every record owned by `user_id`. Returns the number removed.
    pub async fn delete_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let res = movie_state::Entity::delete_many()
            .filter(movie_state::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        self.changes.notify();

        debug!(user_id = %user_id, removed = res.rows_affected, "purged movie states");
        Ok(res.rows_affected)
    }

    /// Inverts `flag` for the movie in `record` and stores the full record.
    ///
    /// Flag values come from the stored row when one exists for the pair, so
    /// the other two flags are never disturbed. Display fields come from
    /// `record`.
    pub async fn toggle_flag(
        &self,
        user_id: &str,
        record: &movie_state::Model,
        flag: MovieFlag,
    ) -> AppResult<movie_state::Model> {
        let mut next = record.clone();
        next.user_id = user_id.to_string();

        if let Some(stored) = self.find_by_remote_id_and_user(record.remote_id, user_id).await? {
            next.id = stored.id;
            for other in MovieFlag::ALL {
                other.set(&mut next, other.get(&stored));
            }
        }

        let value = !flag.get(&next);
        flag.set(&mut next, value);

        debug!(user_id = %user_id, remote_id = record.remote_id, flag = %flag, value, "toggling flag");
        self.upsert(&next).await
    }
}

async fn query_flag(
    db: &DatabaseConnection,
    user_id: &str,
    flag: MovieFlag,
) -> AppResult<Vec<movie_state::Model>> {
    let records = movie_state::Entity::find()
        .filter(movie_state::Column::UserId.eq(user_id))
        .filter(flag.column().eq(true))
        .order_by_asc(movie_state::Column::Title)
        .all(db)
        .await?;
    Ok(records)
}
