use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{
    comments::CommentRepository,
    config::Config,
    db::{self, Store},
    error::AppResult,
    state::{BrowseHolder, CommentsHolder, LibraryHolder},
    states::StateRepository,
    tmdb::{MovieSource, TmdbClient},
    users::UserRepository,
};

/// Everything built once per process and handed to holders explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub store: Store,
    pub states: StateRepository,
    pub users: UserRepository,
    pub comments: CommentRepository,
    pub movies: Arc<dyn MovieSource>,
}

impl AppContext {
    pub async fn init(config: Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cinelog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let db = db::connect_and_migrate(&config.database_url).await?;

        let tmdb = TmdbClient::new(
            http,
            config.tmdb_api_key.clone(),
            config.tmdb_base_url.clone(),
            config.tmdb_rps,
        );

        Ok(Self::with_source(Arc::new(config), db, Arc::new(tmdb)))
    }

    pub fn with_source(
        config: Arc<Config>,
        db: DatabaseConnection,
        movies: Arc<dyn MovieSource>,
    ) -> Self {
        let store = Store::new(db.clone());
        Self {
            config,
            states: StateRepository::new(&store),
            users: UserRepository::new(db.clone()),
            comments: CommentRepository::new(&store),
            db,
            store,
            movies,
        }
    }

    pub fn library(&self) -> LibraryHolder {
        LibraryHolder::new(self.states.clone())
    }

    pub fn browse(&self) -> BrowseHolder {
        BrowseHolder::new(self.movies.clone())
    }

    pub fn comment_thread(&self, movie_id: i32) -> CommentsHolder {
        CommentsHolder::bind(self.comments.clone(), movie_id)
    }
}
