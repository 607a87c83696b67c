use migration::Migrator;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::debug;

use crate::{changes::ChangeFeed, error::AppResult};

const PRAGMAS: [&str; 3] =
    ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA cache_size=-64000"];

/// Opens the process-wide database handle and brings the schema up to date.
pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;

    for pragma in PRAGMAS {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string()))
            .await?;
    }

    Migrator::up(&db, None).await?;
    debug!(url = %database_url, "database ready");
    Ok(db)
}

/// The shared database handle plus one change feed per observed table.
/// Every repository built from clones of one `Store` sees the same writes.
#[derive(Clone)]
pub struct Store {
    conn: DatabaseConnection,
    movies: ChangeFeed,
    comments: ChangeFeed,
}

impl Store {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn, movies: ChangeFeed::new(), comments: ChangeFeed::new() }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn movies_feed(&self) -> &ChangeFeed {
        &self.movies
    }

    pub fn comments_feed(&self) -> &ChangeFeed {
        &self.comments
    }
}
