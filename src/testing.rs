//! Fixtures shared by the unit tests.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use sea_orm::DatabaseConnection;
use tempfile::TempDir;

use crate::{
    db::{self, Store},
    error::{AppError, AppResult},
    models::{Account, MovieSummary},
    state::{BlobStore, IdentityProvider},
    tmdb::MovieSource,
};

/// File-backed database in a throwaway directory.
pub struct TestDb {
    _dir: TempDir,
    store: Store,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("cinelog.db").display());
        let conn = db::connect_and_migrate(&url).await.expect("migrate test database");
        Self { _dir: dir, store: Store::new(conn) }
    }

    pub fn conn(&self) -> DatabaseConnection {
        self.store.conn().clone()
    }

    pub fn store(&self) -> Store {
        self.store.clone()
    }
}

pub fn summary(id: i32, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        overview: format!("{title} overview"),
        poster_path: Some(format!("/{id}.jpg")),
        release_date: Some("1999-10-15".to_string()),
    }
}

pub fn account(id: &str, email: &str) -> Account {
    Account { id: id.to_string(), email: email.to_string() }
}

pub async fn next_item<S>(stream: &mut S) -> S::Item
where
    S: Stream + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("stream stalled")
        .expect("stream ended")
}

/// Catalog that answers from memory, or fails every call while offline.
pub struct FakeSource {
    movies: Vec<MovieSummary>,
    offline: AtomicBool,
}

impl FakeSource {
    pub fn new(movies: Vec<MovieSummary>) -> Self {
        Self { movies, offline: AtomicBool::new(false) }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl MovieSource for FakeSource {
    async fn fetch_collection(&self) -> AppResult<Vec<MovieSummary>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Other(anyhow::anyhow!("network unreachable")));
        }
        Ok(self.movies.clone())
    }

    async fn search(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        let all = self.fetch_collection().await?;
        let query = query.to_lowercase();
        Ok(all.into_iter().filter(|m| m.title.to_lowercase().contains(&query)).collect())
    }
}

/// Identity provider that knows exactly one password per email.
pub struct FakeIdentity {
    pub accounts: Vec<(Account, String)>,
    pub signed_out: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn with(id: &str, email: &str, password: &str) -> Self {
        Self {
            accounts: vec![(account(id, email), password.to_string())],
            signed_out: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Account> {
        self.accounts
            .iter()
            .find(|(a, p)| a.email == email && p == password)
            .map(|(a, _)| a.clone())
            .ok_or_else(|| AppError::Auth("The password is invalid or the user does not have a password.".to_string()))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> AppResult<Account> {
        if self.accounts.iter().any(|(a, _)| a.email == email) {
            return Err(AppError::Auth("The email address is already in use by another account.".to_string()));
        }
        Ok(account(&format!("uid-{email}"), email))
    }

    async fn sign_out(&self, account_id: &str) -> AppResult<()> {
        self.signed_out.lock().unwrap().push(account_id.to_string());
        Ok(())
    }
}

/// Blob store that hands back a predictable URL, or refuses when `broken`.
pub struct FakeBlobs {
    pub broken: bool,
}

#[async_trait]
impl BlobStore for FakeBlobs {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> AppResult<String> {
        if self.broken {
            return Err(AppError::Upload("storage quota exceeded".to_string()));
        }
        Ok(format!("https://blobs.example.com/{key}?size={}", bytes.len()))
    }
}
