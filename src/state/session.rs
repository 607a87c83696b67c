use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    entities::user,
    error::{AppError, AppResult},
    models::Account,
    state::LibraryHolder,
    states::StateRepository,
    users::UserRepository,
};

/// External identity provider. Errors carry a message fit for the login form.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Account>;

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Account>;

    async fn sign_out(&self, account_id: &str) -> AppResult<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    Authenticating,
    SignedIn(user::Model),
    Failed(String),
}

pub struct SessionHolder {
    identity: Arc<dyn IdentityProvider>,
    users: UserRepository,
    states: StateRepository,
    session: watch::Sender<SessionState>,
}

impl SessionHolder {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: UserRepository, states: StateRepository) -> Self {
        Self { identity, users, states, session: watch::channel(SessionState::SignedOut).0 }
    }

    pub fn session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    pub fn current_user(&self) -> Option<user::Model> {
        match &*self.session.borrow() {
            SessionState::SignedIn(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<user::Model> {
        self.authenticate(email, password, false).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<user::Model> {
        self.authenticate(email, password, true).await
    }

    async fn authenticate(&self, email: &str, password: &str, create: bool) -> AppResult<user::Model> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            let err = AppError::Auth("Email and password are required.".to_string());
            self.session.send_replace(SessionState::Failed(err.to_string()));
            return Err(err);
        }

        self.session.send_replace(SessionState::Authenticating);

        let result = async {
            let account = if create {
                self.identity.sign_up(email, password).await?
            } else {
                self.identity.sign_in(email, password).await?
            };
            self.users.register(&account).await
        }
        .await;

        match &result {
            Ok(user) => {
                info!(user_id = %user.id, "signed in");
                self.session.send_replace(SessionState::SignedIn(user.clone()));
            },
            Err(err) => {
                warn!(error = %err, "authentication failed");
                self.session.send_replace(SessionState::Failed(err.to_string()));
            },
        }
        result
    }

    /// Signs out the current user and purges their local movie state.
    ///
    /// Once the provider has signed the user out the session is `SignedOut`
    /// and the library is cleared, even if the purge fails; the purge error
    /// is still returned.
    pub async fn sign_out(&self, library: &LibraryHolder) -> AppResult<()> {
        let Some(user) = self.current_user() else {
            library.clear();
            return Ok(());
        };

        self.identity.sign_out(&user.id).await?;
        let purged = self.states.delete_all_for_user(&user.id).await;
        library.clear();
        self.session.send_replace(SessionState::SignedOut);

        match purged {
            Ok(removed) => {
                info!(user_id = %user.id, removed, "signed out");
                Ok(())
            },
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "signed out but local purge failed");
                Err(err)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Statement};

    use super::*;
    use crate::{
        models::MovieFlag,
        testing::{FakeIdentity, TestDb, summary},
    };

    fn holder(db: &TestDb, identity: Arc<FakeIdentity>) -> SessionHolder {
        SessionHolder::new(identity, UserRepository::new(db.conn()), StateRepository::new(&db.store()))
    }

    #[tokio::test]
    async fn sign_in_registers_user_record() {
        let db = TestDb::new().await;
        let session = holder(&db, Arc::new(FakeIdentity::with("u1", "a@example.com", "hunter2")));

        let user = session.sign_in("a@example.com", "hunter2").await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(session.current_user(), Some(user));

        let stored = UserRepository::new(db.conn()).find("u1").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn bad_credentials_surface_provider_message() {
        let db = TestDb::new().await;
        let session = holder(&db, Arc::new(FakeIdentity::with("u1", "a@example.com", "hunter2")));

        assert!(session.sign_in("a@example.com", "wrong").await.is_err());
        match &*session.session().borrow() {
            SessionState::Failed(msg) => assert!(msg.starts_with("The password is invalid")),
            other => panic!("unexpected state {other:?}"),
        }

        assert!(session.sign_in("", "").await.is_err());
        assert_eq!(
            *session.session().borrow(),
            SessionState::Failed("Email and password are required.".to_string())
        );
    }

    #[tokio::test]
    async fn sign_up_rejects_taken_email() {
        let db = TestDb::new().await;
        let session = holder(&db, Arc::new(FakeIdentity::with("u1", "a@example.com", "pw")));

        assert!(session.sign_up("a@example.com", "pw").await.is_err());
        let user = session.sign_up("b@example.com", "pw").await.unwrap();
        assert_eq!(user.id, "uid-b@example.com");
    }

    #[tokio::test]
    async fn sign_out_purges_and_clears() {
        let db = TestDb::new().await;
        let identity = Arc::new(FakeIdentity::with("u1", "a@example.com", "pw"));
        let session = holder(&db, identity.clone());
        let states = StateRepository::new(&db.store());
        let library = LibraryHolder::new(states.clone());

        session.sign_in("a@example.com", "pw").await.unwrap();
        let record = summary(550, "Fight Club").to_record("u1");
        library.toggle("u1", &record, MovieFlag::Favorite).await.unwrap();
        assert_eq!(library.current(MovieFlag::Favorite).items().len(), 1);

        session.sign_out(&library).await.unwrap();

        assert_eq!(*session.session().borrow(), SessionState::SignedOut);
        assert!(library.current(MovieFlag::Favorite).items().is_empty());
        assert!(states.list_by_user("u1").await.unwrap().is_empty());
        assert_eq!(*identity.signed_out.lock().unwrap(), vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn failed_purge_still_ends_session() {
        let db = TestDb::new().await;
        let session = holder(&db, Arc::new(FakeIdentity::with("u1", "a@example.com", "pw")));
        let library = LibraryHolder::new(StateRepository::new(&db.store()));

        session.sign_in("a@example.com", "pw").await.unwrap();
        let record = summary(550, "Fight Club").to_record("u1");
        library.toggle("u1", &record, MovieFlag::Favorite).await.unwrap();

        let conn = db.conn();
        conn.execute(Statement::from_string(conn.get_database_backend(), "DROP TABLE movies"))
            .await
            .unwrap();

        assert!(session.sign_out(&library).await.is_err());
        assert_eq!(*session.session().borrow(), SessionState::SignedOut);
        assert_eq!(session.current_user(), None);
        assert_eq!(library.current(MovieFlag::Favorite), crate::state::MovieList::empty());
    }
}
