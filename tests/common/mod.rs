#![allow(dead_code)]

use async_trait::async_trait;
use devlink::{
    AppState, TokenService,
    config::{AppConfig, Env},
    models::{Credential, NewUser, Publication, UpdatePublicationRequest, UpdateUserRequest, User},
    repository::{Repository, RepositoryState},
};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
pub const TEST_TOKEN_TTL: i64 = 3600;

/// MockRepository
///
/// In-memory stand-in for the Postgres repository. Handlers depend on the
/// `Repository` trait, so tests control storage behavior by pre-loading the
/// fields below; the atomic counters record which mutating operations were
/// actually reached, which is how the tests observe "no mutation happened".
#[derive(Default)]
pub struct MockRepository {
    pub users: Mutex<Vec<User>>,
    pub publications: Mutex<Vec<Publication>>,
    pub credential: Mutex<Option<Credential>>,
    pub stored_password_hash: Mutex<Option<String>>,

    pub feed_calls: AtomicUsize,
    pub follow_calls: AtomicUsize,
    pub unfollow_calls: AtomicUsize,
    pub update_user_calls: AtomicUsize,
    pub delete_user_calls: AtomicUsize,
    pub update_password_calls: AtomicUsize,
    pub update_publication_calls: AtomicUsize,
    pub delete_publication_calls: AtomicUsize,
}

#[async_trait]
impl Repository for MockRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let created = User {
            id: 1,
            name: user.name,
            nick: user.nick,
            email: user.email,
            ..User::default()
        };
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn search_users(&self, _term: &str) -> Result<Vec<User>, sqlx::Error> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn update_user(&self, _id: i64, _user: UpdateUserRequest) -> Result<u64, sqlx::Error> {
        self.update_user_calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn delete_user(&self, _id: i64) -> Result<u64, sqlx::Error> {
        self.delete_user_calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn credential_by_email(&self, _email: &str) -> Result<Option<Credential>, sqlx::Error> {
        Ok(self.credential.lock().unwrap().clone())
    }

    async fn password_hash(&self, _user_id: i64) -> Result<Option<String>, sqlx::Error> {
        Ok(self.stored_password_hash.lock().unwrap().clone())
    }

    async fn update_password(&self, _user_id: i64, hash: &str) -> Result<u64, sqlx::Error> {
        self.update_password_calls.fetch_add(1, Ordering::SeqCst);
        *self.stored_password_hash.lock().unwrap() = Some(hash.to_string());
        Ok(1)
    }

    async fn follow(&self, _user_id: i64, _follower_id: i64) -> Result<(), sqlx::Error> {
        self.follow_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unfollow(&self, _user_id: i64, _follower_id: i64) -> Result<(), sqlx::Error> {
        self.unfollow_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn followers(&self, _user_id: i64) -> Result<Vec<User>, sqlx::Error> {
        Ok(vec![])
    }

    async fn following(&self, _user_id: i64) -> Result<Vec<User>, sqlx::Error> {
        Ok(vec![])
    }

    async fn create_publication(
        &self,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Publication, sqlx::Error> {
        let created = Publication {
            id: 1,
            title: title.to_string(),
            content: content.to_string(),
            author_id,
            ..Publication::default()
        };
        self.publications.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn feed(&self, _user_id: i64) -> Result<Vec<Publication>, sqlx::Error> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.publications.lock().unwrap().clone())
    }

    async fn get_publication(&self, id: i64) -> Result<Option<Publication>, sqlx::Error> {
        Ok(self
            .publications
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update_publication(
        &self,
        _id: i64,
        _publication: UpdatePublicationRequest,
    ) -> Result<u64, sqlx::Error> {
        self.update_publication_calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn delete_publication(&self, _id: i64) -> Result<u64, sqlx::Error> {
        self.delete_publication_calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn publications_by_user(&self, _user_id: i64) -> Result<Vec<Publication>, sqlx::Error> {
        Ok(self.publications.lock().unwrap().clone())
    }

    async fn like_publication(&self, id: i64) -> Result<u64, sqlx::Error> {
        Ok(self.get_publication(id).await?.map_or(0, |_| 1))
    }

    async fn unlike_publication(&self, id: i64) -> Result<u64, sqlx::Error> {
        Ok(self.get_publication(id).await?.map_or(0, |_| 1))
    }
}

/// Builds an application state around a mock repository, with the token
/// service and config sharing the test signing secret.
pub fn app_state(env: Env, repo: std::sync::Arc<MockRepository>) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = TEST_JWT_SECRET.to_string();
    config.token_ttl_secs = TEST_TOKEN_TTL;

    AppState {
        repo: repo as RepositoryState,
        tokens: TokenService::new(TEST_JWT_SECRET, TEST_TOKEN_TTL),
        config,
    }
}
