//! Counting mock stores for the integration tests.
//!
//! Call counters make the short-circuit properties observable: a rejected
//! request must leave `insert_calls` untouched.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::{AppError, AppResult};
use crate::models::snippet::{Snippet, SnippetStore};
use crate::models::user::UserStore;

pub const MOCK_USER_ID: i64 = 1;
pub const MOCK_EMAIL: &str = "alice@example.com";
pub const MOCK_PASSWORD: &str = "pa$$word";
/// Credentials that authenticate but reference a user the store no longer has.
pub const STALE_USER_EMAIL: &str = "ghost@example.com";
pub const STALE_USER_ID: i64 = 2;
pub const DUPLICATE_EMAIL: &str = "dupe@example.com";

#[derive(Default)]
pub struct MockSnippetStore {
    pub insert_calls: AtomicUsize,
    snippets: Mutex<Vec<Snippet>>,
}

impl MockSnippetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnippetStore for MockSnippetStore {
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> AppResult<i64> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mut snippets = self.snippets.lock().unwrap();
        let id = snippets.len() as i64 + 1;
        let created = Utc::now();
        snippets.push(Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created,
            expires: created + Duration::days(expires_days),
        });
        Ok(id)
    }

    async fn get(&self, id: i64) -> AppResult<Option<Snippet>> {
        let snippets = self.snippets.lock().unwrap();
        Ok(snippets.iter().find(|s| s.id == id).cloned())
    }

    async fn latest(&self) -> AppResult<Vec<Snippet>> {
        let snippets = self.snippets.lock().unwrap();
        let mut latest: Vec<Snippet> = snippets.clone();
        latest.reverse();
        latest.truncate(10);
        Ok(latest)
    }
}

pub struct MockUserStore {
    pub insert_calls: AtomicUsize,
    /// Ids `exists` reports as present.
    pub known_ids: Mutex<HashSet<i64>>,
    /// When set, `exists` fails like a broken database connection.
    pub exists_fail: AtomicBool,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self {
            insert_calls: AtomicUsize::new(0),
            known_ids: Mutex::new(HashSet::from([MOCK_USER_ID])),
            exists_fail: AtomicBool::new(false),
        }
    }
}

impl Default for MockUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn insert(&self, _name: &str, email: &str, _password: &str) -> AppResult<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if email == DUPLICATE_EMAIL {
            return Err(AppError::Conflict("a user with this email address already exists".to_string()));
        }
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<i64>> {
        if password != MOCK_PASSWORD {
            return Ok(None);
        }
        match email {
            MOCK_EMAIL => Ok(Some(MOCK_USER_ID)),
            STALE_USER_EMAIL => Ok(Some(STALE_USER_ID)),
            _ => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        if self.exists_fail.load(Ordering::SeqCst) {
            return Err(AppError::Database("mock user store is down".to_string()));
        }
        Ok(self.known_ids.lock().unwrap().contains(&id))
    }
}
