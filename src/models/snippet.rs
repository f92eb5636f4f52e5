use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::error::AppResult;

/// A stored snippet. `expires` is an absolute instant; expired rows are
/// filtered out by the queries rather than deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// Snippet persistence collaborator.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Inserts a snippet expiring `expires_days` from now and returns its id.
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> AppResult<i64>;

    /// Fetches one unexpired snippet, `None` if absent or expired.
    async fn get(&self, id: i64) -> AppResult<Option<Snippet>>;

    /// The ten newest unexpired snippets.
    async fn latest(&self) -> AppResult<Vec<Snippet>>;
}

pub struct SqliteSnippetStore {
    pool: SqlitePool,
}

impl SqliteSnippetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetStore for SqliteSnippetStore {
    async fn insert(&self, title: &str, content: &str, expires_days: i64) -> AppResult<i64> {
        let created = Utc::now();
        let expires = created + Duration::days(expires_days);

        let result = sqlx::query(
            r#"INSERT INTO snippets (title, content, created, expires)
               VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(title)
        .bind(content)
        .bind(created)
        .bind(expires)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Snippet>> {
        let snippet = sqlx::query_as::<_, Snippet>(
            r#"SELECT id, title, content, created, expires
               FROM snippets
               WHERE expires > ?1 AND id = ?2"#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snippet)
    }

    async fn latest(&self) -> AppResult<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>(
            r#"SELECT id, title, content, created, expires
               FROM snippets
               WHERE expires > ?1
               ORDER BY id DESC
               LIMIT 10"#,
        )
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        Ok(snippets)
    }
}
