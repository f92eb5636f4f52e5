use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::NamedTempFile;

use crate::db;
use crate::error::AppError;
use crate::models::snippet::{SnippetStore, SqliteSnippetStore};
use crate::models::user::{SqliteUserStore, UserStore};

async fn file_backed_pool() -> (sqlx::SqlitePool, NamedTempFile) {
    let temp_db = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}", temp_db.path().display());

    sqlx::Sqlite::create_database(&db_url).await.unwrap();

    let pool = SqlitePoolOptions::new().max_connections(1).connect(&db_url).await.unwrap();
    db::init_db(&pool).await.unwrap();

    (pool, temp_db)
}

#[tokio::test]
async fn test_snippet_roundtrip() {
    let (pool, _guard) = file_backed_pool().await;
    let store = SqliteSnippetStore::new(pool);

    let id = store.insert("An old silent pond", "A frog jumps in", 7).await.unwrap();
    assert!(id >= 1);

    let snippet = store.get(id).await.unwrap().expect("snippet should exist");
    assert_eq!(snippet.id, id);
    assert_eq!(snippet.title, "An old silent pond");
    assert_eq!(snippet.content, "A frog jumps in");
    assert!(snippet.expires > snippet.created);

    assert!(store.get(id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_latest_hides_expired_snippets() {
    let (pool, _guard) = file_backed_pool().await;
    let store = SqliteSnippetStore::new(pool);

    store.insert("current", "still here", 7).await.unwrap();
    let expired_id = store.insert("expired", "long gone", -1).await.unwrap();

    let latest = store.latest().await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].title, "current");

    assert!(store.get(expired_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_latest_returns_newest_first_capped_at_ten() {
    let (pool, _guard) = file_backed_pool().await;
    let store = SqliteSnippetStore::new(pool);

    for i in 1..=12 {
        store.insert(&format!("snippet {}", i), "content", 365).await.unwrap();
    }

    let latest = store.latest().await.unwrap();
    assert_eq!(latest.len(), 10);
    assert_eq!(latest[0].title, "snippet 12");
    assert_eq!(latest[9].title, "snippet 3");
}

#[tokio::test]
async fn test_user_insert_rejects_duplicate_email() {
    let (pool, _guard) = file_backed_pool().await;
    let store = SqliteUserStore::new(pool);

    store.insert("Bob", "bob@example.com", "pa$$word123").await.unwrap();
    let err = store.insert("Robert", "bob@example.com", "other-pass").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_user_authenticate_and_exists() {
    let (pool, _guard) = file_backed_pool().await;
    let store = SqliteUserStore::new(pool);

    store.insert("Alice", "alice@example.com", "pa$$word123").await.unwrap();

    let id = store
        .authenticate("alice@example.com", "pa$$word123")
        .await
        .unwrap()
        .expect("credentials should verify");

    assert!(store.exists(id).await.unwrap());
    assert!(!store.exists(id + 99).await.unwrap());

    assert!(store.authenticate("alice@example.com", "wrong").await.unwrap().is_none());
    assert!(store.authenticate("nobody@example.com", "pa$$word123").await.unwrap().is_none());
}
