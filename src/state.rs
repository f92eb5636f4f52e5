use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::snippet::{SnippetStore, SqliteSnippetStore};
use crate::models::user::{SqliteUserStore, UserStore};

/// The shared application state.
///
/// Constructed once at startup and cloned into every stage and handler; all
/// members are immutable handles, so concurrent requests share them without
/// coordination. The storage collaborators sit behind trait objects so tests
/// can swap in counting mocks.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Snippet persistence collaborator.
    pub snippets: Arc<dyn SnippetStore>,
    /// User persistence and existence-check collaborator.
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    /// Creates an `AppState` backed by the SQLite stores.
    pub fn new(pool: sqlx::SqlitePool, config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            snippets: Arc::new(SqliteSnippetStore::new(pool.clone())),
            users: Arc::new(SqliteUserStore::new(pool)),
        }
    }

    /// Creates an `AppState` with caller-provided stores.
    pub fn with_stores(
        config: AppConfig,
        snippets: Arc<dyn SnippetStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self { config: Arc::new(config), snippets, users }
    }
}
