use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::{AppError, AppResult};

/// User persistence and existence-check collaborator.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user. Returns `AppError::Conflict` when the email is taken.
    async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<()>;

    /// Verifies credentials; `Some(id)` on success, `None` on any mismatch.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<i64>>;

    /// Whether a user with this id still exists.
    async fn exists(&self, id: i64) -> AppResult<bool>;
}

pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Hash a password using Argon2id. Returns a PHC-format string.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<()> {
        let hashed = hash_password(password)?;

        let result = sqlx::query(
            r#"INSERT INTO users (name, email, hashed_password, created)
               VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(name)
        .bind(email)
        .bind(hashed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict("a user with this email address already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<i64>> {
        let row = sqlx::query(r#"SELECT id, hashed_password FROM users WHERE email = ?1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: i64 = row.get("id");
        let hashed: String = row.get("hashed_password");

        if verify_password(password, &hashed)? {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let present: i64 = sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)"#)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(present != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("pa$$word").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pa$$word", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("pa$$word", "not-a-phc-string").is_err());
    }
}
