//! SQLite user repository implementation

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::domain::user::{NewUser, User, UserPage, UserQuery, UserRepository};
use crate::domain::DomainError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    age INTEGER NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// SQLite implementation of `UserRepository`
///
/// The `UNIQUE` constraint on `username` is the authoritative guard against
/// duplicates; `AUTOINCREMENT` keeps ids monotonic and never reused.
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Open (creating the file and schema if needed) a repository at the
    /// given SQLite URL, e.g. `sqlite://users.db` or `sqlite::memory:`
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DomainError::storage(format!("invalid database url: {}", e)))?
            .create_if_missing(true);

        // A single connection keeps writes serialized and makes
        // `sqlite::memory:` behave as one database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DomainError::storage(format!("failed to open database: {}", e)))?;

        let repository = Self { pool };
        repository.init_schema().await?;

        Ok(repository)
    }

    /// Create the users table if it does not exist yet
    pub async fn init_schema(&self) -> Result<(), DomainError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("failed to initialize schema: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let created_at = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, age, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, username, age, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(new_user.age)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::conflict(
                format!("username '{}' is already taken", new_user.username),
            ),
            _ => DomainError::storage(format!("failed to create user: {}", e)),
        })?;

        row_to_user(&row)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, age, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("failed to get user: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &UserQuery) -> Result<UserPage, DomainError> {
        // `instr` keeps the substring match case-sensitive; LIKE would
        // fold ASCII case.
        let (total, rows) = match query.keyword.as_deref() {
            Some(keyword) => {
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM users WHERE instr(username, ?1) > 0",
                )
                .bind(keyword)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("failed to count users: {}", e)))?;

                let rows = sqlx::query(
                    r#"
                    SELECT id, username, age, created_at
                    FROM users
                    WHERE instr(username, ?1) > 0
                    ORDER BY id ASC
                    LIMIT ?2 OFFSET ?3
                    "#,
                )
                .bind(keyword)
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("failed to list users: {}", e)))?;

                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| DomainError::storage(format!("failed to count users: {}", e)))?;

                let rows = sqlx::query(
                    r#"
                    SELECT id, username, age, created_at
                    FROM users
                    ORDER BY id ASC
                    LIMIT ?1 OFFSET ?2
                    "#,
                )
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("failed to list users: {}", e)))?;

                (total, rows)
            }
        };

        let users = rows
            .iter()
            .map(row_to_user)
            .collect::<Result<Vec<User>, DomainError>>()?;

        Ok(UserPage { users, total })
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?1")
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("failed to check username: {}", e))
                })?;

        Ok(count > 0)
    }

    async fn delete_all(&self) -> Result<u64, DomainError> {
        // AUTOINCREMENT keeps the id sequence across the delete
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("failed to delete users: {}", e)))?;

        Ok(result.rows_affected())
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("invalid id column: {}", e)))?;
    let username: String = row
        .try_get("username")
        .map_err(|e| DomainError::storage(format!("invalid username column: {}", e)))?;
    let age: i64 = row
        .try_get("age")
        .map_err(|e| DomainError::storage(format!("invalid age column: {}", e)))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::storage(format!("invalid created_at column: {}", e)))?;

    Ok(User::new(id, username, age, created_at))
}
