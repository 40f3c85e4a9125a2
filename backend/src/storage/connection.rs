use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a private in-memory database, used by tests
    pub async fn init_in_memory() -> Result<Self> {
        let db_id = uuid::Uuid::new_v4().simple().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", db_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // One document per student; the primary key enforces it
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance_records (
                student_id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_created() {
        let db = DbConnection::init_in_memory().await.expect("Failed to init test DB");

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'attendance_records'",
        )
        .fetch_one(db.pool())
        .await
        .expect("Query failed");

        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let first = DbConnection::init_in_memory().await.unwrap();
        let second = DbConnection::init_in_memory().await.unwrap();

        sqlx::query(
            "INSERT INTO attendance_records (student_id, document, created_at, updated_at) VALUES ('a', '{}', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .execute(first.pool())
        .await
        .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendance_records")
            .fetch_one(second.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
