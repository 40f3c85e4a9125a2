use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::debug;

use crate::storage::connection::DbConnection;
use crate::storage::document::AttendanceDocument;
use crate::storage::traits::{AttendanceStorage, PersistenceError, StoredDocument};

/// Repository for attendance documents backed by SQLite
#[derive(Clone)]
pub struct AttendanceRepository {
    db: DbConnection,
}

impl AttendanceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    async fn insert(&self, document: &AttendanceDocument, body: &str) -> Result<StoredDocument, PersistenceError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records (student_id, document, version, created_at, updated_at)
            VALUES (?, ?, 1, ?, ?)
            "#,
        )
        .bind(&document.student_id)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(StoredDocument {
                document: document.clone(),
                version: 1,
                created_at: now,
                updated_at: now,
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(PersistenceError::Conflict {
                student_id: document.student_id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(
        &self,
        document: &AttendanceDocument,
        body: &str,
        expected_version: i64,
    ) -> Result<StoredDocument, PersistenceError> {
        let row = sqlx::query(
            r#"
            UPDATE attendance_records
            SET document = ?, version = version + 1, updated_at = ?
            WHERE student_id = ? AND version = ?
            RETURNING version, created_at, updated_at
            "#,
        )
        .bind(body)
        .bind(Utc::now())
        .bind(&document.student_id)
        .bind(expected_version)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(StoredDocument {
                document: document.clone(),
                version: r.get("version"),
                created_at: r.get::<DateTime<Utc>, _>("created_at"),
                updated_at: r.get::<DateTime<Utc>, _>("updated_at"),
            }),
            None => Err(PersistenceError::Conflict {
                student_id: document.student_id.clone(),
            }),
        }
    }
}

#[async_trait]
impl AttendanceStorage for AttendanceRepository {
    async fn get_attendance(&self, student_id: &str) -> Result<Option<StoredDocument>, PersistenceError> {
        let row = sqlx::query(
            r#"
            SELECT document, version, created_at, updated_at
            FROM attendance_records
            WHERE student_id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => {
                let body: String = r.get("document");
                Ok(Some(StoredDocument {
                    document: serde_json::from_str(&body)?,
                    version: r.get("version"),
                    created_at: r.get::<DateTime<Utc>, _>("created_at"),
                    updated_at: r.get::<DateTime<Utc>, _>("updated_at"),
                }))
            }
            None => Ok(None),
        }
    }

    async fn save_attendance(
        &self,
        document: &AttendanceDocument,
        expected_version: Option<i64>,
    ) -> Result<StoredDocument, PersistenceError> {
        let violations = document.validate();
        if !violations.is_empty() {
            return Err(PersistenceError::Schema(violations));
        }

        let body = serde_json::to_string(document)?;
        debug!(
            "Saving attendance for student {} ({} bytes, expected version {:?})",
            document.student_id,
            body.len(),
            expected_version
        );

        match expected_version {
            None => self.insert(document, &body).await,
            Some(version) => self.update(document, &body, version).await,
        }
    }

    async fn delete_attendance(&self, student_id: &str) -> Result<u64, PersistenceError> {
        let result = sqlx::query("DELETE FROM attendance_records WHERE student_id = ?")
            .bind(student_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_student_ids(&self) -> Result<Vec<String>, PersistenceError> {
        let rows = sqlx::query("SELECT student_id FROM attendance_records ORDER BY student_id")
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.iter().map(|row| row.get("student_id")).collect())
    }
}
