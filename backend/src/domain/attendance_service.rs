//! Attendance reconciliation service.
//!
//! Orchestrates a submission through validation, aggregation, junk
//! filtering and the hierarchical merge, then persists the merged record.
//!
//! ## Business Rules
//!
//! - One invalid subject rejects the whole submission, nothing is written
//! - The submission percentage covers every validated subject, junk included
//! - Only non-junk subjects are stored; a batch with none left is rejected
//! - The read-modify-write of one student runs under that student's lock and
//!   the write is checked against the version that was read
//! - A percentage below the configured minimum is logged as a warning

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::attendance_aggregator::AttendanceAggregator;
use crate::domain::commands::attendance::{
    CleanupAttendanceCommand, CleanupAttendanceResult, CleanupFailure, DeleteAttendanceCommand, DeleteAttendanceResult,
    GetAttendanceCommand, GetAttendanceResult, RecordCleanup, SubmitAttendanceCommand, SubmitAttendanceResult,
};
use crate::domain::errors::ReconciliationError;
use crate::domain::junk_filter::JunkFilter;
use crate::domain::merge_engine::{HierarchicalMergeEngine, MonthBatch};
use crate::domain::models::{OverallAttendanceBasis, StoredAttendance};
use crate::domain::record_maintenance::{self, RecordMaintenance};
use crate::domain::student_locks::StudentLocks;
use crate::domain::subject_validator::SubjectValidator;
use crate::storage::document::AttendanceDocument;
use crate::storage::traits::{AttendanceStorage, PersistenceError, StoredDocument};
use shared::CleanupCounts;

/// Service for reconciling and managing student attendance records
#[derive(Clone)]
pub struct AttendanceService {
    storage: Arc<dyn AttendanceStorage>,
    locks: StudentLocks,
    engine: HierarchicalMergeEngine,
    maintenance: RecordMaintenance,
    minimum_attendance: f64,
}

impl AttendanceService {
    pub fn new(storage: Arc<dyn AttendanceStorage>, basis: OverallAttendanceBasis, minimum_attendance: f64) -> Self {
        Self {
            storage,
            locks: StudentLocks::new(),
            engine: HierarchicalMergeEngine::new(basis),
            maintenance: RecordMaintenance::new(basis),
            minimum_attendance,
        }
    }

    /// Merge one month of attendance into a student's record
    pub async fn submit_attendance(
        &self,
        command: SubmitAttendanceCommand,
    ) -> Result<SubmitAttendanceResult, ReconciliationError> {
        let SubmitAttendanceCommand {
            student_id,
            semester,
            month,
            subjects,
        } = command;
        info!(
            "Submitting attendance for student {} (semester {}, month {}, {} subjects)",
            student_id,
            semester,
            month,
            subjects.len()
        );

        let invalid_subjects = SubjectValidator::validate_all(&subjects);
        if !invalid_subjects.is_empty() {
            warn!(
                "Rejected attendance for student {}: {} subject(s) have validation errors",
                student_id,
                invalid_subjects.len()
            );
            return Err(ReconciliationError::InvalidSubjects(invalid_subjects));
        }

        let overall_attendance = AttendanceAggregator::overall_attendance(&subjects);

        let storable = JunkFilter::retain_storable(&subjects);
        let discarded_subjects = subjects.len() - storable.len();
        if storable.is_empty() {
            warn!("Rejected attendance for student {}: every subject was a placeholder row", student_id);
            return Err(ReconciliationError::NoValidSubjects);
        }
        if discarded_subjects > 0 {
            debug!("Discarded {} placeholder subject(s) for student {}", discarded_subjects, student_id);
        }
        let stored_subjects = storable.len();

        let _guard = self.locks.lock(&student_id).await;

        let (existing, expected_version) = match self.storage.get_attendance(&student_id).await? {
            Some(stored) => (Some(stored.document.to_record()), Some(stored.version)),
            None => (None, None),
        };

        let batch = MonthBatch {
            semester,
            month,
            subjects: storable,
            submission_attendance: overall_attendance,
        };
        let (record, outcome) = self.engine.merge(existing, &student_id, batch);
        debug!("Merge outcome for student {}: {:?}", student_id, outcome);

        let document = AttendanceDocument::from(&record);
        let saved = self.storage.save_attendance(&document, expected_version).await?;
        info!(
            "Saved attendance for student {} at version {} (month attendance {:.2}%)",
            student_id, saved.version, outcome.month_attendance
        );

        if overall_attendance < self.minimum_attendance {
            warn!(
                "Attendance for student {} in semester {}, month {} is {:.2}%, below the minimum of {:.2}%",
                student_id, semester, month, overall_attendance, self.minimum_attendance
            );
        }

        Ok(SubmitAttendanceResult {
            attendance: StoredAttendance {
                record,
                version: saved.version,
                created_at: saved.created_at,
                updated_at: saved.updated_at,
            },
            overall_attendance,
            stored_subjects,
            discarded_subjects,
            success_message: format!(
                "Attendance saved successfully for Student ID: {}, Semester: {}, Month: {}",
                student_id, semester, month
            ),
        })
    }

    /// Get the full record of one student
    pub async fn get_attendance(
        &self,
        command: GetAttendanceCommand,
    ) -> Result<GetAttendanceResult, ReconciliationError> {
        debug!("Getting attendance for student {}", command.student_id);

        match self.storage.get_attendance(&command.student_id).await? {
            Some(stored) => Ok(GetAttendanceResult {
                attendance: to_stored_attendance(stored),
            }),
            None => Err(ReconciliationError::NotFound(command.student_id)),
        }
    }

    /// Delete every record of one student
    pub async fn delete_attendance(
        &self,
        command: DeleteAttendanceCommand,
    ) -> Result<DeleteAttendanceResult, ReconciliationError> {
        info!("Deleting attendance for student {}", command.student_id);

        let _guard = self.locks.lock(&command.student_id).await;
        let deleted_count = self.storage.delete_attendance(&command.student_id).await?;
        if deleted_count == 0 {
            return Err(ReconciliationError::NotFound(command.student_id));
        }

        Ok(DeleteAttendanceResult {
            deleted_count,
            success_message: "All attendance records deleted successfully".to_string(),
        })
    }

    /// Normalize every stored record, writing the changes unless `dry_run`
    pub async fn cleanup_attendance(
        &self,
        command: CleanupAttendanceCommand,
    ) -> Result<CleanupAttendanceResult, ReconciliationError> {
        let student_ids = self.storage.list_student_ids().await?;
        info!(
            "Scanning {} attendance record(s) for cleanup (dry run: {})",
            student_ids.len(),
            command.dry_run
        );

        let mut records = Vec::new();
        let mut failed = Vec::new();
        let mut totals = CleanupCounts::default();

        for student_id in &student_ids {
            let _guard = self.locks.lock(student_id).await;

            match self.clean_record(student_id, command.dry_run).await {
                Ok(Some(record)) => {
                    record_maintenance::accumulate(&mut totals, &record.counts);
                    records.push(record);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping cleanup of attendance for student {}: {}", student_id, e);
                    failed.push(CleanupFailure {
                        student_id: student_id.clone(),
                        code: e.code(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(CleanupAttendanceResult {
            dry_run: command.dry_run,
            records_scanned: student_ids.len(),
            records,
            failed,
            totals,
        })
    }

    /// Clean one record; `None` when it is gone or already clean.
    ///
    /// A cleaned document that still breaks the stored schema fails in a dry
    /// run too, so the report shows what a real run would do.
    async fn clean_record(&self, student_id: &str, dry_run: bool) -> Result<Option<RecordCleanup>, PersistenceError> {
        // Deleted since the scan started
        let Some(stored) = self.storage.get_attendance(student_id).await? else {
            return Ok(None);
        };

        let (cleaned, counts) = self.maintenance.clean(&stored.document);
        if !record_maintenance::has_changes(&counts) {
            return Ok(None);
        }

        let violations = cleaned.validate();
        if !violations.is_empty() {
            return Err(PersistenceError::Schema(violations));
        }

        if !dry_run {
            self.storage.save_attendance(&cleaned, Some(stored.version)).await?;
            info!(
                "Cleaned attendance for student {}: {} subject(s) down to {}",
                student_id, counts.subjects_before, counts.subjects_after
            );
        }

        Ok(Some(RecordCleanup {
            student_id: student_id.to_string(),
            counts,
            cleaned,
        }))
    }
}

fn to_stored_attendance(stored: StoredDocument) -> StoredAttendance {
    StoredAttendance {
        record: stored.document.to_record(),
        version: stored.version,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    }
}
