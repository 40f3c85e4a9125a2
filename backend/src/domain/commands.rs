//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod attendance {
    use crate::domain::errors::SubmissionShapeError;
    use crate::domain::models::{StoredAttendance, SubjectSubmission};
    use crate::storage::document::AttendanceDocument;
    use shared::CleanupCounts;

    /// Input for reconciling one month of attendance into a student's record.
    ///
    /// Only constructed through [`SubmitAttendanceCommand::parse`], so the
    /// semester and month are always in range and there is at least one subject.
    #[derive(Debug, Clone)]
    pub struct SubmitAttendanceCommand {
        pub student_id: String,
        pub semester: u32,
        pub month: u8,
        pub subjects: Vec<SubjectSubmission>,
    }

    impl SubmitAttendanceCommand {
        /// Check the top-level shape of a submission, first failure wins
        pub fn parse(
            student_id: &str,
            semester: Option<i64>,
            month: Option<i64>,
            subjects: Option<Vec<SubjectSubmission>>,
        ) -> Result<Self, SubmissionShapeError> {
            let student_id = student_id.trim();
            if student_id.is_empty() {
                return Err(SubmissionShapeError::MissingStudentId);
            }

            let semester = semester.ok_or(SubmissionShapeError::MissingSemester)?;
            let semester = u32::try_from(semester)
                .ok()
                .filter(|s| *s >= 1)
                .ok_or(SubmissionShapeError::InvalidSemester(semester))?;

            let month = month.ok_or(SubmissionShapeError::MissingMonth)?;
            let month = u8::try_from(month)
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or(SubmissionShapeError::InvalidMonth(month))?;

            let subjects = subjects.ok_or(SubmissionShapeError::MissingSubjects)?;
            if subjects.is_empty() {
                return Err(SubmissionShapeError::EmptySubjects);
            }

            Ok(Self {
                student_id: student_id.to_string(),
                semester,
                month,
                subjects,
            })
        }
    }

    /// Result of a successful submission.
    #[derive(Debug, Clone)]
    pub struct SubmitAttendanceResult {
        pub attendance: StoredAttendance,
        /// Percentage over the submitted batch
        pub overall_attendance: f64,
        pub stored_subjects: usize,
        pub discarded_subjects: usize,
        pub success_message: String,
    }

    /// Query for one student's record.
    #[derive(Debug, Clone)]
    pub struct GetAttendanceCommand {
        pub student_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct GetAttendanceResult {
        pub attendance: StoredAttendance,
    }

    /// Command for deleting every record of a student.
    #[derive(Debug, Clone)]
    pub struct DeleteAttendanceCommand {
        pub student_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteAttendanceResult {
        pub deleted_count: u64,
        pub success_message: String,
    }

    /// Command for normalizing every stored record.
    #[derive(Debug, Clone)]
    pub struct CleanupAttendanceCommand {
        /// Report without writing
        pub dry_run: bool,
    }

    /// Cleanup outcome for one record that needed changes
    #[derive(Debug, Clone)]
    pub struct RecordCleanup {
        pub student_id: String,
        pub counts: CleanupCounts,
        pub cleaned: AttendanceDocument,
    }

    /// A record the cleanup pass skipped because it could not be repaired or written
    #[derive(Debug, Clone)]
    pub struct CleanupFailure {
        pub student_id: String,
        pub code: &'static str,
        pub message: String,
    }

    #[derive(Debug, Clone)]
    pub struct CleanupAttendanceResult {
        pub dry_run: bool,
        pub records_scanned: usize,
        pub records: Vec<RecordCleanup>,
        pub failed: Vec<CleanupFailure>,
        pub totals: CleanupCounts,
    }

}
