//! Merges a filtered batch of subjects into a student's attendance hierarchy.
//!
//! The algorithm:
//! 1. No record yet: build one holding a single semester, month and the batch
//! 2. Semester missing: insert it with a single month
//! 3. Month missing: insert it built from the batch
//! 4. Month present: index the existing subjects by key, overwrite matching
//!    rows in place and append the rest in submission order
//!
//! The month percentage is then set according to the configured
//! [`OverallAttendanceBasis`].

use std::collections::HashMap;

use crate::domain::attendance_aggregator::AttendanceAggregator;
use crate::domain::junk_filter::JunkFilter;
use crate::domain::models::{
    AttendanceRecord, OverallAttendanceBasis, SemesterRecord, SubjectEntry, SubjectKey,
};

/// The part of a submission the merge operates on
#[derive(Debug, Clone)]
pub struct MonthBatch {
    pub semester: u32,
    pub month: u8,
    /// Validated, junk-free subjects in submission order
    pub subjects: Vec<SubjectEntry>,
    /// Percentage over the full submitted batch
    pub submission_attendance: f64,
}

/// Deepest level of the hierarchy that had to be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedLevel {
    Record,
    Semester,
    Month,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub created: CreatedLevel,
    pub replaced_subjects: usize,
    pub appended_subjects: usize,
    /// Previously stored placeholder rows removed from the merged month
    pub dropped_subjects: usize,
    /// Percentage stored on the merged month
    pub month_attendance: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchicalMergeEngine {
    basis: OverallAttendanceBasis,
}

impl HierarchicalMergeEngine {
    pub fn new(basis: OverallAttendanceBasis) -> Self {
        Self { basis }
    }

    pub fn merge(
        &self,
        existing: Option<AttendanceRecord>,
        student_id: &str,
        batch: MonthBatch,
    ) -> (AttendanceRecord, MergeOutcome) {
        let MonthBatch {
            semester,
            month,
            subjects,
            submission_attendance,
        } = batch;

        let (mut record, record_created) = match existing {
            Some(record) => (record, false),
            None => (AttendanceRecord::new(student_id), true),
        };

        let semester_created = !record.semesters.contains_key(&semester);
        let semester_record = record
            .semesters
            .entry(semester)
            .or_insert_with(SemesterRecord::default);

        let month_created = !semester_record.months.contains_key(&month);

        let mut outcome = MergeOutcome {
            created: CreatedLevel::None,
            replaced_subjects: 0,
            appended_subjects: 0,
            dropped_subjects: 0,
            month_attendance: 0.0,
        };

        let month_record = semester_record.months.entry(month).or_default();
        if month_created {
            outcome.appended_subjects = subjects.len();
            month_record.subjects = subjects;
        } else {
            let (replaced, appended, dropped) = merge_subjects(&mut month_record.subjects, subjects);
            outcome.replaced_subjects = replaced;
            outcome.appended_subjects = appended;
            outcome.dropped_subjects = dropped;
        }

        month_record.overall_attendance = match self.basis {
            OverallAttendanceBasis::Submission => submission_attendance,
            OverallAttendanceBasis::MergedMonth => {
                AttendanceAggregator::overall_attendance(&month_record.subjects)
            }
        };
        outcome.month_attendance = month_record.overall_attendance;

        outcome.created = if record_created {
            CreatedLevel::Record
        } else if semester_created {
            CreatedLevel::Semester
        } else if month_created {
            CreatedLevel::Month
        } else {
            CreatedLevel::None
        };

        (record, outcome)
    }
}

/// Merge `incoming` into `existing` by subject key.
///
/// Returns the number of replaced, appended and dropped rows.
fn merge_subjects(existing: &mut Vec<SubjectEntry>, incoming: Vec<SubjectEntry>) -> (usize, usize, usize) {
    let before = existing.len();
    existing.retain(|entry| !JunkFilter::is_junk_entry(entry));
    let dropped = before - existing.len();

    let mut index: HashMap<SubjectKey, usize> = HashMap::with_capacity(existing.len() + incoming.len());
    for (position, entry) in existing.iter().enumerate() {
        index.entry(entry.key()).or_insert(position);
    }

    let mut replaced = 0;
    let mut appended = 0;
    for entry in incoming {
        match index.get(&entry.key()) {
            Some(&position) => {
                existing[position] = entry;
                replaced += 1;
            }
            None => {
                index.insert(entry.key(), existing.len());
                existing.push(entry);
                appended += 1;
            }
        }
    }

    (replaced, appended, dropped)
}
