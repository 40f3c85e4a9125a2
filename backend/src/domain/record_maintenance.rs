//! Normalization of stored attendance documents.
//!
//! Older documents can hold repeated semesters and months, repeated subjects
//! and placeholder rows. Cleaning a document:
//! - drops semester 0 and months outside 1-12 with everything in them
//! - collapses repeated semesters and months, keeping the latest occurrence
//!   at the position of the first one
//! - collapses repeated subjects within a month, keeping the first occurrence
//! - removes placeholder rows, summary rows and rows that cannot be stored
//!
//! Month percentages are recomputed for months that lost rows when the
//! service computes them from the merged month.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use shared::CleanupCounts;

use crate::domain::attendance_aggregator::AttendanceAggregator;
use crate::domain::junk_filter::JunkFilter;
use crate::domain::models::{OverallAttendanceBasis, SubjectEntry};
use crate::storage::document::{month_number, AttendanceDocument, SubjectDocument};

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordMaintenance {
    basis: OverallAttendanceBasis,
}

impl RecordMaintenance {
    pub fn new(basis: OverallAttendanceBasis) -> Self {
        Self { basis }
    }

    /// Clean one document, returning the cleaned copy and what was removed
    pub fn clean(&self, document: &AttendanceDocument) -> (AttendanceDocument, CleanupCounts) {
        let mut counts = CleanupCounts {
            subjects_before: document.subject_count(),
            ..CleanupCounts::default()
        };

        let numbered: Vec<_> = document.semesters.iter().filter(|s| s.semester > 0).cloned().collect();
        counts.invalid_semesters = document.semesters.len() - numbered.len();

        let mut semesters = keep_latest(&numbered, |s| s.semester);
        counts.duplicate_semesters = numbered.len() - semesters.len();

        for semester in &mut semesters {
            let before = semester.months.len();
            semester.months.retain(|m| month_number(m.month).is_some());
            counts.invalid_months += before - semester.months.len();

            let before = semester.months.len();
            semester.months = keep_latest(&semester.months, |m| m.month);
            counts.duplicate_months += before - semester.months.len();

            for month in &mut semester.months {
                let before = month.subjects.len();
                let mut keys = HashSet::new();
                let mut kept = Vec::with_capacity(before);

                for subject in month.subjects.drain(..) {
                    if is_invalid(&subject) {
                        counts.invalid_subjects += 1;
                    } else if keys.insert(subject.key()) {
                        kept.push(subject);
                    } else {
                        counts.duplicate_subjects += 1;
                    }
                }
                month.subjects = kept;

                if month.subjects.len() != before && self.basis == OverallAttendanceBasis::MergedMonth {
                    let entries: Vec<SubjectEntry> = month.subjects.iter().map(SubjectDocument::to_entry).collect();
                    month.overall_attendance = AttendanceAggregator::overall_attendance(&entries);
                }
            }
        }

        let cleaned = AttendanceDocument {
            student_id: document.student_id.clone(),
            semesters,
        };
        counts.subjects_after = cleaned.subject_count();

        (cleaned, counts)
    }
}

/// Whether a cleanup pass changed anything
pub fn has_changes(counts: &CleanupCounts) -> bool {
    counts.invalid_semesters > 0
        || counts.invalid_months > 0
        || counts.duplicate_semesters > 0
        || counts.duplicate_months > 0
        || counts.duplicate_subjects > 0
        || counts.invalid_subjects > 0
}

/// Add one record's counts to a running total
pub fn accumulate(total: &mut CleanupCounts, counts: &CleanupCounts) {
    total.invalid_semesters += counts.invalid_semesters;
    total.invalid_months += counts.invalid_months;
    total.duplicate_semesters += counts.duplicate_semesters;
    total.duplicate_months += counts.duplicate_months;
    total.duplicate_subjects += counts.duplicate_subjects;
    total.invalid_subjects += counts.invalid_subjects;
    total.subjects_before += counts.subjects_before;
    total.subjects_after += counts.subjects_after;
}

fn is_invalid(subject: &SubjectDocument) -> bool {
    // attended > total cannot be written back
    JunkFilter::is_junk_entry(&subject.to_entry()) || subject.attended_classes > subject.total_classes
}

fn keep_latest<T: Clone, K: Eq + Hash>(items: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut kept: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        match positions.entry(key(item)) {
            Entry::Occupied(e) => kept[*e.get()] = item.clone(),
            Entry::Vacant(e) => {
                e.insert(kept.len());
                kept.push(item.clone());
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::document::{MonthDocument, SemesterDocument};

    fn subject(code: Option<&str>, name: &str, attended: u32, total: u32) -> SubjectDocument {
        SubjectDocument {
            subject_code: code.map(str::to_string),
            subject_name: name.to_string(),
            attended_classes: attended,
            total_classes: total,
        }
    }

    fn month(month: u32, subjects: Vec<SubjectDocument>, overall_attendance: f64) -> MonthDocument {
        MonthDocument {
            month,
            subjects,
            overall_attendance,
        }
    }

    fn document(semesters: Vec<SemesterDocument>) -> AttendanceDocument {
        AttendanceDocument {
            student_id: "student-1".to_string(),
            semesters,
        }
    }

    #[test]
    fn test_clean_document_is_unchanged() {
        let doc = document(vec![SemesterDocument {
            semester: 1,
            months: vec![month(3, vec![subject(None, "Maths", 18, 20)], 90.0)],
        }]);

        let (cleaned, counts) = RecordMaintenance::default().clean(&doc);
        assert_eq!(cleaned, doc);
        assert!(!has_changes(&counts));
        assert_eq!(counts.subjects_before, 1);
        assert_eq!(counts.subjects_after, 1);
    }

    #[test]
    fn test_duplicate_semesters_and_months_keep_latest() {
        let doc = document(vec![
            SemesterDocument {
                semester: 1,
                months: vec![month(3, vec![subject(None, "Old", 1, 2)], 50.0)],
            },
            SemesterDocument {
                semester: 2,
                months: vec![],
            },
            SemesterDocument {
                semester: 1,
                months: vec![
                    month(3, vec![subject(None, "Stale", 1, 1)], 100.0),
                    month(3, vec![subject(None, "Fresh", 3, 4)], 75.0),
                ],
            },
        ]);

        let (cleaned, counts) = RecordMaintenance::default().clean(&doc);

        assert_eq!(counts.duplicate_semesters, 1);
        assert_eq!(counts.duplicate_months, 1);
        assert_eq!(cleaned.semesters.len(), 2);
        assert_eq!(cleaned.semesters[0].semester, 1);
        assert_eq!(cleaned.semesters[0].months.len(), 1);
        assert_eq!(cleaned.semesters[0].months[0].subjects[0].subject_name, "Fresh");
        assert_eq!(counts.subjects_before, 3);
        assert_eq!(counts.subjects_after, 1);
    }

    #[test]
    fn test_unnumbered_semesters_and_months_are_dropped() {
        let doc = document(vec![
            SemesterDocument {
                semester: 0,
                months: vec![month(3, vec![subject(None, "Maths", 1, 2)], 50.0)],
            },
            SemesterDocument {
                semester: 1,
                months: vec![
                    month(0, vec![subject(None, "Maths", 1, 2)], 50.0),
                    month(13, vec![subject(None, "Maths", 1, 2)], 50.0),
                    month(4, vec![subject(None, "Physics", 3, 4)], 75.0),
                ],
            },
        ]);

        let (cleaned, counts) = RecordMaintenance::default().clean(&doc);

        assert!(has_changes(&counts));
        assert_eq!(counts.invalid_semesters, 1);
        assert_eq!(counts.invalid_months, 2);
        assert_eq!(counts.subjects_before, 4);
        assert_eq!(counts.subjects_after, 1);
        assert_eq!(cleaned.semesters.len(), 1);
        assert_eq!(cleaned.semesters[0].months[0].month, 4);
        assert!(cleaned.validate().is_empty());
    }

    #[test]
    fn test_duplicate_subjects_keep_first_by_code_then_name() {
        let doc = document(vec![SemesterDocument {
            semester: 1,
            months: vec![month(
                3,
                vec![
                    subject(Some("MA101"), "Maths", 5, 10),
                    subject(Some(" MA101 "), "Mathematics", 9, 10),
                    subject(None, "Physics", 1, 2),
                    subject(Some(""), "Physics", 2, 2),
                ],
                60.0,
            )],
        }]);

        let (cleaned, counts) = RecordMaintenance::default().clean(&doc);
        let subjects = &cleaned.semesters[0].months[0].subjects;

        assert_eq!(counts.duplicate_subjects, 2);
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].attended_classes, 5);
        assert_eq!(subjects[1].attended_classes, 1);
    }

    #[test]
    fn test_placeholder_rows_removed_and_percentage_recomputed() {
        let doc = document(vec![SemesterDocument {
            semester: 1,
            months: vec![month(
                4,
                vec![
                    subject(None, "Maths", 9, 10),
                    subject(None, "Cumulative", 40, 50),
                    subject(None, "No Data", 0, 5),
                    subject(None, "12", 1, 1),
                    subject(None, " ", 1, 1),
                    subject(None, "Lab", 0, 0),
                ],
                80.0,
            )],
        }]);

        let (cleaned, counts) = RecordMaintenance::new(OverallAttendanceBasis::MergedMonth).clean(&doc);
        let month = &cleaned.semesters[0].months[0];

        assert_eq!(counts.invalid_subjects, 5);
        assert_eq!(month.subjects.len(), 1);
        assert_eq!(month.overall_attendance, 90.0);
    }

    #[test]
    fn test_submission_basis_keeps_stored_percentage() {
        let doc = document(vec![SemesterDocument {
            semester: 1,
            months: vec![month(4, vec![subject(None, "Maths", 9, 10), subject(None, "7", 0, 5)], 60.0)],
        }]);

        let (cleaned, _) = RecordMaintenance::new(OverallAttendanceBasis::Submission).clean(&doc);
        assert_eq!(cleaned.semesters[0].months[0].overall_attendance, 60.0);
    }

    #[test]
    fn test_accumulate_sums_counts() {
        let mut total = CleanupCounts::default();
        let counts = CleanupCounts {
            invalid_semesters: 1,
            invalid_months: 1,
            duplicate_semesters: 1,
            duplicate_months: 2,
            duplicate_subjects: 3,
            invalid_subjects: 4,
            subjects_before: 10,
            subjects_after: 3,
        };
        accumulate(&mut total, &counts);
        accumulate(&mut total, &counts);

        assert_eq!(total.invalid_semesters, 2);
        assert_eq!(total.invalid_subjects, 8);
        assert_eq!(total.subjects_before, 20);
    }
}
