//! Persisted form of an attendance record.
//!
//! A record is stored as one JSON document in the nested list layout clients
//! see (`semesters[].months[].subjects[]`). Every document is checked against
//! [`AttendanceDocument::validate`] before it is written.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::models::{
    AttendanceRecord, MonthRecord, SemesterRecord, SubjectEntry, SubjectKey,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    #[serde(default)]
    pub subject_name: String,
    pub attended_classes: u32,
    pub total_classes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDocument {
    pub month: u32,
    #[serde(default)]
    pub subjects: Vec<SubjectDocument>,
    #[serde(default)]
    pub overall_attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterDocument {
    pub semester: u32,
    #[serde(default)]
    pub months: Vec<MonthDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDocument {
    pub student_id: String,
    #[serde(default)]
    pub semesters: Vec<SemesterDocument>,
}

/// One field of a document that breaks the stored schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
    pub value: String,
}

impl FieldViolation {
    fn new(path: String, message: &str, value: impl ToString) -> Self {
        Self {
            path,
            message: message.to_string(),
            value: value.to_string(),
        }
    }
}

impl SubjectDocument {
    pub fn to_entry(&self) -> SubjectEntry {
        SubjectEntry::new(self.subject_code.as_deref(), &self.subject_name, self.attended_classes, self.total_classes)
    }

    pub fn key(&self) -> SubjectKey {
        SubjectKey::new(self.subject_code.as_deref(), &self.subject_name)
    }
}

impl From<&SubjectEntry> for SubjectDocument {
    fn from(entry: &SubjectEntry) -> Self {
        Self {
            subject_code: entry.code.clone(),
            subject_name: entry.name.clone(),
            attended_classes: entry.attended_classes,
            total_classes: entry.total_classes,
        }
    }
}

impl From<&AttendanceRecord> for AttendanceDocument {
    fn from(record: &AttendanceRecord) -> Self {
        let semesters = record
            .semesters
            .iter()
            .map(|(&semester, semester_record)| SemesterDocument {
                semester,
                months: semester_record
                    .months
                    .iter()
                    .map(|(&month, month_record)| MonthDocument {
                        month: u32::from(month),
                        subjects: month_record.subjects.iter().map(SubjectDocument::from).collect(),
                        overall_attendance: month_record.overall_attendance,
                    })
                    .collect(),
            })
            .collect();

        Self {
            student_id: record.student_id.clone(),
            semesters,
        }
    }
}

impl AttendanceDocument {
    /// Build the keyed domain record.
    ///
    /// Documents written by this service never contain duplicates; for legacy
    /// documents a later semester or month replaces an earlier one with the
    /// same number and the first subject with a given key wins. Semester 0 and
    /// months outside 1-12 cannot be represented and are skipped.
    pub fn to_record(&self) -> AttendanceRecord {
        let mut record = AttendanceRecord::new(&self.student_id);

        for semester_doc in self.semesters.iter().filter(|s| s.semester > 0) {
            let mut semester = SemesterRecord::default();
            for month_doc in &semester_doc.months {
                let Some(month) = month_number(month_doc.month) else {
                    continue;
                };
                let mut seen = HashSet::new();
                let subjects = month_doc
                    .subjects
                    .iter()
                    .filter(|s| seen.insert(s.key()))
                    .map(SubjectDocument::to_entry)
                    .collect();
                semester.months.insert(
                    month,
                    MonthRecord {
                        subjects,
                        overall_attendance: month_doc.overall_attendance,
                    },
                );
            }
            record.semesters.insert(semester_doc.semester, semester);
        }

        record
    }

    /// Check the document against the stored schema, collecting every violation
    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if self.student_id.trim().is_empty() {
            violations.push(FieldViolation::new("studentId".to_string(), "is required", &self.student_id));
        }

        let mut semester_numbers = HashSet::new();
        for (s, semester) in self.semesters.iter().enumerate() {
            let path = format!("semesters.{s}");
            if semester.semester == 0 {
                violations.push(FieldViolation::new(format!("{path}.semester"), "must be a positive integer", semester.semester));
            }
            if !semester_numbers.insert(semester.semester) {
                violations.push(FieldViolation::new(format!("{path}.semester"), "is duplicated", semester.semester));
            }

            let mut month_numbers = HashSet::new();
            for (m, month) in semester.months.iter().enumerate() {
                let path = format!("{path}.months.{m}");
                if month_number(month.month).is_none() {
                    violations.push(FieldViolation::new(format!("{path}.month"), "must be between 1 and 12", month.month));
                }
                if !month_numbers.insert(month.month) {
                    violations.push(FieldViolation::new(format!("{path}.month"), "is duplicated", month.month));
                }
                if !month.overall_attendance.is_finite() || !(0.0..=100.0).contains(&month.overall_attendance) {
                    violations.push(FieldViolation::new(
                        format!("{path}.overallAttendance"),
                        "must be between 0 and 100",
                        month.overall_attendance,
                    ));
                }

                let mut keys = HashSet::new();
                for (i, subject) in month.subjects.iter().enumerate() {
                    let path = format!("{path}.subjects.{i}");
                    if subject.subject_name.trim().is_empty() {
                        violations.push(FieldViolation::new(format!("{path}.subjectName"), "is required", &subject.subject_name));
                    }
                    if subject.attended_classes > subject.total_classes {
                        violations.push(FieldViolation::new(
                            format!("{path}.attendedClasses"),
                            "cannot be greater than totalClasses",
                            subject.attended_classes,
                        ));
                    }
                    if !keys.insert(subject.key()) {
                        violations.push(FieldViolation::new(path.clone(), "duplicates another subject key", subject.key()));
                    }
                }
            }
        }

        violations
    }

    pub fn subject_count(&self) -> usize {
        self.semesters
            .iter()
            .flat_map(|s| s.months.iter())
            .map(|m| m.subjects.len())
            .sum()
    }
}

/// The month as a calendar month number, if it is one
pub fn month_number(month: u32) -> Option<u8> {
    u8::try_from(month).ok().filter(|m| (1..=12).contains(m))
}
