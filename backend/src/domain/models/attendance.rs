//! Domain model for a student's attendance hierarchy.
//!
//! A record owns semesters keyed by semester number, each semester owns months
//! keyed by month number, and each month owns an insertion-ordered list of
//! subjects whose identity is their [`SubjectKey`]. Keying the two outer levels
//! by number makes their uniqueness structural.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a subject within a month: the subject code when one is given,
/// otherwise the subject name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn new(code: Option<&str>, name: &str) -> Self {
        match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => Self(code.to_string()),
            None => Self(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A subject row as it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectEntry {
    pub code: Option<String>,
    pub name: String,
    pub attended_classes: u32,
    pub total_classes: u32,
}

impl SubjectEntry {
    pub fn new(code: Option<&str>, name: &str, attended_classes: u32, total_classes: u32) -> Self {
        Self {
            code: code.map(str::to_string),
            name: name.to_string(),
            attended_classes,
            total_classes,
        }
    }

    pub fn key(&self) -> SubjectKey {
        SubjectKey::new(self.code.as_deref(), &self.name)
    }
}

/// A subject row as submitted, before validation.
///
/// Counts are signed and optional so that a missing or negative value can be
/// reported instead of being rejected by decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubjectSubmission {
    pub code: Option<String>,
    pub name: Option<String>,
    pub attended_classes: Option<i64>,
    pub total_classes: Option<i64>,
}

impl SubjectSubmission {
    /// Name with blank values treated as absent
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Code with blank values treated as absent
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Convert into a stored row. Returns `None` unless name and both counts
    /// are present and the counts fit the stored representation.
    pub fn to_entry(&self) -> Option<SubjectEntry> {
        let name = self.name()?;
        let attended = u32::try_from(self.attended_classes?).ok()?;
        let total = u32::try_from(self.total_classes?).ok()?;
        Some(SubjectEntry::new(self.code(), name, attended, total))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthRecord {
    pub subjects: Vec<SubjectEntry>,
    /// Percentage in the range 0-100
    pub overall_attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SemesterRecord {
    pub months: BTreeMap<u8, MonthRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub semesters: BTreeMap<u32, SemesterRecord>,
}

impl AttendanceRecord {
    pub fn new(student_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            semesters: BTreeMap::new(),
        }
    }

    pub fn month(&self, semester: u32, month: u8) -> Option<&MonthRecord> {
        self.semesters.get(&semester)?.months.get(&month)
    }

    /// Total number of subject rows across the whole hierarchy
    pub fn subject_count(&self) -> usize {
        self.semesters
            .values()
            .flat_map(|s| s.months.values())
            .map(|m| m.subjects.len())
            .sum()
    }
}

/// A record together with its persistence metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAttendance {
    pub record: AttendanceRecord,
    /// Optimistic concurrency version, incremented on every write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which subject set a month's `overall_attendance` is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverallAttendanceBasis {
    /// The month's full subject list after the merge
    #[default]
    MergedMonth,
    /// Only the latest submitted batch, including rows discarded as junk
    Submission,
}
