//! Detection of placeholder rows exported by source systems.
//!
//! These rows pass validation but carry no attendance information: "No Data"
//! markers, bare row numbers in the name column, summary rows and rows with no
//! classes held. They still count toward the submission percentage but are
//! never stored.

use crate::domain::models::{SubjectEntry, SubjectSubmission};

/// Name of the summary row some exports append to every month
const CUMULATIVE_ROW_NAME: &str = "cumulative";

pub struct JunkFilter;

impl JunkFilter {
    /// Whether a subject name marks a placeholder row
    pub fn is_junk_name(name: &str) -> bool {
        let trimmed = name.trim();
        trimmed.is_empty()
            || name.to_lowercase().contains("no data")
            || trimmed.chars().all(|c| c.is_ascii_digit())
    }

    /// Whether a subject name marks an export summary row
    pub fn is_summary_name(name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(CUMULATIVE_ROW_NAME)
    }

    /// Whether a validated submission row should be kept out of storage
    pub fn is_junk(subject: &SubjectSubmission) -> bool {
        let Some(name) = subject.name() else {
            return true;
        };
        if Self::is_junk_name(name) {
            return true;
        }
        if subject.attended_classes.is_none() {
            return true;
        }
        matches!(subject.total_classes, None | Some(0))
    }

    /// Whether an already stored row should be dropped on its next rewrite
    pub fn is_junk_entry(entry: &SubjectEntry) -> bool {
        Self::is_junk_name(&entry.name) || Self::is_summary_name(&entry.name) || entry.total_classes == 0
    }

    /// Keep the storable rows of a validated batch, converted to entries
    pub fn retain_storable(subjects: &[SubjectSubmission]) -> Vec<SubjectEntry> {
        subjects
            .iter()
            .filter(|s| !Self::is_junk(s))
            .filter_map(SubjectSubmission::to_entry)
            .collect()
    }
}
