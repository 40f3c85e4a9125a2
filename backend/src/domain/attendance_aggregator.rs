//! Overall attendance percentage over a set of subjects.

use crate::domain::models::{SubjectEntry, SubjectSubmission};

/// Anything that carries attended and total class counts
pub trait ClassCounts {
    fn attended(&self) -> u64;
    fn total(&self) -> u64;
}

impl ClassCounts for SubjectEntry {
    fn attended(&self) -> u64 {
        u64::from(self.attended_classes)
    }

    fn total(&self) -> u64 {
        u64::from(self.total_classes)
    }
}

// Absent or negative counts contribute nothing.
impl ClassCounts for SubjectSubmission {
    fn attended(&self) -> u64 {
        self.attended_classes.and_then(|a| u64::try_from(a).ok()).unwrap_or(0)
    }

    fn total(&self) -> u64 {
        self.total_classes.and_then(|t| u64::try_from(t).ok()).unwrap_or(0)
    }
}

pub struct AttendanceAggregator;

impl AttendanceAggregator {
    /// `Σattended / Σtotal × 100`, or `0` when no classes were held
    pub fn overall_attendance<T: ClassCounts>(subjects: &[T]) -> f64 {
        // u128 so that sums of u64 counts cannot overflow
        let (attended, total) = subjects.iter().fold((0u128, 0u128), |(a, t), s| {
            (a + u128::from(s.attended()), t + u128::from(s.total()))
        });

        if total == 0 {
            return 0.0;
        }

        (attended as f64 / total as f64) * 100.0
    }
}
