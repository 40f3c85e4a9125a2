//! Per-student write serialization.
//!
//! Every read-modify-write of a student's record runs while holding that
//! student's lock, so two submissions for the same student can never both
//! merge into the same stale copy. Students do not contend with each other.
//! An entry is removed from the table once no task holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Clone, Default)]
pub struct StudentLocks {
    table: LockTable,
}

/// Held for the duration of one student's read-modify-write
pub struct StudentGuard {
    student_id: String,
    table: LockTable,
    guard: Option<OwnedMutexGuard<()>>,
}

impl StudentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task is writing this student's record
    pub async fn lock(&self, student_id: &str) -> StudentGuard {
        let mutex = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            table
                .entry(student_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = mutex.lock_owned().await;

        StudentGuard {
            student_id: student_id.to_string(),
            table: self.table.clone(),
            guard: Some(guard),
        }
    }

    /// Number of students with a live lock entry
    pub fn tracked_students(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for StudentGuard {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        // The table and this guard hold the only references: nobody is waiting.
        if let Some(mutex) = table.get(&self.student_id) {
            if Arc::strong_count(mutex) == 2 {
                table.remove(&self.student_id);
            }
        }
        self.guard.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_student_is_serialized() {
        let locks = StudentLocks::new();
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let active = active.clone();
            let max_active = max_active.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("student-1").await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_students_do_not_block() {
        let locks = StudentLocks::new();
        let _first = locks.lock("student-1").await;

        let second = tokio::time::timeout(Duration::from_millis(100), locks.lock("student-2")).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_entries_pruned_after_release() {
        let locks = StudentLocks::new();
        {
            let _guard = locks.lock("student-1").await;
            assert_eq!(locks.tracked_students(), 1);
        }
        assert_eq!(locks.tracked_students(), 0);
    }
}
