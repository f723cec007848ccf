//! User-course enrollment records.

use crate::error::EnrollmentError;
use lms_domain::ids::{CourseId, UserId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
}

pub trait EnrollmentStore: Send + Sync {
    /// Deletes every record for `course` and returns how many were removed.
    ///
    /// # Errors
    /// Returns [`EnrollmentError::Store`] if the backing store fails.
    fn delete_by_course(&self, course: CourseId) -> Result<usize, EnrollmentError>;
}

#[derive(Debug, Default)]
pub struct InMemoryEnrollmentStore {
    records: RwLock<Vec<Enrollment>>,
}

impl InMemoryEnrollmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active enrollment unless the user already has one for the course.
    pub fn enroll(&self, user_id: UserId, course_id: CourseId) {
        let mut records = self.records.write();
        if !records.iter().any(|r| r.user_id == user_id && r.course_id == course_id) {
            records.push(Enrollment { user_id, course_id, status: EnrollmentStatus::Active });
        }
    }

    #[must_use]
    pub fn for_course(&self, course_id: CourseId) -> Vec<Enrollment> {
        self.records.read().iter().filter(|r| r.course_id == course_id).copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }
}

impl EnrollmentStore for InMemoryEnrollmentStore {
    fn delete_by_course(&self, course: CourseId) -> Result<usize, EnrollmentError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.course_id != course);
        Ok(before - records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enroll_is_idempotent_and_delete_counts() {
        let store = InMemoryEnrollmentStore::new();
        store.enroll(UserId(1), CourseId(10));
        store.enroll(UserId(1), CourseId(10));
        store.enroll(UserId(2), CourseId(10));
        store.enroll(UserId(2), CourseId(11));

        assert_eq!(store.for_course(CourseId(10)).len(), 2);
        assert_eq!(store.delete_by_course(CourseId(10)).unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.delete_by_course(CourseId(10)).unwrap(), 0);
    }
}
