//! Removes enrollment records when their course is deleted.

use crate::error::EnrollmentError;
use crate::store::EnrollmentStore;
use lms_domain::config::EnrollmentConfig;
use lms_domain::events::CourseDeleted;
use lms_domain::ids::CourseId;
use lms_event_bus::{EventRouter, HandlerId};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Lets integrations keep records of deleted courses, or force their removal.
pub trait CleanupOverride: Send + Sync {
    fn delete_on_course_deletion(&self, current: bool, course: CourseId) -> bool;
}

pub struct EnrollmentCleanup {
    enabled: bool,
    store: Arc<dyn EnrollmentStore>,
    overrides: Vec<Arc<dyn CleanupOverride>>,
}

impl fmt::Debug for EnrollmentCleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnrollmentCleanup")
            .field("enabled", &self.enabled)
            .field("overrides", &self.overrides.len())
            .finish_non_exhaustive()
    }
}

impl EnrollmentCleanup {
    #[must_use]
    pub fn new(config: &EnrollmentConfig, store: Arc<dyn EnrollmentStore>) -> Self {
        Self { enabled: config.delete_on_course_deletion, store, overrides: Vec::new() }
    }

    #[must_use]
    pub fn with_override(mut self, hook: Arc<dyn CleanupOverride>) -> Self {
        self.overrides.push(hook);
        self
    }

    /// Whether records of `course` are deleted, after every override had its say.
    #[must_use]
    pub fn should_delete(&self, course: CourseId) -> bool {
        self.overrides
            .iter()
            .fold(self.enabled, |current, hook| hook.delete_on_course_deletion(current, course))
    }

    /// Deletes the records of the deleted course. Returns the number removed.
    ///
    /// # Errors
    /// Propagates the store error.
    pub fn on_course_deleted(&self, event: &CourseDeleted) -> Result<usize, EnrollmentError> {
        if !self.should_delete(event.course_id) {
            debug!(course_id = %event.course_id, "Keeping enrollments of deleted course");
            return Ok(0);
        }

        let deleted = self.store.delete_by_course(event.course_id)?;
        info!(course_id = %event.course_id, deleted, "Enrollments of deleted course removed");
        Ok(deleted)
    }
}

/// Subscribes `cleanup` to [`CourseDeleted`].
pub fn register(router: &EventRouter, cleanup: &Arc<EnrollmentCleanup>) -> HandlerId {
    let cleanup = Arc::clone(cleanup);
    router.on("enrollment.delete_on_course_deletion", move |event: &CourseDeleted| {
        cleanup.on_course_deleted(event)?;
        Ok(())
    })
}
