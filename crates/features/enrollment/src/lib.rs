//! Enrollment feature slice.
//!
//! Holds the user-course records behind [`EnrollmentStore`] and drops them when
//! their course is deleted, unless configuration or a [`CleanupOverride`] says
//! otherwise.

pub mod cleanup;
mod error;
pub mod store;

pub use crate::cleanup::{CleanupOverride, EnrollmentCleanup};
pub use crate::error::{EnrollmentError, EnrollmentErrorExt};
pub use crate::store::{Enrollment, EnrollmentStatus, EnrollmentStore, InMemoryEnrollmentStore};

use lms_event_bus::{EventRouter, HandlerId};
use lms_kernel::domain::config::AppConfig;
use lms_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Enrollment feature state
#[lms_derive::lms_slice]
#[derive(Debug)]
pub struct Enrollments {
    pub cleanup: Arc<EnrollmentCleanup>,
    pub route: HandlerId,
}

/// Wires course-deletion cleanup onto `events`.
pub fn init(
    config: &AppConfig,
    events: &EventRouter,
    store: Arc<dyn EnrollmentStore>,
) -> InitializedSlice {
    let cleanup = Arc::new(EnrollmentCleanup::new(&config.enrollment, store));
    let route = cleanup::register(events, &cleanup);

    tracing::info!(
        delete_on_course_deletion = config.enrollment.delete_on_course_deletion,
        "Enrollment slice initialized"
    );

    InitializedSlice::new(Enrollments::new(EnrollmentsInner { cleanup, route }))
}
