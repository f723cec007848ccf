use lms::domain::config::AppConfig;
use lms::domain::events::{CourseDeleted, UserRegistered};
use lms::domain::ids::{CourseId, UserId};
use lms::domain::registry::FeatureSlice;
use lms::domain::roles::Role;
use lms::events::EventRouter;
use lms::features::notifications::MemoryQueue;
use lms::{Collaborators, LmsError, features, init};
use std::sync::Arc;

#[test]
fn init_builds_every_enabled_slice() {
    let events = EventRouter::new();
    let slices = init(&AppConfig::default(), &events, &Collaborators::in_memory()).unwrap();

    let mut names: Vec<_> = slices.iter().map(|s| s.state.name()).collect();
    names.sort_unstable();
    assert_eq!(names, features::ENABLED);
    assert!(features::is_enabled("registration"));
    assert!(!features::is_enabled("payments"));

    assert_eq!(events.handler_count::<UserRegistered>(), 2);
    assert_eq!(events.handler_count::<CourseDeleted>(), 1);
}

#[test]
fn scheduled_registration_email_lands_on_the_queue() {
    let mut config = AppConfig::default();
    config.email.schedule_enabled = true;
    let queue = Arc::new(MemoryQueue::new());
    let events = EventRouter::new();
    init(&config, &events, &Collaborators::in_memory().with_queue(queue.clone())).unwrap();

    events.dispatch(&UserRegistered { user_id: UserId(4), roles: Role::Student.into() });
    events.dispatch(&CourseDeleted { course_id: CourseId(1) });

    let jobs = queue.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].handle, "lms/email/student_registered");
}

#[test]
fn bad_registration_config_fails_init() {
    let mut config = AppConfig::default();
    config.registration.account_page_url = "nowhere".to_owned();

    let result = init(&config, &EventRouter::new(), &Collaborators::in_memory());
    assert!(matches!(result, Err(LmsError::Registration { .. })));
}
