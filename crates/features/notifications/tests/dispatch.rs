use lms_domain::config::{AppConfig, NotificationSettings};
use lms_domain::events::{OrderCompleted, OrderOnHold, OrderSaved, PasswordReset, UserRegistered};
use lms_domain::ids::{OrderId, UserId};
use lms_domain::notification::NotificationKind;
use lms_domain::roles::RoleSet;
use lms_event_bus::EventRouter;
use lms_notifications::{
    InMemoryDirectory, MemoryMailer, MemoryQueue, NotificationDispatcher, NotificationPolicy,
    routes,
};
use serde_json::json;
use std::sync::Arc;

struct Harness {
    router: EventRouter,
    dispatcher: Arc<NotificationDispatcher>,
    mailer: Arc<MemoryMailer>,
    queue: Arc<MemoryQueue>,
}

fn harness(config: &AppConfig) -> Harness {
    let directory = Arc::new(InMemoryDirectory::new());
    directory.insert_user(UserId(1), "ada@school.test", Some("Ada".to_owned()));
    directory.insert_user(UserId(2), "grace@school.test", None);
    directory.insert_order(OrderId(100), UserId(1));

    let mailer = Arc::new(MemoryMailer::new());
    let queue = Arc::new(MemoryQueue::new());
    let dispatcher = Arc::new(NotificationDispatcher::email(
        config,
        directory,
        Arc::clone(&mailer) as _,
        Arc::clone(&queue) as _,
    ));
    let router = EventRouter::new();
    routes::register(&router, &dispatcher);

    Harness { router, dispatcher, mailer, queue }
}

fn scheduled() -> AppConfig {
    let mut config = AppConfig::default();
    config.email.schedule_enabled = true;
    config
}

fn disabled(mut config: AppConfig, kind: NotificationKind) -> AppConfig {
    config
        .email
        .notifications
        .insert(kind, NotificationSettings { enabled: false, recipients: Vec::new() });
    config
}

#[test]
fn registers_one_handler_per_route() {
    let h = harness(&AppConfig::default());

    assert_eq!(h.router.handler_count::<PasswordReset>(), 1);
    assert_eq!(h.router.handler_count::<OrderCompleted>(), 1);
    assert_eq!(h.router.handler_count::<OrderSaved>(), 1);
    assert_eq!(h.router.handler_count::<UserRegistered>(), 2);
}

#[test]
fn immediate_mode_sends_to_order_customer() {
    let h = harness(&AppConfig::default());

    let report = h.router.dispatch(&OrderCompleted { order_id: OrderId(100) });

    assert!(report.is_clean());
    assert!(h.queue.jobs().is_empty());
    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::OrderCompleted);
    assert_eq!(sent[0].to, vec!["ada@school.test"]);
    assert_eq!(sent[0].subject, "Your order #100 is complete");
}

#[test]
fn scheduled_mode_only_enqueues() {
    let h = harness(&scheduled());

    h.router.dispatch(&OrderOnHold { order_id: OrderId(100) });

    assert!(h.mailer.sent().is_empty());
    let jobs = h.queue.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].handle, "lms/email/order_on_hold");
    assert_eq!(jobs[0].payload, json!({ "id": 100 }));
    assert_eq!(jobs[0].queue, "lms");
}

#[test]
fn disabled_kind_has_no_side_effect_in_either_mode() {
    for base in [AppConfig::default(), scheduled()] {
        let h = harness(&disabled(base, NotificationKind::OrderCompleted));

        let report = h.router.dispatch(&OrderCompleted { order_id: OrderId(100) });

        assert!(report.is_clean());
        assert!(h.mailer.sent().is_empty());
        assert!(h.queue.jobs().is_empty());
    }
}

#[test]
fn new_order_email_only_on_creation() {
    let h = harness(&AppConfig::default());

    h.router.dispatch(&OrderSaved { order_id: OrderId(100), created: false });
    assert!(h.mailer.sent().is_empty());

    h.router.dispatch(&OrderSaved { order_id: OrderId(100), created: true });
    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::NewOrder);
    assert_eq!(sent[0].to, vec!["admin@localhost"]);
}

#[test]
fn user_with_both_roles_gets_both_registration_emails() {
    let h = harness(&AppConfig::default());

    let report = h.router.dispatch(&UserRegistered {
        user_id: UserId(2),
        roles: RoleSet::STUDENT | RoleSet::INSTRUCTOR,
    });

    assert!(report.is_clean());
    let kinds: Vec<_> = h.mailer.sent().into_iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::StudentRegistered, NotificationKind::InstructorRegistered]);
}

#[test]
fn role_guards_filter_registration_emails() {
    let h = harness(&AppConfig::default());

    h.router.dispatch(&UserRegistered { user_id: UserId(2), roles: RoleSet::INSTRUCTOR });
    h.router.dispatch(&UserRegistered { user_id: UserId(2), roles: RoleSet::ADMINISTRATOR });

    let kinds: Vec<_> = h.mailer.sent().into_iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![NotificationKind::InstructorRegistered]);
}

#[test]
fn failing_route_does_not_block_sibling_route() {
    let mut config = AppConfig::default();
    config.email.notifications.insert(
        NotificationKind::InstructorRegistered,
        NotificationSettings { enabled: true, recipients: vec!["faculty@school.test".to_owned()] },
    );
    let h = harness(&config);

    // User 9 is unknown, so the student email has no recipient.
    let report = h.router.dispatch(&UserRegistered {
        user_id: UserId(9),
        roles: RoleSet::STUDENT | RoleSet::INSTRUCTOR,
    });

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "notifications.student_registered");
    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["faculty@school.test"]);
}

#[test]
fn delivery_failure_is_reported_not_raised() {
    let h = harness(&AppConfig::default());
    h.mailer.fail_with(Some("smtp unavailable"));

    let report = h.router.dispatch(&OrderCompleted { order_id: OrderId(100) });

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.to_string().contains("smtp unavailable"));
}

#[test]
fn scheduled_password_reset_mints_a_key_when_run() {
    let h = harness(&scheduled());

    h.router.dispatch(&PasswordReset { user_id: UserId(1) });
    let jobs = h.queue.drain();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].payload, json!({ "id": 1 }));

    for job in jobs {
        h.dispatcher.run_scheduled(&job.handle, &job.payload).expect("job should run");
    }

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::PasswordReset);
    assert!(sent[0].body.contains("Hi Ada,"));
    assert!(sent[0].body.contains("Use this key to choose a new one: "));
}

#[test]
fn password_reset_uses_supplied_key() {
    let h = harness(&AppConfig::default());

    h.dispatcher
        .run_scheduled("lms/email/password_reset", &json!({ "id": 1, "reset_key": "FIXEDKEY" }))
        .expect("trigger should succeed");

    assert!(h.mailer.sent()[0].body.contains("FIXEDKEY"));
}

#[test]
fn unknown_schedule_handle_is_rejected() {
    let h = harness(&AppConfig::default());

    let err = h.dispatcher.run_scheduled("lms/email/nope", &json!({ "id": 1 }));
    assert!(matches!(err, Err(lms_notifications::NotificationError::Unknown { .. })));
}

#[test]
fn policy_answers_are_stable() {
    let config = disabled(AppConfig::default(), NotificationKind::NewOrder);
    let policy = NotificationPolicy::new(config);

    for kind in NotificationKind::ALL {
        assert_eq!(policy.is_enabled(kind), policy.is_enabled(kind));
    }
    assert!(!policy.is_enabled(NotificationKind::NewOrder));
}
