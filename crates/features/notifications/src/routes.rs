//! Domain event → notification wiring.
//!
//! Every route is its own router handler, so a failing email never blocks the
//! others registered on the same event.

use crate::dispatcher::NotificationDispatcher;
use lms_domain::events::{
    OrderCancelled, OrderCompleted, OrderOnHold, OrderSaved, PasswordReset, UserRegistered,
};
use lms_domain::notification::{NotificationKind, Subject};
use lms_domain::roles::Role;
use lms_event_bus::{Event, EventRouter, HandlerId};
use std::sync::Arc;

/// Registers the seven email routes and returns their handler ids.
pub fn register(router: &EventRouter, dispatcher: &Arc<NotificationDispatcher>) -> Vec<HandlerId> {
    vec![
        route(router, dispatcher, NotificationKind::PasswordReset, |e: &PasswordReset| {
            Some(Subject::User(e.user_id))
        }),
        route(router, dispatcher, NotificationKind::OrderCompleted, |e: &OrderCompleted| {
            Some(Subject::Order(e.order_id))
        }),
        route(router, dispatcher, NotificationKind::OrderOnHold, |e: &OrderOnHold| {
            Some(Subject::Order(e.order_id))
        }),
        route(router, dispatcher, NotificationKind::OrderCancelled, |e: &OrderCancelled| {
            Some(Subject::Order(e.order_id))
        }),
        route(router, dispatcher, NotificationKind::NewOrder, |e: &OrderSaved| {
            e.created.then_some(Subject::Order(e.order_id))
        }),
        route(router, dispatcher, NotificationKind::StudentRegistered, |e: &UserRegistered| {
            e.roles.has_role(Role::Student).then_some(Subject::User(e.user_id))
        }),
        route(router, dispatcher, NotificationKind::InstructorRegistered, |e: &UserRegistered| {
            e.roles.has_role(Role::Instructor).then_some(Subject::User(e.user_id))
        }),
    ]
}

/// `guard` returns the subject to notify about, or `None` to skip the event.
fn route<E, G>(
    router: &EventRouter,
    dispatcher: &Arc<NotificationDispatcher>,
    kind: NotificationKind,
    guard: G,
) -> HandlerId
where
    E: Event,
    G: Fn(&E) -> Option<Subject> + Send + Sync + 'static,
{
    let dispatcher = Arc::clone(dispatcher);
    router.on(format!("notifications.{}", kind.id()), move |event: &E| {
        let Some(subject) = guard(event) else {
            return Ok(());
        };
        dispatcher.notify(kind, subject)?;
        Ok(())
    })
}
