//! Address lookups for notification subjects.

use fxhash::FxHashMap;
use lms_domain::ids::{OrderId, UserId};
use parking_lot::RwLock;

/// Read-only view over users and orders, as far as emails need them.
pub trait RecipientDirectory: Send + Sync {
    fn user_email(&self, user: UserId) -> Option<String>;

    /// Billing email of the customer who placed the order.
    fn order_customer_email(&self, order: OrderId) -> Option<String>;

    /// Name used in greetings. Falls back to the email local part.
    fn display_name(&self, user: UserId) -> Option<String> {
        self.user_email(user).and_then(|email| email.split('@').next().map(str::to_owned))
    }
}

#[derive(Debug, Clone)]
struct Contact {
    email: String,
    name: Option<String>,
}

/// In-process directory backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<FxHashMap<UserId, Contact>>,
    orders: RwLock<FxHashMap<OrderId, UserId>>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserId, email: impl Into<String>, name: Option<String>) {
        self.users.write().insert(user, Contact { email: email.into(), name });
    }

    /// Links an order to the customer who placed it.
    pub fn insert_order(&self, order: OrderId, customer: UserId) {
        self.orders.write().insert(order, customer);
    }
}

impl RecipientDirectory for InMemoryDirectory {
    fn user_email(&self, user: UserId) -> Option<String> {
        self.users.read().get(&user).map(|contact| contact.email.clone())
    }

    fn order_customer_email(&self, order: OrderId) -> Option<String> {
        let customer = *self.orders.read().get(&order)?;
        self.user_email(customer)
    }

    fn display_name(&self, user: UserId) -> Option<String> {
        let users = self.users.read();
        let contact = users.get(&user)?;
        contact
            .name
            .clone()
            .or_else(|| contact.email.split('@').next().map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_email_resolves_through_customer() {
        let directory = InMemoryDirectory::new();
        directory.insert_user(UserId(3), "ada@school.test", None);
        directory.insert_order(OrderId(11), UserId(3));

        assert_eq!(directory.order_customer_email(OrderId(11)).as_deref(), Some("ada@school.test"));
        assert_eq!(directory.order_customer_email(OrderId(12)), None);
    }

    #[test]
    fn display_name_prefers_stored_name() {
        let directory = InMemoryDirectory::new();
        directory.insert_user(UserId(1), "grace@school.test", Some("Grace".to_owned()));
        directory.insert_user(UserId(2), "linus@school.test", None);

        assert_eq!(directory.display_name(UserId(1)).as_deref(), Some("Grace"));
        assert_eq!(directory.display_name(UserId(2)).as_deref(), Some("linus"));
    }
}
