//! Built-in email templates.
//!
//! Subjects are fixed per kind; bodies pull values from the render context and
//! fall back to neutral placeholders when a value is missing.

use lms_domain::notification::NotificationKind;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateEngine;

impl TemplateEngine {
    #[must_use]
    pub fn render_subject(kind: NotificationKind, context: &Value) -> String {
        let order = extract_str(context, "order_id", "");
        match kind {
            NotificationKind::OrderCompleted => format!("Your order #{order} is complete"),
            NotificationKind::OrderOnHold => format!("Your order #{order} is on hold"),
            NotificationKind::OrderCancelled => format!("Your order #{order} was cancelled"),
            NotificationKind::NewOrder => format!("New order #{order}"),
            NotificationKind::StudentRegistered => "Welcome to your new student account".to_owned(),
            NotificationKind::InstructorRegistered => {
                "Welcome to your new instructor account".to_owned()
            },
            NotificationKind::PasswordReset => "Password reset request".to_owned(),
        }
    }

    #[must_use]
    pub fn render_body(kind: NotificationKind, context: &Value) -> String {
        let name = extract_str(context, "name", "there");
        match kind {
            NotificationKind::OrderCompleted => {
                let order = extract_str(context, "order_id", "?");
                format!("Hi {name},\n\nYour order #{order} has been completed. Enjoy your courses!")
            },
            NotificationKind::OrderOnHold => {
                let order = extract_str(context, "order_id", "?");
                format!(
                    "Hi {name},\n\nYour order #{order} is on hold until we confirm your payment."
                )
            },
            NotificationKind::OrderCancelled => {
                let order = extract_str(context, "order_id", "?");
                format!("Hi {name},\n\nYour order #{order} has been cancelled.")
            },
            NotificationKind::NewOrder => {
                let order = extract_str(context, "order_id", "?");
                format!("A new order #{order} has been placed.")
            },
            NotificationKind::StudentRegistered | NotificationKind::InstructorRegistered => {
                let account = extract_str(context, "account_url", "");
                format!("Hi {name},\n\nThanks for signing up. Your account page: {account}")
            },
            NotificationKind::PasswordReset => {
                let key = extract_str(context, "reset_key", "");
                let account = extract_str(context, "account_url", "");
                format!(
                    "Hi {name},\n\nSomeone asked to reset your password. Use this key to choose \
                     a new one: {key}\n\n{account}\n\nIf this was not you, ignore this email."
                )
            },
        }
    }
}

/// String values are used verbatim; numbers and other scalars use their JSON text.
fn extract_str(context: &Value, key: &str, default: &str) -> String {
    context.get(key).map_or_else(
        || default.to_owned(),
        |value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_templates_include_the_order_number() {
        let context = json!({ "order_id": 42, "name": "Ada" });

        assert_eq!(
            TemplateEngine::render_subject(NotificationKind::OrderCompleted, &context),
            "Your order #42 is complete"
        );
        assert!(
            TemplateEngine::render_body(NotificationKind::OrderCompleted, &context)
                .starts_with("Hi Ada,")
        );
    }

    #[test]
    fn missing_values_fall_back() {
        let body = TemplateEngine::render_body(NotificationKind::OrderCancelled, &json!({}));
        assert_eq!(body, "Hi there,\n\nYour order #? has been cancelled.");
    }

    #[test]
    fn reset_body_carries_the_key() {
        let body = TemplateEngine::render_body(
            NotificationKind::PasswordReset,
            &json!({ "reset_key": "K3Y", "name": "Grace" }),
        );
        assert!(body.contains("K3Y"));
    }
}
