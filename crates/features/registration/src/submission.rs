//! Form field extraction and sanitizing.

use lms_domain::constants::REGISTRATION_SESSION_PREFIX;
use std::collections::HashMap;

/// Raw urlencoded form body, field name to value.
pub type FormData = HashMap<String, String>;

/// The six fields of the registration form, by their HTML names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    FirstName,
    LastName,
    Username,
    Email,
    Password,
    ConfirmPassword,
}

impl FormField {
    pub const ALL: [Self; 6] = [
        Self::FirstName,
        Self::LastName,
        Self::Username,
        Self::Email,
        Self::Password,
        Self::ConfirmPassword,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "first-name",
            Self::LastName => "last-name",
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm-password",
        }
    }

    /// Session key the field is replayed under, e.g. `user-registration.email`.
    #[must_use]
    pub fn session_key(self) -> String {
        format!("{REGISTRATION_SESSION_PREFIX}.{}", self.name())
    }
}

/// A sanitized registration submission. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationSubmission {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationSubmission {
    #[must_use]
    pub fn from_form(form: &FormData) -> Self {
        let raw = |field: FormField| form.get(field.name()).map_or("", String::as_str);

        Self {
            first_name: sanitize_text(raw(FormField::FirstName)),
            last_name: sanitize_text(raw(FormField::LastName)),
            username: sanitize_username(raw(FormField::Username)),
            email: sanitize_email(raw(FormField::Email)),
            password: raw(FormField::Password).to_owned(),
            confirm_password: raw(FormField::ConfirmPassword).to_owned(),
        }
    }

    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Username => &self.username,
            FormField::Email => &self.email,
            FormField::Password => &self.password,
            FormField::ConfirmPassword => &self.confirm_password,
        }
    }

    /// `(session key, value)` for every form field, in form order.
    pub fn session_entries(&self) -> impl Iterator<Item = (String, &str)> {
        FormField::ALL.into_iter().map(|field| (field.session_key(), self.value(field)))
    }
}

/// Trimmed and lowercased.
#[must_use]
pub fn sanitize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Tags removed, then only `[A-Za-z0-9 _.@-]` kept, whitespace runs collapsed.
#[must_use]
pub fn sanitize_username(raw: &str) -> String {
    let allowed: String = strip_tags(raw)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '@' | '-'))
        .collect();
    collapse_whitespace(&allowed)
}

/// Tags removed, control characters and whitespace runs collapsed to one space.
#[must_use]
pub fn sanitize_text(raw: &str) -> String {
    let stripped: String = strip_tags(raw)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    collapse_whitespace(&stripped)
}

fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {},
        }
    }
    out
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn missing_fields_become_empty() {
        let submission = RegistrationSubmission::from_form(&FormData::new());
        assert_eq!(submission, RegistrationSubmission::default());
    }

    #[test]
    fn fields_are_sanitized() {
        let submission = RegistrationSubmission::from_form(&form(&[
            ("first-name", "  <b>Ada</b>\t\n King "),
            ("username", " ada <i>love</i>lace!! "),
            ("email", "  Ada@School.TEST "),
            ("password", " keep me "),
        ]));

        assert_eq!(submission.first_name, "Ada King");
        assert_eq!(submission.username, "ada lovelace");
        assert_eq!(submission.email, "ada@school.test");
        assert_eq!(submission.password, " keep me ");
    }

    #[test]
    fn session_keys_use_form_names() {
        let keys: Vec<_> =
            RegistrationSubmission::default().session_entries().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec![
                "user-registration.first-name",
                "user-registration.last-name",
                "user-registration.username",
                "user-registration.email",
                "user-registration.password",
                "user-registration.confirm-password",
            ]
        );
    }
}
