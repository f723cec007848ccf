use lms_domain::config::AppConfig;
use lms_domain::events::UserRegistered;
use lms_domain::notification::Severity;
use lms_domain::roles::Role;
use lms_event_bus::EventRouter;
use lms_registration::validation::{
    CONFIRM_PASSWORD_REQUIRED, FIRST_NAME_REQUIRED, INVALID_EMAIL, LAST_NAME_REQUIRED,
    PASSWORD_REQUIRED, PASSWORDS_DO_NOT_MATCH, USERNAME_REQUIRED,
};
use lms_registration::{
    AcceptToken, Account, AccountError, FormData, IdentityProvider, InMemoryIdentityProvider,
    MemorySession, NewAccount, NoticeLog, Outcome, RecordingAuth, RegistrationError,
    RegistrationExtension, RegistrationPipeline, RegistrationSubmission, RequestContext,
    SubmissionValidator, ValidationResult,
};
use parking_lot::Mutex;
use std::sync::Arc;

const TOKEN: &str = "good-token";
const DASHBOARD: &str = "http://localhost:4583/account/#/dashboard";
const CREATED: &str =
    "Your account was created successfully. Your login details have been sent to your email address.";

struct Harness {
    pipeline: RegistrationPipeline,
    identity: Arc<InMemoryIdentityProvider>,
    events: EventRouter,
    nonces: AcceptToken,
    session: MemorySession,
    notices: NoticeLog,
    auth: RecordingAuth,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let events = EventRouter::new();
        let pipeline = RegistrationPipeline::new(config, identity.clone(), events.clone()).unwrap();
        Self {
            pipeline,
            identity,
            events,
            nonces: AcceptToken(TOKEN.to_owned()),
            session: MemorySession::new(),
            notices: NoticeLog::new(),
            auth: RecordingAuth::new(),
        }
    }

    fn map(self, f: impl FnOnce(RegistrationPipeline) -> RegistrationPipeline) -> Self {
        Self { pipeline: f(self.pipeline), ..self }
    }

    fn process(&self, form: &FormData) -> Outcome {
        let ctx = RequestContext {
            nonces: &self.nonces,
            session: &self.session,
            notices: &self.notices,
            auth: &self.auth,
        };
        self.pipeline.process(form, &ctx)
    }

    fn errors(&self) -> Vec<String> {
        self.notices.with_severity(Severity::Error)
    }

    fn infos(&self) -> Vec<String> {
        self.notices.with_severity(Severity::Info)
    }
}

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

fn valid_form() -> FormData {
    form(&[
        ("masteriyo-registration", "1"),
        ("_nonce", TOKEN),
        ("first-name", "Ada"),
        ("last-name", "Lovelace"),
        ("username", "ada"),
        ("email", "Ada@School.test"),
        ("password", "s3cret"),
        ("confirm-password", "s3cret"),
    ])
}

fn with(mut form: FormData, key: &str, value: &str) -> FormData {
    form.insert(key.to_owned(), value.to_owned());
    form
}

fn without(mut form: FormData, key: &str) -> FormData {
    form.remove(key);
    form
}

fn rejected(outcome: Outcome) -> RegistrationError {
    match outcome {
        Outcome::Rejected(error) => error,
        other => panic!("expected rejection, got {other:?}"),
    }
}

fn failures(outcome: Outcome) -> ValidationResult {
    match rejected(outcome) {
        RegistrationError::ValidationFailure { failures, .. } => failures,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn request_without_marker_is_ignored() {
    let harness = Harness::new();
    let outcome = harness.process(&without(valid_form(), "masteriyo-registration"));

    assert!(matches!(outcome, Outcome::Ignored));
    assert!(harness.notices.all().is_empty());
    assert!(harness.session.entries().is_empty());
    assert!(harness.identity.is_empty());
    assert!(harness.auth.logins().is_empty());
}

#[test]
fn only_the_masteriyo_marker_identifies_the_form() {
    assert_eq!(lms_domain::constants::REGISTRATION_MARKER, "masteriyo-registration");

    let harness = Harness::new();
    let renamed = with(without(valid_form(), "masteriyo-registration"), "lms-registration", "1");
    assert!(matches!(harness.process(&renamed), Outcome::Ignored));
    assert!(matches!(harness.process(&valid_form()), Outcome::Registered { .. }));
}

#[test]
fn valid_submission_registers_logs_in_and_redirects() {
    let harness = Harness::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    harness.events.on("test.capture", move |event: &UserRegistered| {
        sink.lock().push(*event);
        Ok(())
    });

    let Outcome::Registered { account, redirect } = harness.process(&valid_form()) else {
        panic!("expected registration");
    };

    assert_eq!(account.email, "ada@school.test");
    assert_eq!(account.role, Role::Student);
    assert_eq!(redirect.map(String::from).as_deref(), Some(DASHBOARD));
    assert_eq!(harness.auth.logins(), vec![account.id]);
    assert_eq!(harness.infos(), vec![CREATED]);
    assert!(harness.errors().is_empty());
    assert!(harness.session.entries().is_empty());

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].user_id, account.id);
    assert!(seen[0].roles.has_role(Role::Student));
}

#[test]
fn auth_new_user_off_registers_without_login() {
    let mut config = AppConfig::default();
    config.registration.auth_new_user = false;
    let harness = Harness::with_config(config);

    let Outcome::Registered { redirect, .. } = harness.process(&valid_form()) else {
        panic!("expected registration");
    };

    assert!(redirect.is_none());
    assert!(harness.auth.logins().is_empty());
    assert_eq!(harness.infos(), vec![CREATED]);
}

#[test]
fn generated_password_changes_the_success_notice() {
    let mut config = AppConfig::default();
    config.registration.generate_password = true;
    let harness = Harness::with_config(config);

    let form = without(without(valid_form(), "password"), "confirm-password");
    assert!(matches!(harness.process(&form), Outcome::Registered { .. }));
    assert_eq!(
        harness.infos(),
        vec!["Your account was created successfully and a password has been sent to your email address."]
    );
}

#[test]
fn mismatched_passwords_are_rejected_and_replayed() {
    let harness = Harness::new();
    let failures = failures(harness.process(&with(valid_form(), "confirm-password", "other")));

    assert_eq!(failures.codes().collect::<Vec<_>>(), vec![PASSWORDS_DO_NOT_MATCH]);
    assert_eq!(harness.errors(), vec!["The passwords do not match."]);
    assert!(harness.infos().is_empty());
    assert!(harness.identity.is_empty());
    assert_eq!(harness.session.get("user-registration.email").as_deref(), Some("ada@school.test"));
    assert_eq!(harness.session.get("user-registration.confirm-password").as_deref(), Some("other"));
    assert_eq!(harness.session.entries().len(), 6);
}

#[test]
fn invalid_email_without_required_error() {
    let harness = Harness::new();
    let failures = failures(harness.process(&with(valid_form(), "email", "not-an-email")));

    assert!(failures.contains(INVALID_EMAIL));
    assert!(!failures.contains("email_required"));
    assert_eq!(harness.errors(), vec!["Email is invalid."]);
}

#[test]
fn every_failure_is_reported_at_once() {
    let harness = Harness::new();
    let form = form(&[("masteriyo-registration", "1"), ("_nonce", TOKEN), ("email", "ada@school.test")]);
    let failures = failures(harness.process(&form));

    for code in [
        USERNAME_REQUIRED,
        FIRST_NAME_REQUIRED,
        LAST_NAME_REQUIRED,
        PASSWORD_REQUIRED,
        CONFIRM_PASSWORD_REQUIRED,
    ] {
        assert!(failures.contains(code), "missing {code}");
    }
    assert_eq!(harness.errors().len(), failures.len());
}

#[test]
fn missing_token_is_rejected_without_replay() {
    let harness = Harness::new();
    let error = rejected(harness.process(&without(valid_form(), "_nonce")));

    assert!(matches!(error, RegistrationError::MissingToken { .. }));
    assert_eq!(harness.errors(), vec!["Nonce is missing."]);
    assert!(harness.session.entries().is_empty());
    assert!(harness.identity.is_empty());
}

#[test]
fn invalid_token_is_rejected_without_replay() {
    let harness = Harness::new();
    let error = rejected(harness.process(&with(valid_form(), "_nonce", "forged")));

    assert!(matches!(error, RegistrationError::InvalidToken { .. }));
    assert_eq!(harness.errors(), vec!["Invalid nonce."]);
    assert!(harness.session.entries().is_empty());
}

#[test]
fn duplicate_account_is_an_account_creation_failure() {
    let harness = Harness::new();
    assert!(matches!(harness.process(&valid_form()), Outcome::Registered { .. }));
    harness.notices.take();

    let error = rejected(harness.process(&with(valid_form(), "username", "ada2")));

    assert!(matches!(error, RegistrationError::AccountCreationFailure { .. }));
    assert_eq!(
        harness.errors(),
        vec!["An account is already registered with your email address."]
    );
    assert_eq!(harness.session.get("user-registration.username").as_deref(), Some("ada2"));
    assert_eq!(harness.identity.len(), 1);
}

struct Unavailable;

impl IdentityProvider for Unavailable {
    fn create_account(&self, _account: NewAccount) -> Result<Account, AccountError> {
        Err(AccountError::Unavailable { message: "directory offline".into(), context: None })
    }
}

#[test]
fn unavailable_provider_is_an_unexpected_fault() {
    let events = EventRouter::new();
    let pipeline =
        RegistrationPipeline::new(AppConfig::default(), Arc::new(Unavailable), events).unwrap();
    let (nonces, session, notices, auth) =
        (AcceptToken(TOKEN.to_owned()), MemorySession::new(), NoticeLog::new(), RecordingAuth::new());
    let ctx =
        RequestContext { nonces: &nonces, session: &session, notices: &notices, auth: &auth };

    let error = rejected(pipeline.process(&valid_form(), &ctx));

    assert!(matches!(error, RegistrationError::UnexpectedFault { .. }));
    assert_eq!(notices.with_severity(Severity::Error), vec!["directory offline"]);
    assert_eq!(session.entries().len(), 6);
}

#[test]
fn failed_login_is_reported() {
    let harness = Harness::new();
    harness.auth.fail_with(Some("cookie jar full"));

    let error = rejected(harness.process(&valid_form()));

    assert!(matches!(error, RegistrationError::UnexpectedFault { .. }));
    assert_eq!(harness.identity.len(), 1);
    assert_eq!(harness.infos(), vec![CREATED]);
    assert!(harness.errors().iter().any(|m| m.contains("cookie jar full")));
}

#[test]
fn failing_event_handler_does_not_block_registration() {
    let harness = Harness::new();
    harness.events.on("test.broken", |_: &UserRegistered| Err("mailer down".into()));

    assert!(matches!(harness.process(&valid_form()), Outcome::Registered { .. }));
    assert!(harness.errors().is_empty());
}

struct Panicking;

impl RegistrationExtension for Panicking {
    fn auth_new_user(&self, _current: bool, _account: &Account) -> bool {
        panic!("extension exploded");
    }
}

#[test]
fn panicking_extension_becomes_unexpected_fault() {
    let harness = Harness::new().map(|p| p.with_extension(Arc::new(Panicking)));

    let error = rejected(harness.process(&valid_form()));

    let RegistrationError::UnexpectedFault { message, .. } = error else {
        panic!("expected an unexpected fault");
    };
    assert_eq!(message, "extension exploded");
    assert!(harness.errors().contains(&"extension exploded".to_owned()));
    assert_eq!(harness.session.get("user-registration.first-name").as_deref(), Some("Ada"));
}

struct NoLogin;

impl RegistrationExtension for NoLogin {
    fn auth_new_user(&self, _current: bool, _account: &Account) -> bool {
        false
    }
}

struct Redirect(&'static str);

impl RegistrationExtension for Redirect {
    fn redirect_url(&self, _current: String, _account: &Account) -> String {
        self.0.to_owned()
    }
}

#[test]
fn extension_can_veto_login() {
    let harness = Harness::new().map(|p| p.with_extension(Arc::new(NoLogin)));

    let Outcome::Registered { redirect, .. } = harness.process(&valid_form()) else {
        panic!("expected registration");
    };
    assert!(redirect.is_none());
    assert!(harness.auth.logins().is_empty());
}

#[test]
fn extension_redirect_is_kept_when_allowed() {
    let harness = Harness::new().map(|p| p.with_extension(Arc::new(Redirect("/courses/intro"))));

    let Outcome::Registered { redirect, .. } = harness.process(&valid_form()) else {
        panic!("expected registration");
    };
    assert_eq!(redirect.map(String::from).as_deref(), Some("http://localhost:4583/courses/intro"));
}

#[test]
fn extension_redirect_to_foreign_host_falls_back() {
    let harness =
        Harness::new().map(|p| p.with_extension(Arc::new(Redirect("https://evil.test/phish"))));

    let Outcome::Registered { redirect, .. } = harness.process(&valid_form()) else {
        panic!("expected registration");
    };
    assert_eq!(redirect.map(String::from).as_deref(), Some(DASHBOARD));
}

struct ReservedNames;

impl SubmissionValidator for ReservedNames {
    fn validate(&self, submission: &RegistrationSubmission, result: &mut ValidationResult) {
        if submission.username == "admin" {
            result.add("reserved_username", "This username is reserved.");
        }
    }
}

#[test]
fn extra_validator_adds_failures() {
    let harness = Harness::new().map(|p| p.with_validator(Arc::new(ReservedNames)));

    let failures = failures(harness.process(&with(valid_form(), "username", "admin")));

    assert_eq!(failures.codes().collect::<Vec<_>>(), vec!["reserved_username"]);
    assert_eq!(harness.errors(), vec!["This username is reserved."]);
    assert!(harness.identity.is_empty());
}

#[test]
fn generated_username_from_email() {
    let mut config = AppConfig::default();
    config.registration.generate_username = true;
    let harness = Harness::with_config(config);

    let Outcome::Registered { account, .. } = harness.process(&without(valid_form(), "username"))
    else {
        panic!("expected registration");
    };
    assert_eq!(account.username, "ada");
}
