//! End-to-end session flows against a scripted backend and on-disk storage.

use dentalab_core::api::{FakeBackend, Method};
use dentalab_core::app::{LOGIN_ROUTE, HOME_ROUTE};
use dentalab_core::session::SessionState;
use dentalab_core::{App, AppError, Credentials, Database, Guard, ListQuery, Role, TokenStore};
use serde_json::json;
use tempfile::TempDir;

fn login_reply(role: &str) -> serde_json::Value {
    json!({
        "token": "tok-123",
        "user": {"id": 7, "name": "Dr. Berg", "email": "berg@praxis.de", "role": role}
    })
}

fn open_app(dir: &TempDir, backend: &FakeBackend) -> App<FakeBackend, Database> {
    let db = Database::open(dir.path().join("client.db")).unwrap();
    App::new(backend.clone(), db)
}

#[test]
fn token_survives_restart() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on(Method::Post, "/auth/login", 200, login_reply("doctor"));
    backend.on(
        Method::Get,
        "/auth/me",
        200,
        json!({"id": 7, "name": "Dr. Berg", "email": "berg@praxis.de", "role": "doctor"}),
    );

    {
        let mut app = open_app(&dir, &backend);
        let user = app.login(&Credentials::new("berg@praxis.de", "secret123")).unwrap();
        assert_eq!(user.role(), Some(Role::Doctor));
        assert_eq!(app.current_route(), HOME_ROUTE);
        assert_eq!(app.session().store().load_token().unwrap().as_deref(), Some("tok-123"));
    }

    let mut app = open_app(&dir, &backend);
    assert!(!app.session().is_authenticated());
    assert!(app.restore().unwrap());
    assert_eq!(app.session().current_user().unwrap().id, 7);
    assert_eq!(app.current_route(), HOME_ROUTE);

    let me = backend.last_request().unwrap();
    assert_eq!(me.path, "/auth/me");
    assert_eq!(me.bearer.as_deref(), Some("tok-123"));
}

#[test]
fn failed_login_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on(Method::Post, "/auth/login", 401, json!({"message": "Invalid credentials"}));

    let mut app = open_app(&dir, &backend);
    let err = app
        .login(&Credentials::new("berg@praxis.de", "wrong-password"))
        .unwrap_err();
    assert!(err.to_string().contains("Invalid email or password"));
    assert_eq!(app.session().state(), &SessionState::Anonymous);
    assert_eq!(app.session().store().load_token().unwrap(), None);
    assert_eq!(app.current_route(), LOGIN_ROUTE);
}

#[test]
fn failed_relogin_drops_previous_token() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on(Method::Post, "/auth/login", 200, login_reply("doctor"));
    backend.on(
        Method::Get,
        "/auth/me",
        200,
        json!({"id": 7, "name": "Dr. Berg", "email": "berg@praxis.de", "role": "doctor"}),
    );

    let mut app = open_app(&dir, &backend);
    app.login(&Credentials::new("berg@praxis.de", "secret123")).unwrap();
    assert_eq!(app.session().store().load_token().unwrap().as_deref(), Some("tok-123"));

    backend.reset_route(Method::Post, "/auth/login");
    backend.on(Method::Post, "/auth/login", 401, json!({"message": "Invalid credentials"}));
    assert!(app.login(&Credentials::new("kurz@praxis.de", "wrong-password")).is_err());
    assert_eq!(app.session().state(), &SessionState::Anonymous);
    assert_eq!(app.session().store().load_token().unwrap(), None);

    let mut reopened = open_app(&dir, &backend);
    assert!(!reopened.restore().unwrap());
    assert!(!reopened.session().is_authenticated());
    assert_eq!(backend.count(Method::Get, "/auth/me"), 0);
}

#[test]
fn malformed_credentials_never_reach_backend() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut app = open_app(&dir, &backend);

    let err = app.login(&Credentials::new("not-an-email", "")).unwrap_err();
    let fields: Vec<String> = err.field_errors().into_iter().map(|(f, _)| f).collect();
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"password".to_string()));
    assert!(backend.requests().is_empty());
}

#[test]
fn unauthorized_response_ends_session() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on(Method::Post, "/auth/login", 200, login_reply("nurse"));
    backend.on(Method::Get, "/patients", 401, json!({"message": "Unauthenticated."}));

    let mut app = open_app(&dir, &backend);
    app.login(&Credentials::new("berg@praxis.de", "secret123")).unwrap();
    assert_eq!(app.navigate("/patients").unwrap(), Guard::Allow);

    let err = app.patients().list(&ListQuery::new()).unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.current_route(), LOGIN_ROUTE);
    assert_eq!(app.session().store().load_token().unwrap(), None);
    assert!(app.session().last_error().is_some());

    // Anonymous again: protected pages bounce to the login screen.
    assert_eq!(app.navigate("/patients").unwrap(), Guard::RedirectToLogin);
}

#[test]
fn rejected_token_is_discarded_on_restore() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on(Method::Get, "/auth/me", 401, json!({}));

    let db = Database::open(dir.path().join("client.db")).unwrap();
    db.save_token("stale").unwrap();
    let mut app = App::new(backend.clone(), db);

    assert!(!app.restore().unwrap());
    assert_eq!(app.session().store().load_token().unwrap(), None);
    assert_eq!(app.current_route(), LOGIN_ROUTE);
}

#[test]
fn network_failure_keeps_token() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on_unreachable(Method::Get, "/auth/me", "connection refused");

    let db = Database::open(dir.path().join("client.db")).unwrap();
    db.save_token("tok-123").unwrap();
    let mut app = App::new(backend.clone(), db);

    assert!(app.restore().is_err());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.session().store().load_token().unwrap().as_deref(), Some("tok-123"));
}

#[test]
fn logout_clears_storage_even_if_backend_fails() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on(Method::Post, "/auth/login", 200, login_reply("staff"));
    backend.on(Method::Post, "/auth/logout", 500, json!({"message": "boom"}));

    let mut app = open_app(&dir, &backend);
    app.login(&Credentials::new("berg@praxis.de", "secret123")).unwrap();
    app.logout().unwrap();

    assert_eq!(app.session().state(), &SessionState::Anonymous);
    assert_eq!(app.session().store().load_token().unwrap(), None);
    assert_eq!(app.current_route(), LOGIN_ROUTE);
    assert_eq!(backend.count(Method::Post, "/auth/logout"), 1);
}

#[test]
fn role_gates_lab_screens() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    backend.on(Method::Post, "/auth/login", 200, login_reply("lab_technician"));

    let mut app = open_app(&dir, &backend);
    app.login(&Credentials::new("berg@praxis.de", "secret123")).unwrap();

    assert!(app.session().permissions().is_empty());
    assert_eq!(app.navigate("/inventory/lots?material=5").unwrap(), Guard::Allow);
    assert_eq!(app.active_nav_item().unwrap().label, "Inventory");
    assert_eq!(app.navigate("/patients").unwrap(), Guard::Forbidden);
    assert_eq!(app.current_route(), "/inventory/lots?material=5");

    let labels: Vec<&str> = app.navigation().all().iter().map(|i| i.label).collect();
    assert!(!labels.contains(&"Patients"));
    assert!(labels.contains(&"Laborzettel"));
}

#[test]
fn resource_calls_need_a_session() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut app = open_app(&dir, &backend);

    let err = app.clinics().get(1).unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated));
    assert!(backend.requests().is_empty());
}
