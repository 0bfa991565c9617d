//! Session lifecycle.
//!
//! `Anonymous -> Authenticating -> Authenticated -> Anonymous`. The state
//! machine itself is [`SessionState::on`]; [`Session`] drives it against
//! the backend and keeps the bearer token in a [`TokenStore`].

mod store;

pub use store::*;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::access;
use crate::api::{ApiClient, ApiError, ApiRequest, Method, Transport};
use crate::db::DbError;
use crate::models::{Credentials, LoginResponse, Permission, Role, User};
use crate::notify::SESSION_EXPIRED;
use crate::validation::{FormErrors, Validate};

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please correct the highlighted fields")]
    Form(#[from] FormErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(User),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Submit,
    Succeeded(User),
    Failed,
    Logout,
    Unauthorized,
}

impl SessionState {
    /// Transition function. Events that do not apply leave the state as is.
    pub fn on(self, event: SessionEvent) -> SessionState {
        match (self, event) {
            (SessionState::Anonymous, SessionEvent::Submit) => SessionState::Authenticating,
            (SessionState::Authenticating, SessionEvent::Succeeded(user)) => {
                SessionState::Authenticated(user)
            }
            (SessionState::Authenticating, SessionEvent::Failed) => SessionState::Anonymous,
            (_, SessionEvent::Logout) | (_, SessionEvent::Unauthorized) => SessionState::Anonymous,
            (state, _) => state,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated(_) => "authenticated",
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// The single client session.
pub struct Session<S> {
    store: S,
    state: SessionState,
    token: Option<String>,
    last_error: Option<String>,
}

impl<S: TokenStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Anonymous,
            token: None,
            last_error: None,
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        let from = self.state.name();
        let state = std::mem::replace(&mut self.state, SessionState::Anonymous);
        self.state = state.on(event);
        debug!(from, to = self.state.name(), "session transition");
    }

    fn fail(&mut self, error: SessionError) -> SessionError {
        self.apply(SessionEvent::Failed);
        self.last_error = Some(error.to_string());
        error
    }

    /// Log in with email and password.
    ///
    /// Credentials are validated locally first; invalid ones are never sent.
    /// On failure nothing is persisted and the session stays anonymous.
    pub fn login<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        credentials: &Credentials,
    ) -> Result<&User, SessionError> {
        if let Err(errors) = credentials.validate() {
            let error = SessionError::Form(errors);
            self.last_error = Some(error.to_string());
            return Err(error);
        }
        if self.is_authenticated() {
            self.discard();
        }
        self.store.clear_token()?;

        self.last_error = None;
        self.apply(SessionEvent::Submit);

        let request = ApiRequest::post(
            "/auth/login",
            json!({ "email": credentials.email.trim(), "password": credentials.password }),
        );
        let response: LoginResponse = match api.send_json(request) {
            Ok(response) => response,
            Err(ApiError::Unauthorized) => return Err(self.fail(SessionError::InvalidCredentials)),
            Err(e) => return Err(self.fail(SessionError::Api(e))),
        };

        if let Err(e) = self.store.save_token(&response.token) {
            return Err(self.fail(SessionError::Storage(e)));
        }
        info!(user_id = response.user.id, role = %response.user.role, "logged in");
        self.token = Some(response.token);
        self.apply(SessionEvent::Succeeded(response.user));
        self.current_user().ok_or(SessionError::InvalidCredentials)
    }

    /// Resume from a persisted token. Returns whether the session is now
    /// authenticated.
    ///
    /// A rejected token is discarded. Network failures keep it for the next
    /// attempt.
    pub fn restore<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<bool, SessionError> {
        let token = match self.store.load_token()? {
            Some(token) => token,
            None => return Ok(false),
        };
        if self.is_authenticated() && self.token.as_deref() == Some(token.as_str()) {
            return Ok(true);
        }
        if self.is_authenticated() {
            self.discard();
        }

        self.apply(SessionEvent::Submit);
        let request = ApiRequest::get("/auth/me").with_bearer(Some(&token));
        match api.send(request).and_then(|body| Ok(decode_user(body)?)) {
            Ok(user) => {
                debug!(user_id = user.id, "session restored");
                self.token = Some(token);
                self.apply(SessionEvent::Succeeded(user));
                Ok(true)
            }
            Err(ApiError::Unauthorized) => {
                info!("stored token rejected");
                self.store.clear_token()?;
                self.apply(SessionEvent::Failed);
                Ok(false)
            }
            Err(e) => Err(self.fail(SessionError::Api(e))),
        }
    }

    /// Log out. The backend call is best effort; the local session is
    /// always discarded.
    pub fn logout<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<(), SessionError> {
        if let Some(token) = self.token.clone() {
            let request = ApiRequest::new(Method::Post, "/auth/logout").with_bearer(Some(&token));
            if let Err(e) = api.send(request) {
                warn!(error = %e, "logout request failed");
            }
        }
        self.token = None;
        self.last_error = None;
        self.store.clear_token()?;
        self.apply(SessionEvent::Logout);
        Ok(())
    }

    /// Drop the session after the backend rejected the token.
    pub fn force_logout(&mut self) {
        if let Err(e) = self.store.clear_token() {
            warn!(error = %e, "failed to clear stored token");
        }
        self.token = None;
        self.last_error = Some(SESSION_EXPIRED.to_string());
        self.apply(SessionEvent::Unauthorized);
    }

    fn discard(&mut self) {
        self.token = None;
        self.apply(SessionEvent::Logout);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.user()
    }

    /// Role of the logged-in user; `None` when anonymous or the role is
    /// unknown.
    pub fn role(&self) -> Option<Role> {
        self.current_user().and_then(User::role)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Whether the current user holds every permission in `required`.
    pub fn can(&self, required: &[Permission]) -> bool {
        self.is_authenticated() && access::role_has_permission(self.role(), required)
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.role().is_some_and(|role| access::has_role(role, allowed))
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.role()
            .map(|role| access::permissions_for_role(role).into_iter().collect())
            .unwrap_or_default()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// `/auth/me` may answer with the user or with `{"user": ...}`.
fn decode_user(body: Value) -> Result<User, serde_json::Error> {
    match body {
        Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
            serde_json::from_value(map.remove("user").unwrap_or(Value::Null))
        }
        other => serde_json::from_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FakeBackend;

    fn user_json(role: &str) -> Value {
        json!({"id": 1, "name": "Anna", "email": "anna@lab.de", "role": role})
    }

    fn user(role: &str) -> User {
        serde_json::from_value(user_json(role)).unwrap()
    }

    fn setup() -> (FakeBackend, ApiClient<FakeBackend>, Session<MemoryTokenStore>) {
        let backend = FakeBackend::new();
        let api = ApiClient::new(backend.clone());
        (backend, api, Session::new(MemoryTokenStore::new()))
    }

    #[test]
    fn test_transitions() {
        let s = SessionState::Anonymous.on(SessionEvent::Submit);
        assert_eq!(s, SessionState::Authenticating);
        let s = s.on(SessionEvent::Succeeded(user("nurse")));
        assert!(matches!(s, SessionState::Authenticated(_)));
        assert_eq!(s.on(SessionEvent::Unauthorized), SessionState::Anonymous);

        assert_eq!(
            SessionState::Authenticating.on(SessionEvent::Failed),
            SessionState::Anonymous
        );
    }

    #[test]
    fn test_inapplicable_events_ignored() {
        assert_eq!(
            SessionState::Anonymous.on(SessionEvent::Succeeded(user("doctor"))),
            SessionState::Anonymous
        );
        assert_eq!(SessionState::Anonymous.on(SessionEvent::Failed), SessionState::Anonymous);
        let auth = SessionState::Authenticated(user("doctor"));
        assert_eq!(auth.clone().on(SessionEvent::Submit), auth);
    }

    #[test]
    fn test_login_success() {
        let (backend, api, mut session) = setup();
        backend.on(
            Method::Post,
            "/auth/login",
            200,
            json!({"token": "tok-1", "user": user_json("nurse")}),
        );

        let user = session.login(&api, &Credentials::new("anna@lab.de", "secret123")).unwrap();
        assert_eq!(user.name, "Anna");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok-1"));
        assert_eq!(session.store().peek(), Some("tok-1".into()));
        assert!(session.can(&[Permission::PatientsRead, Permission::RequestsWrite]));
        assert!(!session.can(&[Permission::UsersWrite]));
    }

    #[test]
    fn test_login_rejected() {
        let (backend, api, mut session) = setup();
        backend.on(Method::Post, "/auth/login", 401, json!({"message": "bad"}));

        let err = session
            .login(&api, &Credentials::new("anna@lab.de", "wrong-pass"))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(session.store().peek(), None);
        assert_eq!(session.last_error(), Some("Invalid email or password"));
    }

    #[test]
    fn test_invalid_credentials_not_sent() {
        let (backend, api, mut session) = setup();
        let err = session.login(&api, &Credentials::new("not-an-email", "")).unwrap_err();
        assert!(matches!(err, SessionError::Form(_)));
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_restore() {
        let backend = FakeBackend::new();
        backend.on(Method::Get, "/auth/me", 200, json!({"user": user_json("doctor")}));
        let api = ApiClient::new(backend.clone());
        let mut session = Session::new(MemoryTokenStore::with_token("stored"));

        assert!(session.restore(&api).unwrap());
        assert_eq!(session.role(), Some(Role::Doctor));
        assert_eq!(backend.last_request().unwrap().bearer.as_deref(), Some("stored"));
    }

    #[test]
    fn test_restore_rejected_token_discarded() {
        let backend = FakeBackend::new();
        backend.on(Method::Get, "/auth/me", 401, Value::Null);
        let api = ApiClient::new(backend);
        let mut session = Session::new(MemoryTokenStore::with_token("expired"));

        assert!(!session.restore(&api).unwrap());
        assert_eq!(session.store().peek(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_without_token() {
        let (backend, api, mut session) = setup();
        assert!(!session.restore(&api).unwrap());
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_logout_survives_backend_failure() {
        let (backend, api, mut session) = setup();
        backend
            .on(Method::Post, "/auth/login", 200, json!({"token": "t", "user": user_json("staff")}))
            .on_unreachable(Method::Post, "/auth/logout", "offline");

        session.login(&api, &Credentials::new("anna@lab.de", "secret123")).unwrap();
        session.logout(&api).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.store().peek(), None);
    }

    #[test]
    fn test_force_logout() {
        let (backend, api, mut session) = setup();
        backend.on(Method::Post, "/auth/login", 200, json!({"token": "t", "user": user_json("doctor")}));
        session.login(&api, &Credentials::new("anna@lab.de", "secret123")).unwrap();

        session.force_logout();
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(session.token(), None);
        assert!(session.last_error().is_some());
    }

    #[test]
    fn test_unknown_role_has_nothing() {
        let (backend, api, mut session) = setup();
        backend.on(Method::Post, "/auth/login", 200, json!({"token": "t", "user": user_json("janitor")}));
        session.login(&api, &Credentials::new("anna@lab.de", "secret123")).unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.role(), None);
        assert!(!session.can(&[Permission::PatientsRead]));
        assert!(session.permissions().is_empty());
    }
}
