//! User accounts and authentication payloads.

use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::validation::{self, FormErrors, Validate};

fn default_true() -> bool {
    true
}

/// A user account as returned by the backend.
///
/// The role is kept as the raw wire string; [`User::role`] parses it and
/// yields `None` for anything outside the known roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Parsed role, `None` when the backend sent an unknown role.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Create/edit payload for a user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Required on create, optional on edit (unchanged when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Validate for UserForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "name", &self.name);
        validation::email(&mut errors, "email", &self.email);
        if let Some(password) = &self.password {
            if password.chars().count() < 8 {
                errors.add("password", "must be at least 8 characters");
            }
        }
        errors.into_result()
    }
}

/// Login credentials.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::email(&mut errors, "email", &self.email);
        validation::required(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_fails_closed() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Eve",
            "email": "eve@example.com",
            "role": "janitor"
        }))
        .unwrap();
        assert_eq!(user.role(), None);
        assert!(user.active);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.de", "hunter22");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_login_response_accepts_access_token() {
        let resp: LoginResponse = serde_json::from_value(serde_json::json!({
            "access_token": "abc",
            "user": {"id": 1, "name": "Anna", "email": "anna@lab.de", "role": "doctor"}
        }))
        .unwrap();
        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.role(), Some(Role::Doctor));
    }

    #[test]
    fn test_user_form_short_password() {
        let form = UserForm {
            name: "Anna".into(),
            email: "anna@lab.de".into(),
            role: Role::Staff,
            password: Some("short".into()),
            clinic_id: None,
            active: true,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("password"), Some("must be at least 8 characters"));
    }
}
